//! Trait definitions for MDX components.

use indexmap::IndexMap;

use folio_mdx::TocEntry;

use crate::inline::InlineJsx;
use crate::tweet::Tweet;

/// Data available to components while a page is hydrated.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Tweets fetched for the page, by id
    pub tweets: &'a IndexMap<String, Tweet>,

    /// Outline of the document being rendered
    pub toc: &'a [TocEntry],
}

/// Errors that can occur while rendering components.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("<{component}> is missing required prop \"{prop}\"")]
    MissingProp {
        component: &'static str,
        prop: &'static str,
    },

    #[error("Components nested deeper than {0} levels")]
    TooDeep(usize),
}

/// A component that can replace its tag in compiled MDX.
pub trait MdxComponent: Send + Sync {
    /// Tag name the component is used by in MDX (e.g., "Callout")
    fn name(&self) -> &'static str;

    /// Render the element to HTML.
    ///
    /// # Arguments
    /// * `element` - The parsed tag with its props
    /// * `children` - The element's children, already hydrated
    /// * `ctx` - Page data
    fn render(
        &self,
        element: &InlineJsx,
        children: Option<&str>,
        ctx: &RenderContext<'_>,
    ) -> Result<String, ComponentError>;
}
