//! Component registry and hydration of compiled documents.

use std::collections::HashMap;

use crate::builtin::builtins;
use crate::inline::{custom_element_name, parse_element, to_custom_element};
use crate::traits::{ComponentError, MdxComponent, RenderContext};

/// Deepest component nesting hydration will follow.
pub const MAX_DEPTH: usize = 32;

/// Registry of components available to documents.
#[derive(Default)]
pub struct ComponentRegistry {
    components: HashMap<String, Box<dyn MdxComponent>>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in component.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for component in builtins() {
            registry.register(component);
        }
        registry
    }

    /// Register a component, replacing any with the same name.
    pub fn register(&mut self, component: Box<dyn MdxComponent>) {
        self.components
            .insert(component.name().to_string(), component);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Registered component names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.components.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Replace every component tag in `code` with its rendered markup.
    ///
    /// Tags with no registered component become custom elements so the
    /// browser can still upgrade them.
    pub fn hydrate(&self, code: &str, ctx: &RenderContext<'_>) -> Result<String, ComponentError> {
        self.hydrate_at(code, ctx, 0)
    }

    fn hydrate_at(
        &self,
        code: &str,
        ctx: &RenderContext<'_>,
        depth: usize,
    ) -> Result<String, ComponentError> {
        if depth > MAX_DEPTH {
            return Err(ComponentError::TooDeep(MAX_DEPTH));
        }

        let mut out = String::with_capacity(code.len());
        let mut rest = code;

        while let Some(start) = find_component_start(rest) {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];

            let Some((element, consumed)) = parse_element(tail) else {
                // Not a well-formed element, keep the text as is
                out.push('<');
                rest = &tail[1..];
                continue;
            };

            let children = element
                .children
                .as_deref()
                .map(|children| self.hydrate_at(children, ctx, depth + 1))
                .transpose()?;

            let rendered = match self.components.get(&element.component) {
                Some(component) => component.render(&element, children.as_deref(), ctx)?,
                None => {
                    tracing::warn!(
                        "No component registered for <{}>, emitting a custom element",
                        element.component
                    );
                    to_custom_element(
                        &element,
                        &custom_element_name(&element.component),
                        children.as_deref(),
                    )
                }
            };

            out.push_str(&rendered);
            rest = &tail[consumed..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

/// Byte offset of the next `<` that opens a capitalized tag.
fn find_component_start(code: &str) -> Option<usize> {
    let bytes = code.as_bytes();
    code.match_indices('<')
        .map(|(i, _)| i)
        .find(|&i| bytes.get(i + 1).is_some_and(u8::is_ascii_uppercase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::InlineJsx;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    struct Shout;

    impl MdxComponent for Shout {
        fn name(&self) -> &'static str {
            "Shout"
        }

        fn render(
            &self,
            _element: &InlineJsx,
            children: Option<&str>,
            _ctx: &RenderContext<'_>,
        ) -> Result<String, ComponentError> {
            Ok(format!("<strong>{}</strong>", children.unwrap_or_default().to_uppercase()))
        }
    }

    fn hydrate(registry: &ComponentRegistry, code: &str) -> Result<String, ComponentError> {
        let tweets = IndexMap::new();
        let ctx = RenderContext {
            tweets: &tweets,
            toc: &[],
        };
        registry.hydrate(code, &ctx)
    }

    #[test]
    fn registers_builtins() {
        let registry = ComponentRegistry::with_builtins();

        assert!(registry.contains("StaticTweet"));
        assert!(registry.contains("ScrollSpyWidget"));
        assert_eq!(registry.names().len(), 8);
    }

    #[test]
    fn leaves_plain_html_alone() {
        let registry = ComponentRegistry::with_builtins();
        let code = "<h1 id=\"a\">A &lt;B&gt;</h1>\n<p>x < Y</p>\n";

        assert_eq!(hydrate(&registry, code).unwrap(), code);
    }

    #[test]
    fn hydrates_nested_children_first() {
        let mut registry = ComponentRegistry::new();
        registry.register(Box::new(Shout));
        registry.register(Box::new(crate::builtin::Callout));

        let html = hydrate(&registry, "<p>a</p><Callout><Shout>hey</Shout></Callout><p>b</p>")
            .unwrap();

        assert_eq!(
            html,
            r#"<p>a</p><div class="callout callout-info" role="note"><strong>HEY</strong></div><p>b</p>"#
        );
    }

    #[test]
    fn unknown_components_become_custom_elements() {
        let registry = ComponentRegistry::new();

        let html = hydrate(&registry, r#"<Chart kind="line" />"#).unwrap();

        assert_eq!(html, r#"<mdx-chart kind="line"></mdx-chart>"#);
    }

    #[test]
    fn propagates_component_errors() {
        let registry = ComponentRegistry::with_builtins();

        let err = hydrate(&registry, "<Image alt=\"no source\" />").unwrap_err();

        assert!(matches!(err, ComponentError::MissingProp { component: "Image", prop: "src" }));
    }

    #[test]
    fn rejects_runaway_nesting() {
        let registry = ComponentRegistry::with_builtins();
        let depth = MAX_DEPTH + 2;
        let code = format!(
            "{}x{}",
            "<HighlightSection>".repeat(depth),
            "</HighlightSection>".repeat(depth)
        );

        assert!(matches!(hydrate(&registry, &code), Err(ComponentError::TooDeep(_))));
    }
}
