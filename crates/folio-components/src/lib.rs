//! Components for folio documents.
//!
//! Compiled MDX keeps component tags such as `<Callout>` in its markup. This
//! crate parses those tags and replaces them with HTML at render time.

pub mod builtin;
pub mod inline;
pub mod registry;
pub mod traits;
pub mod tweet;

pub use builtin::builtins;
pub use inline::{custom_element_name, parse_inline_jsx, InlineJsx, PropValue};
pub use registry::{ComponentRegistry, MAX_DEPTH};
pub use traits::{ComponentError, MdxComponent, RenderContext};
pub use tweet::{status_url, Tweet, TweetAuthor};
