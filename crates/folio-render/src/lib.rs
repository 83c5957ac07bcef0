//! Page rendering and static builds for folio blogs.
//!
//! Turns loaded documents into HTML pages with templates, hydrated components,
//! static tweets and Open Graph cards, and writes whole sites to disk.

pub mod assets;
pub mod builder;
pub mod og;
pub mod page;
pub mod templates;
pub mod tweets;

pub use assets::AssetPipeline;
pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
pub use og::{OgError, OgImageGenerator, OgImageRequest, SvgCardGenerator};
pub use page::{OgColors, PageOutcome, PostPage, RenderError};
pub use templates::{SiteMeta, TemplateEngine};
pub use tweets::{ArchiveTweetSource, NoTweets, TweetError, TweetSource};
