//! MDX content loading for folio blogs.
//!
//! This crate reads posts and snippets from disk, extracts YAML frontmatter,
//! bundles MDX documents through a fixed markdown plugin pipeline, finds static
//! tweet references and estimates reading time.

pub mod bundler;
pub mod content;
pub mod frontmatter;
pub mod loader;
pub mod plugins;
pub mod reading_time;
pub mod tweets;

pub use bundler::{Bundle, BundleError, BundleOutput, CompiledModule, MdxBundler, TocEntry};
pub use content::{slug_from_file_name, ContentType};
pub use frontmatter::{extract_frontmatter, FrontMatter, FrontmatterError};
pub use loader::{ContentLoader, LoadError, Post, Summary, SupportFiles};
pub use plugins::{PluginError, RemarkPlugin};
pub use reading_time::{reading_time, ReadingTime};
pub use tweets::extract_tweet_ids;
