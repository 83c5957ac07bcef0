//! Static site builder.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use folio_mdx::{ContentType, LoadError};

use crate::assets::AssetPipeline;
use crate::page::{allow_missing_snippets, PageOutcome, PostPage, RenderError};

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Output directory
    pub output_dir: PathBuf,

    /// Minify CSS output
    pub minify: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dist"),
            minify: true,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of posts written
    pub posts: usize,

    /// Number of snippets written
    pub snippets: usize,

    /// Pages that could not be built
    pub not_found: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to list content: {0}")]
    List(#[from] LoadError),

    #[error("Failed to render {page}: {source}")]
    Render {
        page: &'static str,
        source: RenderError,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Build task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Static site builder.
#[derive(Clone)]
pub struct StaticBuilder {
    config: BuildConfig,
    page: Arc<PostPage>,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig, page: PostPage) -> Self {
        Self {
            config,
            page: Arc::new(page),
        }
    }

    /// Build the static site on the blocking pool.
    ///
    /// Pages are built one after another. A page that cannot be built is
    /// counted and skipped.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let builder = self.clone();
        tokio::task::spawn_blocking(move || builder.build_pages()).await?
    }

    fn build_pages(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let out = &self.config.output_dir;

        fs::create_dir_all(out).map_err(|source| BuildError::Write {
            path: out.clone(),
            source,
        })?;

        let mut result = BuildResult {
            posts: 0,
            snippets: 0,
            not_found: 0,
            duration_ms: 0,
            output_dir: out.clone(),
        };

        for content_type in [ContentType::Post, ContentType::Snippet] {
            let slugs = allow_missing_snippets(content_type, self.page.loader().slugs(content_type))?;

            for slug in slugs {
                match self.page.build(content_type, &slug) {
                    PageOutcome::Found(html) => {
                        let path = out
                            .join(content_type.route())
                            .join(&slug)
                            .join("index.html");
                        write(&path, &html)?;

                        match content_type {
                            ContentType::Post => result.posts += 1,
                            ContentType::Snippet => result.snippets += 1,
                        }
                    }
                    PageOutcome::NotFound => {
                        tracing::warn!("Skipping {} \"{}\"", content_type, slug);
                        result.not_found += 1;
                    }
                }
            }
        }

        let index = self
            .page
            .render_index()
            .map_err(|source| BuildError::Render {
                page: "index",
                source,
            })?;
        write(&out.join("index.html"), &index)?;

        let not_found = self
            .page
            .render_not_found()
            .map_err(|source| BuildError::Render {
                page: "404",
                source,
            })?;
        write(&out.join("404.html"), &not_found)?;

        self.generate_assets()?;

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    /// Generate static assets.
    fn generate_assets(&self) -> Result<(), BuildError> {
        let assets_dir = self.config.output_dir.join("assets");

        let css = AssetPipeline::generate_css();
        let css = if self.config.minify {
            AssetPipeline::minify_css(&css).unwrap_or_else(|e| {
                tracing::warn!("Writing unminified CSS: {}", e);
                css
            })
        } else {
            css
        };
        write(&assets_dir.join("main.css"), &css)?;

        write(&assets_dir.join("main.js"), &AssetPipeline::generate_js())?;

        Ok(())
    }
}

fn write(path: &Path, contents: &str) -> Result<(), BuildError> {
    let io_err = |source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, contents).map_err(io_err)
}
