//! Static site build command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use folio_render::{BuildConfig, StaticBuilder};

use crate::config::Config;

/// Run the build command.
pub async fn run(config: &Config, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    tracing::info!("Building static site...");

    let output_dir = output.unwrap_or_else(|| config.build.output.clone());
    let build = BuildConfig {
        output_dir: output_dir.clone(),
        minify: minify.unwrap_or(config.build.minify),
    };

    let result = StaticBuilder::new(build, config.page(&output_dir, false))
        .build()
        .await
        .context("Build failed")?;

    tracing::info!(
        "Built {} posts and {} snippets in {}ms",
        result.posts,
        result.snippets,
        result.duration_ms
    );

    if result.not_found > 0 {
        tracing::warn!("{} pages could not be built, see errors above", result.not_found);
    }

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
