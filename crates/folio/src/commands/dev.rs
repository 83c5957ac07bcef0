//! Development server command.

use anyhow::Result;
use folio_mdx::ContentType;
use folio_server::{DevServer, DevServerConfig};

use crate::config::Config;

/// Scratch directory for generated files while developing.
const DEV_DIR: &str = ".folio";

/// Run the dev server.
pub async fn run(config: &Config, port: u16, open: bool) -> Result<()> {
    tracing::info!("Starting development server on port {}", port);

    let root = config.root();
    let loader = config.loader();

    let mut watch_paths = vec![
        loader.content_dir(ContentType::Post),
        loader.content_dir(ContentType::Snippet),
    ];
    watch_paths.extend(loader.support_paths());
    if let Some(templates) = &config.content.templates {
        watch_paths.push(templates.clone());
    }

    let scratch = root.join(DEV_DIR);
    let og = config.og_generator(&scratch);

    let server_config = DevServerConfig {
        port,
        open,
        og_dir: og.image_dir(),
        watch_paths,
        ..Default::default()
    };

    DevServer::new(server_config, config.page(&scratch, true))
        .start()
        .await?;

    Ok(())
}
