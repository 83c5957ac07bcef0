//! Development server implementation.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::services::ServeDir;

use folio_mdx::ContentType;
use folio_render::{AssetPipeline, PageOutcome, PostPage};

use crate::watcher::{FileWatcher, WatchEvent};
use crate::websocket::{reload_client_script, ReloadHub, ReloadMessage};

/// WebSocket endpoint browsers listen on for reloads.
const RELOAD_PATH: &str = "/__reload";

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,

    /// Directory holding generated OG images, served at `/og`
    pub og_dir: PathBuf,

    /// Files and directories whose changes trigger a reload
    pub watch_paths: Vec<PathBuf>,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "127.0.0.1".to_string(),
            open: true,
            og_dir: PathBuf::from(".folio/og"),
            watch_paths: Vec::new(),
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("File watch error: {0}")]
    Watch(io::Error),

    #[error("Server error: {0}")]
    Serve(io::Error),
}

/// Shared server state.
struct AppState {
    page: Arc<PostPage>,
    reload: ReloadHub,
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
    page: Arc<PostPage>,
    reload: ReloadHub,
}

impl DevServer {
    /// Create a new development server rendering pages with `page`.
    pub fn new(config: DevServerConfig, page: PostPage) -> Self {
        Self {
            config,
            page: Arc::new(page),
            reload: ReloadHub::new(),
        }
    }

    /// Hub the server broadcasts reloads through.
    pub fn reload_hub(&self) -> &ReloadHub {
        &self.reload
    }

    /// Build the router serving every dev route.
    pub fn router(&self) -> Router {
        let state = Arc::new(AppState {
            page: Arc::clone(&self.page),
            reload: self.reload.clone(),
        });

        Router::new()
            .route("/", get(index_handler))
            .route("/posts/{slug}", get(post_handler))
            .route("/posts/{slug}/", get(post_handler))
            .route("/snippets/{slug}", get(snippet_handler))
            .route("/snippets/{slug}/", get(snippet_handler))
            .route("/assets/main.css", get(css_handler))
            .route("/assets/main.js", get(js_handler))
            .route(RELOAD_PATH, get(ws_handler))
            .route("/__reload.js", get(reload_script_handler))
            .nest_service("/og", ServeDir::new(&self.config.og_dir))
            .fallback(fallback_handler)
            .with_state(state)
    }

    /// Start the development server.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                ServerError::InvalidAddress(format!("{}:{}", self.config.host, self.config.port))
            })?;

        let (watcher, mut rx) =
            FileWatcher::new(&self.config.watch_paths).map_err(ServerError::Watch)?;

        let reload = self.reload.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&reload, event);
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        tracing::info!("Starting dev server at http://{}", addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            if let Err(e) = open::that(&url) {
                tracing::warn!("Could not open browser: {}", e);
            }
        }

        axum::serve(listener, app)
            .await
            .map_err(ServerError::Serve)?;

        Ok(())
    }
}

/// Handle file watch events.
fn handle_watch_event(reload: &ReloadHub, event: WatchEvent) {
    match &event {
        WatchEvent::ContentChanged(path) => tracing::info!("Content changed: {}", path.display()),
        WatchEvent::SupportChanged(path) => tracing::info!("Support file changed: {}", path.display()),
        WatchEvent::Removed(path) => tracing::info!("Removed: {}", path.display()),
    }

    // Pages are rendered per request, so a full reload picks up everything
    reload.send(ReloadMessage::Reload {
        path: event.path().display().to_string(),
    });
}

async fn index_handler(State(state): State<Arc<AppState>>) -> Response {
    let page = Arc::clone(&state.page);

    match tokio::task::spawn_blocking(move || page.render_index()).await {
        Ok(Ok(html)) => Html(html).into_response(),
        Ok(Err(e)) => {
            tracing::error!("Could not render index: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
        Err(e) => {
            tracing::error!("Index task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

async fn post_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    render_page(&state, ContentType::Post, slug).await
}

async fn snippet_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    render_page(&state, ContentType::Snippet, slug).await
}

/// Load and render a page from scratch.
async fn render_page(state: &AppState, content_type: ContentType, slug: String) -> Response {
    let page = Arc::clone(&state.page);

    match tokio::task::spawn_blocking(move || page.build(content_type, &slug)).await {
        Ok(PageOutcome::Found(html)) => Html(html).into_response(),
        Ok(PageOutcome::NotFound) => not_found(state),
        Err(e) => {
            tracing::error!("Page task failed: {}", e);
            not_found(state)
        }
    }
}

async fn fallback_handler(State(state): State<Arc<AppState>>) -> Response {
    not_found(&state)
}

fn not_found(state: &AppState) -> Response {
    let body = state.page.render_not_found().unwrap_or_else(|e| {
        tracing::error!("Could not render not-found page: {}", e);
        "<h1>Page not found</h1>".to_string()
    });

    (StatusCode::NOT_FOUND, Html(body)).into_response()
}

async fn css_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css")],
        AssetPipeline::generate_css(),
    )
}

async fn js_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        AssetPipeline::generate_js(),
    )
}

async fn reload_script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        reload_client_script(RELOAD_PATH),
    )
}

/// Handler for the reload WebSocket endpoint.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let hub = state.reload.clone();
    ws.on_upgrade(move |socket| handle_ws(socket, hub))
}

/// Forward reload messages to one browser.
async fn handle_ws(mut socket: WebSocket, hub: ReloadHub) {
    let mut rx = hub.subscribe();

    if send_message(&mut socket, &ReloadMessage::Connected).await.is_err() {
        return;
    }

    while let Ok(msg) = rx.recv().await {
        if send_message(&mut socket, &msg).await.is_err() {
            break;
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!("Could not encode reload message: {}", e);
            return Ok(());
        }
    };

    socket.send(Message::Text(json.into())).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_mdx::ContentLoader;
    use folio_render::SvgCardGenerator;
    use std::fs;
    use tempfile::{tempdir, TempDir};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn blog() -> TempDir {
        let temp = tempdir().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("content")).unwrap();
        fs::create_dir_all(root.join("core/components/MDX/custom/Widgets")).unwrap();
        fs::create_dir_all(root.join("core/context")).unwrap();
        fs::write(
            root.join("core/components/MDX/custom/Widgets/ScrollSpyWidget.tsx"),
            "export default function ScrollSpyWidget() { return null; }\n",
        )
        .unwrap();
        fs::write(
            root.join("core/context/ThemeContext.tsx"),
            "export const ThemeContext = {};\n",
        )
        .unwrap();
        fs::write(
            root.join("content/hello.mdx"),
            "---\ntitle: Hello there\n---\n\nFirst post.\n",
        )
        .unwrap();

        temp
    }

    fn server(root: &std::path::Path) -> DevServer {
        let og_out = root.join(".folio");
        let og = SvgCardGenerator::new(&og_out, "/");
        let config = DevServerConfig {
            og_dir: og.image_dir(),
            open: false,
            ..Default::default()
        };

        DevServer::new(config, PostPage::new(ContentLoader::new(root), Box::new(og)))
    }

    /// Serve the router on an ephemeral port and issue one GET.
    async fn get(server: &DevServer, path: &str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = server.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            path
        );
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[test]
    fn default_config() {
        let config = DevServerConfig::default();
        assert_eq!(config.port, 3000);
        assert!(config.open);
    }

    #[tokio::test]
    async fn serves_posts() {
        let temp = blog();

        let response = get(&server(temp.path()), "/posts/hello").await;

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("<h1>Hello there</h1>"));
    }

    #[tokio::test]
    async fn missing_posts_are_404() {
        let temp = blog();

        let response = get(&server(temp.path()), "/posts/missing").await;

        assert!(response.starts_with("HTTP/1.1 404"));
        assert!(response.contains("Page not found"));
    }

    #[tokio::test]
    async fn serves_generated_og_images() {
        let temp = blog();
        let server = server(temp.path());

        get(&server, "/posts/hello/").await;
        let response = get(&server, "/og/posts/hello.svg").await;

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("<svg"));
    }

    #[tokio::test]
    async fn serves_index_and_assets() {
        let temp = blog();
        let server = server(temp.path());

        let index = get(&server, "/").await;
        let css = get(&server, "/assets/main.css").await;

        assert!(index.contains(">Hello there</a>"));
        assert!(css.contains("text/css"));
    }

    #[tokio::test]
    async fn unknown_routes_are_404() {
        let temp = blog();

        let response = get(&server(temp.path()), "/nope").await;

        assert!(response.starts_with("HTTP/1.1 404"));
    }

    #[test]
    fn watch_events_broadcast_reloads() {
        let hub = ReloadHub::new();
        let mut rx = hub.subscribe();

        handle_watch_event(&hub, WatchEvent::ContentChanged(PathBuf::from("content/a.mdx")));

        assert_eq!(
            rx.try_recv().unwrap(),
            ReloadMessage::Reload {
                path: "content/a.mdx".to_string()
            }
        );
    }
}
