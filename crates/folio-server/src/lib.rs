//! Development server with live reload for folio blogs.
//!
//! Serves pages rendered fresh on every request, watches content for changes
//! and tells connected browsers to reload.

pub mod server;
pub mod watcher;
pub mod websocket;

pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
pub use websocket::{ReloadHub, ReloadMessage};
