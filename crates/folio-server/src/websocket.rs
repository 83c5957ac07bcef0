//! WebSocket-based live reload.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Messages sent to connected browsers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    /// Something changed, reload the page
    Reload {
        /// Changed file, for the console
        path: String,
    },

    /// Connection established
    Connected,
}

/// Hub for broadcasting reload messages to all connected browsers.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    sender: broadcast::Sender<ReloadMessage>,
}

impl ReloadHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send a message to all connected browsers.
    pub fn send(&self, msg: ReloadMessage) {
        // No receivers is fine
        let _ = self.sender.send(msg);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.sender.subscribe()
    }

    /// Number of connected browsers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Client-side reload script served at `/__reload.js`.
///
/// Connects to `path` on the page's own host and reconnects after the
/// server restarts.
pub fn reload_client_script(path: &str) -> String {
    format!(
        r#"// folio development reload client
(function() {{
  'use strict';

  function connect() {{
    const protocol = location.protocol === 'https:' ? 'wss:' : 'ws:';
    const ws = new WebSocket(protocol + '//' + location.host + '{}');

    ws.onmessage = function(event) {{
      const msg = JSON.parse(event.data);
      if (msg.type === 'reload') {{
        console.log('[folio] ' + msg.path + ' changed, reloading');
        location.reload();
      }}
    }};

    ws.onclose = function() {{
      setTimeout(connect, 1000);
    }};
  }}

  connect();
}})();
"#,
        path
    )
}
