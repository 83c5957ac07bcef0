//! File watching for live reload.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

use folio_mdx::content::CONTENT_EXTENSION;

/// Quiet period after the last event before changes are reported.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// A content file was created or modified
    ContentChanged(PathBuf),

    /// A support module or template changed
    SupportChanged(PathBuf),

    /// A watched file was deleted
    Removed(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::ContentChanged(path)
            | WatchEvent::SupportChanged(path)
            | WatchEvent::Removed(path) => path,
        }
    }
}

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher for the given paths.
    ///
    /// Directories are watched recursively. Paths that do not exist are
    /// skipped. Returns the watcher and a channel to receive events.
    pub fn new(
        paths: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        for path in paths {
            if path.exists() {
                let mode = if path.is_dir() {
                    RecursiveMode::Recursive
                } else {
                    RecursiveMode::NonRecursive
                };
                watcher.watch(path, mode).map_err(std::io::Error::other)?;
            } else {
                tracing::debug!("Not watching missing path {}", path.display());
            }
        }

        std::thread::spawn(move || {
            while let Ok(first) = sync_rx.recv() {
                // Collect the burst of events an editor save produces
                let mut batch = vec![first];
                while let Ok(event) = sync_rx.recv_timeout(DEBOUNCE) {
                    batch.push(event);
                }

                let mut seen: Vec<WatchEvent> = Vec::new();
                for event in &batch {
                    for path in &event.paths {
                        if let Some(e) = classify_event(path, &event.kind) {
                            if !seen.contains(&e) {
                                seen.push(e);
                            }
                        }
                    }
                }

                for e in seen {
                    if async_tx.blocking_send(e).is_err() {
                        return;
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    let is_content = path.extension().and_then(|e| e.to_str()) == Some(CONTENT_EXTENSION);

    match kind {
        EventKind::Remove(_) => Some(WatchEvent::Removed(path.to_path_buf())),
        EventKind::Create(_) | EventKind::Modify(_) if is_content => {
            Some(WatchEvent::ContentChanged(path.to_path_buf()))
        }
        EventKind::Create(_) | EventKind::Modify(_) => {
            Some(WatchEvent::SupportChanged(path.to_path_buf()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use notify::EventKind;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn classifies_events() {
        let mdx = Path::new("content/a.mdx");
        let tsx = Path::new("core/context/ThemeContext.tsx");

        assert_eq!(
            classify_event(mdx, &EventKind::Modify(ModifyKind::Any)),
            Some(WatchEvent::ContentChanged(mdx.to_path_buf()))
        );
        assert_eq!(
            classify_event(tsx, &EventKind::Create(CreateKind::File)),
            Some(WatchEvent::SupportChanged(tsx.to_path_buf()))
        );
        assert_eq!(
            classify_event(mdx, &EventKind::Remove(RemoveKind::File)),
            Some(WatchEvent::Removed(mdx.to_path_buf()))
        );
        assert_eq!(classify_event(mdx, &EventKind::Any), None);
    }

    #[tokio::test]
    async fn watches_file_changes() {
        let temp = tempdir().unwrap();
        let test_file = temp.path().join("post.mdx");

        // Create the watcher first so it sees the file being created
        let (watcher, mut rx) = FileWatcher::new(&[temp.path().to_path_buf()]).unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(&test_file, "# Created").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(3), rx.recv()).await;

        drop(watcher);

        assert!(event.is_ok(), "timeout waiting for file watch event");
        let event = event.unwrap().expect("channel should not be closed");
        assert!(event.path().ends_with("post.mdx"));
    }
}
