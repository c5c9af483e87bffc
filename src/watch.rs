//! Profile file change watching
//!
//! A notify watcher on the profile file's directory, bridged into the
//! tokio runtime over an unbounded channel. Its whole contract is: on
//! an external create/modify of the profile file, call
//! [`ProfileStore::reload`]. The returned watcher must be kept alive
//! for the lifetime of the service.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::error::Result;
use crate::store::ProfileStore;

/// Start watching the store's profile file for external changes.
pub fn spawn(store: Arc<ProfileStore>) -> Result<RecommendedWatcher> {
    let config_path = store.source().path().to_path_buf();
    // Watch the parent directory: editors and `write_document` both
    // replace the file, and replace events surface on the directory.
    let watch_dir = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut watcher = RecommendedWatcher::new(
        move |result: std::result::Result<Event, notify::Error>| match result {
            Ok(event) => {
                let _ = tx.send(event);
            }
            Err(e) => error!(error = %e, "profile file watch error"),
        },
        notify::Config::default(),
    )?;
    watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;
    info!(path = %config_path.display(), "watching profile file for changes");

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                continue;
            }
            if !event
                .paths
                .iter()
                .any(|p| p.file_name() == config_path.file_name())
            {
                continue;
            }
            info!(path = %config_path.display(), "profile file changed, refreshing profiles");
            if let Err(e) = store.reload() {
                // Keep serving from the previous table.
                error!(error = %e, "reload after profile file change failed");
            }
        }
    });

    Ok(watcher)
}
