//! Manifest change notifications
//!
//! Watches the directory containing the manifest rather than the file
//! itself, since editors commonly save by replacing the file.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Capacity of the change channel; bursts beyond it are coalesced anyway
const CHANNEL_CAPACITY: usize = 64;

/// Keeps the underlying watcher alive for as long as it is held
pub struct ManifestWatcher {
    _watcher: RecommendedWatcher,
    manifest_path: PathBuf,
}

impl ManifestWatcher {
    /// Start watching a manifest file.
    ///
    /// Returns the watcher and a receiver yielding one message per relevant
    /// filesystem event.
    pub fn start(manifest_path: &Path) -> notify::Result<(Self, mpsc::Receiver<()>)> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let target = manifest_path.to_path_buf();
        let file_name = target.file_name().map(|name| name.to_os_string());

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    if is_relevant(&event, file_name.as_deref()) {
                        debug!(kind = ?event.kind, "manifest event");
                        let _ = tx.try_send(());
                    }
                }
                Err(e) => warn!("watch error: {}", e),
            }
        })?;

        let dir = match manifest_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        Ok((
            Self {
                _watcher: watcher,
                manifest_path: target,
            },
            rx,
        ))
    }

    /// Manifest being watched
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }
}

fn is_relevant(event: &Event, file_name: Option<&std::ffi::OsStr>) -> bool {
    let changes_content = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
    );
    changes_content
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use std::ffi::OsStr;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_relevant_events() {
        let name = Some(OsStr::new("package.json"));
        assert!(is_relevant(
            &event(EventKind::Modify(ModifyKind::Any), "/app/package.json"),
            name
        ));
        assert!(is_relevant(
            &event(EventKind::Create(CreateKind::File), "/app/package.json"),
            name
        ));
        assert!(!is_relevant(
            &event(EventKind::Modify(ModifyKind::Any), "/app/yarn.lock"),
            name
        ));
        assert!(!is_relevant(
            &event(EventKind::Remove(RemoveKind::File), "/app/package.json"),
            name
        ));
    }

    #[tokio::test]
    async fn test_start_on_existing_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let manifest = dir.path().join("package.json");
        std::fs::write(&manifest, "{}").unwrap();

        let (watcher, _rx) = ManifestWatcher::start(&manifest).unwrap();
        assert_eq!(watcher.manifest_path(), manifest.as_path());
    }

    #[test]
    fn test_start_on_missing_directory_fails() {
        assert!(ManifestWatcher::start(Path::new("/nonexistent/dir/package.json")).is_err());
    }
}
