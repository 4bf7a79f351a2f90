//! Filesystem watcher for the bound vault directory.
//!
//! notify delivers raw events on its own thread; they are pushed into a
//! tokio channel and a forwarding task normalizes, coalesces, and hands
//! them to the broadcaster. Dropping the watcher closes the channel, which
//! flushes whatever is pending and ends the task.

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Duration, MissedTickBehavior};

use super::coalescing::{CoalescerConfig, EventCoalescer};
use crate::gateway::{EventBroadcaster, FileEventKind, GatewayMessage};
use crate::notes::decompose::MARKDOWN_EXT;

/// How often pending coalesced events are checked for expiry
const FLUSH_TICK_MS: u64 = 25;

pub struct VaultWatcher {
    root: PathBuf,
    _watcher: RecommendedWatcher,
}

impl VaultWatcher {
    /// Start watching `root` (non-recursive). Must be called from within a
    /// tokio runtime. Files already present produce no events.
    pub fn start(
        root: &Path,
        broadcaster: Arc<EventBroadcaster>,
        config: CoalescerConfig,
    ) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // Receiver gone means the forwarder already stopped
            let _ = tx.send(res);
        })?;
        watcher.watch(root, RecursiveMode::NonRecursive)?;

        tokio::spawn(forward_events(rx, broadcaster, EventCoalescer::new(config)));
        log::info!("[Watcher] Watching {} for changes", root.display());

        Ok(Self {
            root: root.to_path_buf(),
            _watcher: watcher,
        })
    }
}

impl Drop for VaultWatcher {
    fn drop(&mut self) {
        log::info!("[Watcher] Stopped watching {}", self.root.display());
    }
}

async fn forward_events(
    mut rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    broadcaster: Arc<EventBroadcaster>,
    coalescer: EventCoalescer,
) {
    let publish = |kind: FileEventKind, filename: String| {
        log::info!("[Watcher] File {} has been {}", filename, describe(kind));
        broadcaster.broadcast(GatewayMessage::file_event(kind, filename));
    };

    let mut tick = tokio::time::interval(Duration::from_millis(FLUSH_TICK_MS));
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            res = rx.recv() => match res {
                Some(Ok(event)) => {
                    for (kind, filename) in normalize_event(&event) {
                        if let Some((kind, filename)) = coalescer.add_event(kind, &filename) {
                            publish(kind, filename);
                        }
                    }
                }
                Some(Err(e)) => {
                    log::error!("[Watcher] Watcher error: {}", e);
                    let filename = e.paths.first().and_then(|p| basename(p)).unwrap_or_default();
                    broadcaster.broadcast(GatewayMessage::watch_error(filename, e.to_string()));
                }
                None => break,
            },
            _ = tick.tick(), if coalescer.enabled() => {
                for (kind, filename) in coalescer.check_timeouts() {
                    publish(kind, filename);
                }
            }
        }
    }

    for (kind, filename) in coalescer.flush_all() {
        publish(kind, filename);
    }
}

fn describe(kind: FileEventKind) -> &'static str {
    match kind {
        FileEventKind::Add => "added",
        FileEventKind::Change => "changed",
        FileEventKind::Unlink => "removed",
        FileEventKind::Error => "reported an error",
    }
}

/// Map a raw notify event to `(kind, basename)` pairs for watched files.
pub fn normalize_event(event: &Event) -> Vec<(FileEventKind, String)> {
    let tagged: Vec<(FileEventKind, &PathBuf)> = match &event.kind {
        EventKind::Create(_) => event.paths.iter().map(|p| (FileEventKind::Add, p)).collect(),
        EventKind::Remove(_) => event.paths.iter().map(|p| (FileEventKind::Unlink, p)).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            event.paths.iter().map(|p| (FileEventKind::Unlink, p)).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            event.paths.iter().map(|p| (FileEventKind::Add, p)).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut out = Vec::new();
            if let Some(from) = event.paths.first() {
                out.push((FileEventKind::Unlink, from));
            }
            if let Some(to) = event.paths.get(1) {
                out.push((FileEventKind::Add, to));
            }
            out
        }
        // Backends that cannot tell which side of a rename this is
        EventKind::Modify(ModifyKind::Name(_)) => event
            .paths
            .iter()
            .map(|p| {
                let kind = if p.exists() { FileEventKind::Add } else { FileEventKind::Unlink };
                (kind, p)
            })
            .collect(),
        EventKind::Modify(_) => event.paths.iter().map(|p| (FileEventKind::Change, p)).collect(),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    };

    tagged
        .into_iter()
        .filter(|(_, path)| is_watched(path))
        .filter_map(|(kind, path)| basename(path).map(|name| (kind, name)))
        .collect()
}

/// Markdown files that are not dotfiles
fn is_watched(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.ends_with(MARKDOWN_EXT) && !name.starts_with('.'),
        None => false,
    }
}

fn basename(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().to_string())
}
