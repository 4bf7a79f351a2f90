//! Per-file debouncing of watcher events
//!
//! A single save from an editor usually arrives as several raw events
//! (truncate, write, attribute change, or a rename-over). Events for the
//! same filename inside the debounce window are merged into one. A file
//! that keeps changing is still flushed once `max_wait_ms` has passed since
//! its first pending event.

use dashmap::DashMap;
use tokio::time::{Duration, Instant};

use crate::gateway::FileEventKind;

/// Configuration for event coalescing
#[derive(Debug, Clone)]
pub struct CoalescerConfig {
    /// Quiet period after the last event for a file before it is flushed (0 disables)
    pub debounce_ms: u64,
    /// Upper bound on how long a file's events may be held (0 means no bound)
    pub max_wait_ms: u64,
}

impl Default for CoalescerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            max_wait_ms: 1000,
        }
    }
}

#[derive(Debug)]
struct PendingEvent {
    kind: FileEventKind,
    /// When the first event of this batch arrived
    first_event_at: Instant,
    last_event_at: Instant,
}

impl PendingEvent {
    fn is_ready(&self, now: Instant, debounce: Duration, max_wait: Option<Duration>) -> bool {
        now.saturating_duration_since(self.last_event_at) >= debounce
            || max_wait.is_some_and(|max| now.saturating_duration_since(self.first_event_at) >= max)
    }
}

pub struct EventCoalescer {
    config: CoalescerConfig,
    /// Pending events keyed by filename
    pending: DashMap<String, PendingEvent>,
}

impl EventCoalescer {
    pub fn new(config: CoalescerConfig) -> Self {
        Self {
            config,
            pending: DashMap::new(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.config.debounce_ms > 0
    }

    fn max_wait(&self) -> Option<Duration> {
        (self.config.max_wait_ms > 0).then(|| Duration::from_millis(self.config.max_wait_ms))
    }

    /// Record an event. Returns an event to publish right away when
    /// coalescing is disabled, for error events, or when the file's batch
    /// has been held for `max_wait_ms`.
    pub fn add_event(&self, kind: FileEventKind, filename: &str) -> Option<(FileEventKind, String)> {
        if !self.enabled() || kind == FileEventKind::Error {
            return Some((kind, filename.to_string()));
        }

        let now = Instant::now();
        let entry = self
            .pending
            .entry(filename.to_string())
            .and_modify(|p| {
                p.kind = merge(p.kind, kind);
                p.last_event_at = now;
            })
            .or_insert(PendingEvent {
                kind,
                first_event_at: now,
                last_event_at: now,
            });

        let held_too_long = self
            .max_wait()
            .is_some_and(|max| now.saturating_duration_since(entry.first_event_at) >= max);
        if held_too_long {
            let merged = entry.kind;
            drop(entry);
            self.pending.remove(filename);
            return Some((merged, filename.to_string()));
        }

        None
    }

    /// Flush every file that has been quiet for the debounce window or held
    /// for the max wait
    pub fn check_timeouts(&self) -> Vec<(FileEventKind, String)> {
        self.flush_ready(Instant::now())
    }

    fn flush_ready(&self, now: Instant) -> Vec<(FileEventKind, String)> {
        let debounce = Duration::from_millis(self.config.debounce_ms);
        let max_wait = self.max_wait();

        let mut ready: Vec<(String, Instant)> = self
            .pending
            .iter()
            .filter(|e| e.is_ready(now, debounce, max_wait))
            .map(|e| (e.key().clone(), e.last_event_at))
            .collect();
        ready.sort_by_key(|(_, at)| *at);

        ready
            .into_iter()
            .filter_map(|(key, _)| self.pending.remove(&key).map(|(name, p)| (p.kind, name)))
            .collect()
    }

    /// Flush everything regardless of age (used when the watcher stops)
    pub fn flush_all(&self) -> Vec<(FileEventKind, String)> {
        let mut all: Vec<(String, Instant)> = self
            .pending
            .iter()
            .map(|e| (e.key().clone(), e.last_event_at))
            .collect();
        all.sort_by_key(|(_, at)| *at);

        all.into_iter()
            .filter_map(|(key, _)| self.pending.remove(&key).map(|(name, p)| (p.kind, name)))
            .collect()
    }

    #[cfg(test)]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// Combine an already pending kind with a newer one for the same file
fn merge(previous: FileEventKind, next: FileEventKind) -> FileEventKind {
    use FileEventKind::*;
    match (previous, next) {
        (_, Unlink) => Unlink,
        (Add, Change) => Add,
        // Deleted and recreated inside the window: an atomic replace
        (Unlink, Add) | (Unlink, Change) => Change,
        (_, next) => next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use FileEventKind::*;

    fn coalescer(debounce_ms: u64) -> EventCoalescer {
        EventCoalescer::new(CoalescerConfig {
            debounce_ms,
            max_wait_ms: 0,
        })
    }

    #[test]
    fn test_disabled_passes_through() {
        let c = coalescer(0);
        assert_eq!(c.add_event(Change, "a.md"), Some((Change, "a.md".to_string())));
        assert_eq!(c.pending_count(), 0);
    }

    #[test]
    fn test_errors_are_never_held() {
        let c = coalescer(100);
        assert_eq!(c.add_event(Error, ""), Some((Error, String::new())));
    }

    #[test]
    fn test_burst_collapses_to_one_change() {
        let c = coalescer(100);
        for _ in 0..4 {
            assert!(c.add_event(Change, "x.md").is_none());
        }
        assert_eq!(c.pending_count(), 1);

        assert!(c.flush_ready(Instant::now()).is_empty());
        let later = Instant::now() + Duration::from_millis(150);
        assert_eq!(c.flush_ready(later), vec![(Change, "x.md".to_string())]);
        assert_eq!(c.pending_count(), 0);
    }

    #[test]
    fn test_merge_rules() {
        assert_eq!(merge(Add, Change), Add);
        assert_eq!(merge(Add, Unlink), Unlink);
        assert_eq!(merge(Change, Unlink), Unlink);
        assert_eq!(merge(Unlink, Add), Change);
        assert_eq!(merge(Change, Change), Change);
        assert_eq!(merge(Change, Add), Add);
    }

    #[test]
    fn test_files_are_tracked_separately() {
        let c = coalescer(50);
        c.add_event(Add, "a.md");
        c.add_event(Change, "b.md");
        c.add_event(Change, "a.md");

        let later = Instant::now() + Duration::from_millis(100);
        let mut flushed = c.flush_ready(later);
        flushed.sort_by(|a, b| a.1.cmp(&b.1));
        assert_eq!(flushed, vec![(Add, "a.md".to_string()), (Change, "b.md".to_string())]);
    }

    #[test]
    fn test_flush_all() {
        let c = coalescer(10_000);
        c.add_event(Change, "a.md");
        assert_eq!(c.flush_all(), vec![(Change, "a.md".to_string())]);
        assert_eq!(c.pending_count(), 0);
    }

    #[test]
    fn test_steady_writes_flush_after_max_wait() {
        let c = EventCoalescer::new(CoalescerConfig {
            debounce_ms: 150,
            max_wait_ms: 400,
        });

        let mut flushed = Vec::new();
        let started = std::time::Instant::now();
        while started.elapsed() < std::time::Duration::from_millis(1200) {
            flushed.extend(c.add_event(Change, "log.md"));
            flushed.extend(c.check_timeouts());
            std::thread::sleep(std::time::Duration::from_millis(50));
        }

        assert!(!flushed.is_empty());
        assert!(flushed.iter().all(|e| *e == (Change, "log.md".to_string())));
    }

    #[test]
    fn test_max_wait_applies_to_pending_batches() {
        let c = EventCoalescer::new(CoalescerConfig {
            debounce_ms: 10_000,
            max_wait_ms: 200,
        });
        assert!(c.add_event(Add, "a.md").is_none());
        c.add_event(Change, "a.md");

        assert!(c.flush_ready(Instant::now()).is_empty());
        let later = Instant::now() + Duration::from_millis(250);
        assert_eq!(c.flush_ready(later), vec![(Add, "a.md".to_string())]);
    }
}
