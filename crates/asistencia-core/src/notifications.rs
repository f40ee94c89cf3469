//! Transient user-facing messages with per-entry auto-expiry.
//!
//! `NotificationQueue` is a cheap-to-clone handle over one shared, ordered
//! collection. Insertion order is display order. Every non-persistent entry
//! with a positive timeout owns exactly one expiry task on the tokio runtime;
//! removing the entry early aborts that task.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

/// Default lifetime of a notification.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(4000);

/// Process-wide id counter so two queues never hand out the same id.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: String,
    pub message: String,
    pub kind: NotificationKind,
    pub timeout: Option<Duration>,
    pub persistent: bool,
}

/// Per-notification overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyOptions {
    pub timeout: Option<Duration>,
    pub persistent: bool,
}

impl Default for NotifyOptions {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            persistent: false,
        }
    }
}

impl NotifyOptions {
    /// Options for an entry that stays until removed explicitly.
    pub fn persistent() -> Self {
        Self {
            persistent: true,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    fn expires_after(&self) -> Option<Duration> {
        match self.timeout {
            Some(timeout) if !self.persistent && !timeout.is_zero() => Some(timeout),
            _ => None,
        }
    }
}

struct Entry {
    notification: Notification,
    expiry: Option<AbortHandle>,
}

struct Inner {
    entries: Mutex<Vec<Entry>>,
    updates: watch::Sender<Vec<Notification>>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, entries: &[Entry]) {
        let snapshot = entries.iter().map(|e| e.notification.clone()).collect();
        self.updates.send_replace(snapshot);
    }

    /// Remove an entry, returning its expiry handle if it was still present.
    fn take(&self, id: &str) -> Option<Option<AbortHandle>> {
        let mut entries = self.lock();
        let index = entries.iter().position(|e| e.notification.id == id)?;
        let entry = entries.remove(index);
        self.publish(&entries);
        Some(entry.expiry)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let entries = self.entries.get_mut().unwrap_or_else(PoisonError::into_inner);
        for entry in entries.drain(..) {
            if let Some(expiry) = entry.expiry {
                expiry.abort();
            }
        }
    }
}

/// Shared handle to the notification collection. Clone is cheap.
#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<Inner>,
}

impl fmt::Debug for NotificationQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationQueue")
            .field("len", &self.len())
            .finish()
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationQueue {
    pub fn new() -> Self {
        let (updates, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(Vec::new()),
                updates,
            }),
        }
    }

    /// Append a notification and return its id.
    ///
    /// Expiry is scheduled on the current tokio runtime. Outside a runtime
    /// the entry is kept until removed.
    pub fn add(&self, message: impl Into<String>, kind: NotificationKind, options: NotifyOptions) -> String {
        let id = format!("notification-{}", NEXT_ID.fetch_add(1, Ordering::Relaxed));
        let notification = Notification {
            id: id.clone(),
            message: message.into(),
            kind,
            timeout: options.timeout,
            persistent: options.persistent,
        };
        debug!(id = %id, kind = %kind, message = %notification.message, "Notification added");

        // Hold the lock while spawning so the timer can never observe the
        // collection before its own entry is in it.
        let mut entries = self.inner.lock();
        let expiry = options
            .expires_after()
            .and_then(|timeout| self.schedule_expiry(id.clone(), timeout));
        entries.push(Entry { notification, expiry });
        self.inner.publish(&entries);
        id
    }

    fn schedule_expiry(&self, id: String, timeout: Duration) -> Option<AbortHandle> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!(id = %id, "No async runtime, notification will not auto-expire");
                return None;
            }
        };

        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        let task = runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(inner) = inner.upgrade() {
                if inner.take(&id).is_some() {
                    debug!(id = %id, "Notification expired");
                }
            }
        });
        Some(task.abort_handle())
    }

    /// Remove a notification and cancel its timer. Unknown ids are ignored.
    pub fn remove(&self, id: &str) {
        if let Some(Some(expiry)) = self.inner.take(id) {
            expiry.abort();
        }
    }

    /// Remove everything, cancelling all pending timers.
    pub fn clear_all(&self) {
        let mut entries = self.inner.lock();
        for entry in entries.drain(..) {
            if let Some(expiry) = entry.expiry {
                expiry.abort();
            }
        }
        self.inner.publish(&entries);
    }

    pub fn success(&self, message: impl Into<String>) -> String {
        self.add(message, NotificationKind::Success, NotifyOptions::default())
    }

    pub fn error(&self, message: impl Into<String>) -> String {
        self.add(message, NotificationKind::Error, NotifyOptions::default())
    }

    pub fn warning(&self, message: impl Into<String>) -> String {
        self.add(message, NotificationKind::Warning, NotifyOptions::default())
    }

    pub fn info(&self, message: impl Into<String>) -> String {
        self.add(message, NotificationKind::Info, NotifyOptions::default())
    }

    pub fn success_with(&self, message: impl Into<String>, options: NotifyOptions) -> String {
        self.add(message, NotificationKind::Success, options)
    }

    pub fn error_with(&self, message: impl Into<String>, options: NotifyOptions) -> String {
        self.add(message, NotificationKind::Error, options)
    }

    pub fn warning_with(&self, message: impl Into<String>, options: NotifyOptions) -> String {
        self.add(message, NotificationKind::Warning, options)
    }

    pub fn info_with(&self, message: impl Into<String>, options: NotifyOptions) -> String {
        self.add(message, NotificationKind::Info, options)
    }

    /// Current entries in display order.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.inner
            .lock()
            .iter()
            .map(|e| e.notification.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Watch the ordered collection; a new value is published on every change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.inner.updates.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn ids(queue: &NotificationQueue) -> Vec<String> {
        queue.snapshot().into_iter().map(|n| n.id).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_uses_defaults() {
        let queue = NotificationQueue::new();
        let id = queue.add("Test message", NotificationKind::Success, NotifyOptions::default());

        let entries = queue.snapshot();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].message, "Test message");
        assert_eq!(entries[0].kind, NotificationKind::Success);
        assert_eq!(entries[0].timeout, Some(Duration::from_millis(4000)));
        assert!(!entries[0].persistent);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expires_after_timeout_without_touching_others() {
        let queue = NotificationQueue::new();
        let keep = queue.info_with("stays", NotifyOptions::persistent());
        let short = queue.success_with("short", NotifyOptions::default().with_timeout(Duration::from_millis(1000)));
        let long = queue.warning_with("long", NotifyOptions::default().with_timeout(Duration::from_millis(5000)));

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(ids(&queue), vec![keep.clone(), short, long.clone()]);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(ids(&queue), vec![keep.clone(), long]);

        tokio::time::sleep(Duration::from_millis(4000)).await;
        assert_eq!(ids(&queue), vec![keep]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_never_expires() {
        let queue = NotificationQueue::new();
        queue.add(
            "Persistent message",
            NotificationKind::Info,
            NotifyOptions::persistent().with_timeout(Duration::from_millis(1000)),
        );

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_or_missing_timeout_never_expires() {
        let queue = NotificationQueue::new();
        queue.error_with("no timeout", NotifyOptions::default().without_timeout());
        queue.error_with("zero", NotifyOptions::default().with_timeout(Duration::ZERO));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(queue.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_is_idempotent() {
        let queue = NotificationQueue::new();
        let first = queue.success("first");
        let second = queue.error("second");

        queue.remove(&first);
        queue.remove(&first);
        queue.remove("notification-does-not-exist");
        assert_eq!(ids(&queue), vec![second.clone()]);

        // The cancelled timer of `first` must not disturb anything later on.
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(queue.is_empty());
        queue.remove(&second);
        assert!(queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_all() {
        let queue = NotificationQueue::new();
        queue.success("Message 1");
        queue.error("Message 2");
        queue.warning("Message 3");
        assert_eq!(queue.len(), 3);

        queue.clear_all();
        assert!(queue.is_empty());

        let late = queue.info("after clear");
        tokio::time::sleep(Duration::from_millis(3999)).await;
        assert_eq!(ids(&queue), vec![late]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_convenience_methods_keep_order_and_kind() {
        let queue = NotificationQueue::new();
        queue.success("Success message");
        queue.error("Error message");
        queue.warning("Warning message");
        queue.info("Info message");

        let kinds: Vec<_> = queue.snapshot().into_iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NotificationKind::Success,
                NotificationKind::Error,
                NotificationKind::Warning,
                NotificationKind::Info,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_options_in_convenience_methods() {
        let queue = NotificationQueue::new();
        queue.error_with(
            "Critical error",
            NotifyOptions::persistent().with_timeout(Duration::from_millis(10_000)),
        );

        let entry = &queue.snapshot()[0];
        assert_eq!(entry.message, "Critical error");
        assert_eq!(entry.kind, NotificationKind::Error);
        assert!(entry.persistent);
        assert_eq!(entry.timeout, Some(Duration::from_millis(10_000)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ids_are_unique_across_queues() {
        let a = NotificationQueue::new();
        let b = NotificationQueue::new();
        let mut seen = HashSet::new();
        for i in 0..50 {
            assert!(seen.insert(a.info(format!("a{i}"))));
            assert!(seen.insert(b.info(format!("b{i}"))));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_changes() {
        let queue = NotificationQueue::new();
        let mut rx = queue.subscribe();

        let id = queue.warning_with("watch me", NotifyOptions::default().with_timeout(Duration::from_millis(100)));
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(rx.borrow_and_update()[0].id, id);

        rx.changed().await.expect("sender alive");
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn test_without_runtime_entry_stays() {
        let queue = NotificationQueue::new();
        queue.success("no runtime here");
        assert_eq!(queue.len(), 1);
    }
}
