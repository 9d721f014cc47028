//! Toast notification queue.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard, Weak};
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use shopfront_core::{ToastId, ToastMessage, ToastSeverity};
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Shared queue of transient notifications.
///
/// Toasts with a non-zero duration remove themselves once it elapses; the
/// timer is a detached `tokio` task.
#[derive(Clone)]
pub struct ToastStore {
    inner: Arc<ToastStoreInner>,
}

struct ToastStoreInner {
    queue: RwLock<ToastQueue>,
    default_duration: Duration,
}

#[derive(Default)]
struct ToastQueue {
    toasts: Vec<ToastMessage>,
    last_id: u64,
}

impl ToastStore {
    /// Create an empty queue whose helpers default to `default_duration`.
    #[must_use]
    pub fn new(default_duration: Duration) -> Self {
        Self {
            inner: Arc::new(ToastStoreInner {
                queue: RwLock::new(ToastQueue::default()),
                default_duration,
            }),
        }
    }

    /// Duration used when a caller passes none.
    #[must_use]
    pub fn default_duration(&self) -> Duration {
        self.inner.default_duration
    }

    /// Enqueue a toast and schedule its removal.
    ///
    /// `None` uses the default duration; a zero duration keeps the toast until
    /// it is dismissed.
    pub fn add_toast(
        &self,
        message: impl Into<String>,
        severity: ToastSeverity,
        duration: Option<Duration>,
    ) -> ToastMessage {
        let duration = duration.unwrap_or(self.inner.default_duration);
        let toast = {
            let mut queue = self.queue();
            let toast = ToastMessage {
                id: queue.next_id(),
                message: message.into(),
                severity,
                duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
                created_at: Utc::now(),
            };
            queue.toasts.push(toast.clone());
            toast
        };
        debug!(id = %toast.id, severity = %toast.severity, "Toast added");

        if let Some(delay) = toast.expires_after() {
            self.schedule_removal(toast.id, delay);
        }
        toast
    }

    fn schedule_removal(&self, id: ToastId, delay: Duration) {
        let Ok(handle) = Handle::try_current() else {
            warn!(id = %id, "No async runtime, toast will not expire");
            return;
        };
        let store: Weak<ToastStoreInner> = Arc::downgrade(&self.inner);
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = store.upgrade() {
                Self { inner }.remove_toast(id);
            }
        });
    }

    /// Remove a toast. Unknown IDs are ignored.
    pub fn remove_toast(&self, id: ToastId) {
        self.queue().toasts.retain(|toast| toast.id != id);
    }

    /// Remove every toast.
    pub fn clear_toasts(&self) {
        self.queue().toasts.clear();
    }

    /// Queued toasts in enqueue order.
    #[must_use]
    pub fn toasts(&self) -> Vec<ToastMessage> {
        self.inner
            .queue
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .toasts
            .clone()
    }

    /// Enqueue a success toast.
    pub fn show_success(
        &self,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> ToastMessage {
        self.add_toast(message, ToastSeverity::Success, duration)
    }

    /// Enqueue an error toast.
    pub fn show_error(
        &self,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> ToastMessage {
        self.add_toast(message, ToastSeverity::Error, duration)
    }

    /// Enqueue a warning toast.
    pub fn show_warning(
        &self,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> ToastMessage {
        self.add_toast(message, ToastSeverity::Warning, duration)
    }

    /// Enqueue an info toast.
    pub fn show_info(
        &self,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> ToastMessage {
        self.add_toast(message, ToastSeverity::Info, duration)
    }

    fn queue(&self) -> RwLockWriteGuard<'_, ToastQueue> {
        self.inner
            .queue
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ToastQueue {
    /// Time-derived ID with a random suffix, bumped past the last one issued.
    fn next_id(&mut self) -> ToastId {
        let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let suffix = rand::rng().random_range(0..ToastId::SUFFIX_SPACE);
        let candidate = ToastId::from_parts(millis, suffix).as_u64();
        self.last_id = candidate.max(self.last_id.saturating_add(1));
        ToastId::new(self.last_id)
    }
}
