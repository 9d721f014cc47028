//! Toast display.

use std::fmt;

use shopfront_core::{ToastId, ToastMessage, ToastSeverity};

use crate::stores::ToastStore;

/// One rendered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastView {
    pub id: ToastId,
    pub icon: &'static str,
    pub severity: ToastSeverity,
    pub message: String,
}

impl From<&ToastMessage> for ToastView {
    fn from(toast: &ToastMessage) -> Self {
        Self {
            id: toast.id,
            icon: toast.severity.icon(),
            severity: toast.severity,
            message: toast.message.clone(),
        }
    }
}

impl fmt::Display for ToastView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon, self.message)
    }
}

/// Stack of notifications bound to a [`ToastStore`].
#[derive(Clone)]
pub struct ToastContainer {
    store: ToastStore,
}

impl ToastContainer {
    #[must_use]
    pub const fn new(store: ToastStore) -> Self {
        Self { store }
    }

    /// Views in enqueue order; empty when nothing is queued.
    #[must_use]
    pub fn views(&self) -> Vec<ToastView> {
        self.store.toasts().iter().map(ToastView::from).collect()
    }

    /// Close a notification.
    pub fn dismiss(&self, id: ToastId) {
        self.store.remove_toast(id);
    }
}
