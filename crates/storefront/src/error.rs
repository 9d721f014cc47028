//! Unified error handling with Sentry integration.
//!
//! `AppError` gathers the errors of every layer so front ends can handle them
//! in one place. [`AppError::report`] captures failures to Sentry before they
//! are shown to the shopper.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::pages::PageError;
use crate::storage::StorageError;
use crate::stores::CartError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Retail API request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Local storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Cart mutation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Page could not be loaded.
    #[error("{0}")]
    Page(#[from] PageError),
}

impl AppError {
    /// Whether the error means a missing resource rather than a failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Api(ApiError::NotFound { .. }) | Self::Page(PageError::NotFound(_))
        )
    }

    /// Capture the error to Sentry and log it.
    ///
    /// Missing resources are expected and are only logged.
    pub fn report(&self) {
        if self.is_not_found() {
            tracing::info!(error = %self, "Resource not found");
            return;
        }
        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Storefront error"
        );
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Associate subsequent Sentry events with the anonymous shopper.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("navigation", "Viewed product page", &[("product_id", "123")]);
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}
