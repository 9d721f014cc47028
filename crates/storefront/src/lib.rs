//! Shopfront storefront library.
//!
//! Client side of a retail storefront: a REST client for the catalog and cart
//! services, the shared cart and toast stores, and the view models that front
//! ends render.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod filters;
pub mod pages;
pub mod state;
pub mod storage;
pub mod stores;

pub use api::{ApiError, RetailClient};
pub use config::StorefrontConfig;
pub use error::AppError;
pub use state::AppState;
