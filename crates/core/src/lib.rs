//! Shopfront Core - Shared types library.
//!
//! This crate provides the domain types used across all Shopfront components:
//! - `storefront` - API client, stores, widgets and page view models
//! - `cli` - Command-line front end driving the storefront
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O, no
//! HTTP clients, no timers. Cart merging, totals and cache decoding live here so
//! that both the remote-sync path and the local fallback path apply exactly the
//! same rules.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, products, cart state and toast messages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
