//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;
pub mod toast;

pub use cart::{CartCacheError, CartLineItem, CartState};
pub use id::*;
pub use price::{Price, format_cents};
pub use product::{
    CARD_RESOLUTION, CategoryIndex, Descriptor, ImageSet, Product, ProductDetails, ProductList,
    SearchParams, THUMBNAIL_RESOLUTION,
};
pub use toast::{ToastId, ToastMessage, ToastSeverity};
