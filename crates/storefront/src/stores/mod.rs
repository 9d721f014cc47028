//! Shared UI state.
//!
//! Each store is a cheaply cloneable handle around `Arc`-owned state, so every
//! view model holding a clone observes the same cart and toast queue.

mod cart;
mod toast;

pub use cart::{CartError, CartStore};
pub use toast::ToastStore;
