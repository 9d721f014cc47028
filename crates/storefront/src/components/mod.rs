//! View models for the storefront's presentation components.
//!
//! Each component turns store or catalog data into display data and exposes
//! the actions its UI offers. Rendering is left to the front end.

pub mod card;
pub mod header;
pub mod product_detail;
pub mod searchable_dropdown;
pub mod toast;

pub use card::CardView;
pub use header::Header;
pub use product_detail::ProductDetailView;
pub use searchable_dropdown::{DropdownKey, DropdownState, SearchableDropdown};
pub use toast::{ToastContainer, ToastView};
