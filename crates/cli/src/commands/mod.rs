//! Subcommand implementations.
//!
//! Results are printed to stdout; logs go to stderr.

pub mod cart;
pub mod catalog;

use shopfront_storefront::components::ToastContainer;
use shopfront_storefront::stores::ToastStore;

/// Print and dismiss every queued toast.
#[allow(clippy::print_stdout)]
fn flush_toasts(toasts: &ToastStore) {
    let container = ToastContainer::new(toasts.clone());
    for view in container.views() {
        println!("{view}");
        container.dismiss(view.id);
    }
}
