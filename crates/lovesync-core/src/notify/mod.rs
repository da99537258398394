//! Toast notifications.
//!
//! A `Toaster` shows one short message at a time on a `ToastSurface` and
//! hides it again after `TOAST_VISIBLE_SECS`. Hiding an idle toast is driven
//! by the host's event loop calling `Toaster::expire`; a toast that is still
//! up when the next one arrives is hidden by `show` itself once its window
//! has passed. Without a surface, calls are logged and ignored.

pub mod toast;

pub use toast::{Toast, ToastKind, ToastSurface, Toaster, TOAST_VISIBLE_SECS};
