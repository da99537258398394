//! Toast surface that renders notifications on stderr.

use std::io::{self, Write};

use lovesync_core::notify::{Toast, ToastKind, ToastSurface};

pub struct TerminalToast;

impl TerminalToast {
    fn format(toast: &Toast) -> String {
        let icon = match toast.kind {
            ToastKind::Success => "✔",
            ToastKind::Error => "✘",
        };
        if toast.message.is_empty() {
            format!("{} {}", icon, toast.title)
        } else {
            format!("{} {}: {}", icon, toast.title, toast.message)
        }
    }
}

impl ToastSurface for TerminalToast {
    fn show(&mut self, toast: &Toast) {
        // A closed stderr only loses the notification
        let _ = writeln!(io::stderr(), "{}", Self::format(toast));
    }

    // Printed lines stay in the scrollback; there is nothing to take down.
    fn hide(&mut self) {}
}
