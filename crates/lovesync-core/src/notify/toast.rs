use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error};

/// How long a toast stays visible before it hides itself.
pub const TOAST_VISIBLE_SECS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub title: String,
    pub message: String,
    pub kind: ToastKind,
    pub shown_at: DateTime<Utc>,
}

impl Toast {
    pub fn new(title: impl Into<String>, message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
            shown_at: Utc::now(),
        }
    }

    pub fn hide_at(&self) -> DateTime<Utc> {
        self.shown_at + Duration::seconds(TOAST_VISIBLE_SECS)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.hide_at()
    }
}

/// Where toasts are rendered.
pub trait ToastSurface {
    fn show(&mut self, toast: &Toast);
    fn hide(&mut self);
}

#[derive(Default)]
pub struct Toaster {
    surface: Option<Box<dyn ToastSurface>>,
    current: Option<Toast>,
}

impl Toaster {
    pub fn new(surface: Box<dyn ToastSurface>) -> Self {
        Self {
            surface: Some(surface),
            current: None,
        }
    }

    /// A toaster with nothing to render on; every call is a logged no-op.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, surface: Box<dyn ToastSurface>) {
        self.surface = Some(surface);
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    pub fn success(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.show(Toast::new(title, message, ToastKind::Success));
    }

    pub fn error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.show(Toast::new(title, message, ToastKind::Error));
    }

    /// Show `toast`, replacing any toast already visible.
    ///
    /// A previous toast whose visible window had already elapsed is hidden
    /// first, so surfaces see its `hide` even if nothing called `expire`.
    pub fn show(&mut self, toast: Toast) {
        if self.surface.is_none() {
            error!(title = %toast.title, "No toast surface attached, dropping notification");
            return;
        }
        self.expire(toast.shown_at);

        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        debug!(title = %toast.title, kind = ?toast.kind, "Showing toast");
        surface.show(&toast);
        self.current = Some(toast);
    }

    pub fn hide(&mut self) {
        if self.current.take().is_none() {
            return;
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.hide();
        }
    }

    /// Hide the current toast once its visible window has elapsed.
    /// Returns true if a toast was hidden.
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        let expired = self.current.as_ref().is_some_and(|t| t.is_expired(now));
        if expired {
            self.hide();
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct Recorder {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ToastSurface for Recorder {
        fn show(&mut self, toast: &Toast) {
            self.events
                .lock()
                .unwrap()
                .push(format!("show {:?} {}: {}", toast.kind, toast.title, toast.message));
        }

        fn hide(&mut self) {
            self.events.lock().unwrap().push("hide".to_string());
        }
    }

    #[test]
    fn test_show_and_hide() {
        let recorder = Recorder::default();
        let mut toaster = Toaster::new(Box::new(recorder.clone()));

        toaster.success("Logged in", "Welcome back");
        assert_eq!(toaster.current().map(|t| t.kind), Some(ToastKind::Success));

        toaster.hide();
        toaster.hide(); // Nothing visible, no second hide

        assert!(toaster.current().is_none());
        assert_eq!(
            recorder.events(),
            vec!["show Success Logged in: Welcome back".to_string(), "hide".to_string()]
        );
    }

    #[test]
    fn test_new_toast_replaces_current() {
        let recorder = Recorder::default();
        let mut toaster = Toaster::new(Box::new(recorder.clone()));

        toaster.success("One", "first");
        toaster.error("Two", "second");

        assert_eq!(toaster.current().map(|t| t.title.as_str()), Some("Two"));
        assert_eq!(recorder.events().len(), 2);
    }

    #[test]
    fn test_expire_after_visible_window() {
        let recorder = Recorder::default();
        let mut toaster = Toaster::new(Box::new(recorder.clone()));
        toaster.error("Login failed", "Invalid username or password");

        let shown_at = toaster.current().unwrap().shown_at;
        assert!(!toaster.expire(shown_at + Duration::seconds(TOAST_VISIBLE_SECS - 1)));
        assert!(toaster.current().is_some());

        assert!(toaster.expire(shown_at + Duration::seconds(TOAST_VISIBLE_SECS)));
        assert!(toaster.current().is_none());
        assert_eq!(recorder.events().last().map(String::as_str), Some("hide"));
    }

    #[test]
    fn test_stale_toast_hidden_before_next_show() {
        let recorder = Recorder::default();
        let mut toaster = Toaster::new(Box::new(recorder.clone()));

        let mut stale = Toast::new("Saved", "ok", ToastKind::Success);
        stale.shown_at = Utc::now() - Duration::seconds(TOAST_VISIBLE_SECS + 1);
        toaster.show(stale);
        toaster.error("Login failed", "Invalid username or password");

        assert_eq!(
            recorder.events(),
            vec![
                "show Success Saved: ok".to_string(),
                "hide".to_string(),
                "show Error Login failed: Invalid username or password".to_string(),
            ]
        );
    }

    #[test]
    fn test_fresh_toast_replaced_without_hide() {
        let recorder = Recorder::default();
        let mut toaster = Toaster::new(Box::new(recorder.clone()));

        toaster.success("One", "first");
        toaster.success("Two", "second");

        assert!(!recorder.events().contains(&"hide".to_string()));
    }

    #[test]
    fn test_detached_toaster_is_noop() {
        let mut toaster = Toaster::detached();
        toaster.success("Saved", "ok");
        assert!(toaster.current().is_none());
        toaster.hide();
        assert!(!toaster.expire(Utc::now()));
    }
}
