//! Toast feedback contracts and adapters.

use std::{cell::RefCell, rc::Rc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Visual style of a toast.
pub enum ToastIcon {
    /// Success tick.
    Success,
    /// Plain text, used for failures.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Short-lived user-visible message.
pub struct Toast {
    /// Message text.
    pub title: String,
    /// Icon style.
    pub icon: ToastIcon,
    /// Display duration in milliseconds.
    pub duration_ms: u32,
}

impl Toast {
    /// Default display duration used by the host toast API.
    pub const DEFAULT_DURATION_MS: u32 = 1_500;

    /// Success toast with the given duration.
    pub fn success(title: impl Into<String>, duration_ms: u32) -> Self {
        Self {
            title: title.into(),
            icon: ToastIcon::Success,
            duration_ms,
        }
    }

    /// Icon-less toast used for failures.
    pub fn plain(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            icon: ToastIcon::None,
            duration_ms: Self::DEFAULT_DURATION_MS,
        }
    }
}

/// Host service for user-visible toasts. Fire-and-forget.
pub trait ToastService {
    /// Shows `toast`.
    fn show(&self, toast: Toast);
}

#[derive(Debug, Clone, Copy, Default)]
/// Toast service that drops every toast.
pub struct NoopToastService;

impl ToastService for NoopToastService {
    fn show(&self, _toast: Toast) {}
}

#[derive(Debug, Clone, Default)]
/// Toast service that records toasts in memory.
pub struct MemoryToastService {
    shown: Rc<RefCell<Vec<Toast>>>,
}

impl MemoryToastService {
    /// Returns every toast shown so far, oldest first.
    pub fn shown(&self) -> Vec<Toast> {
        self.shown.borrow().clone()
    }

    /// Returns the most recent toast.
    pub fn last(&self) -> Option<Toast> {
        self.shown.borrow().last().cloned()
    }
}

impl ToastService for MemoryToastService {
    fn show(&self, toast: Toast) {
        self.shown.borrow_mut().push(toast);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_toast_service_records_in_order() {
        let toasts = MemoryToastService::default();
        let service: &dyn ToastService = &toasts;
        service.show(Toast::success("ok", 1_000));
        service.show(Toast::plain("failed"));

        let shown = toasts.shown();
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0].icon, ToastIcon::Success);
        assert_eq!(shown[0].duration_ms, 1_000);
        assert_eq!(toasts.last(), Some(Toast::plain("failed")));
    }
}
