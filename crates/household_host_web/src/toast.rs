//! Toast adapter for browser contexts.

use household_host::{Toast, ToastIcon, ToastService};

#[derive(Debug, Clone, Copy, Default)]
/// Toast adapter backed by the Web Notifications API.
pub struct WebToastService;

impl WebToastService {
    fn render(toast: &Toast) -> String {
        match toast.icon {
            ToastIcon::Success => format!("✓ {}", toast.title),
            ToastIcon::None => toast.title.clone(),
        }
    }
}

impl ToastService for WebToastService {
    fn show(&self, toast: Toast) {
        let rendered = Self::render(&toast);

        #[cfg(target_arch = "wasm32")]
        {
            if let Err(err) = web_sys::Notification::new(&rendered) {
                web_sys::console::warn_1(&err);
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = rendered;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_toasts_carry_a_tick() {
        assert_eq!(
            WebToastService::render(&Toast::success("已切换到 小明", 1_000)),
            "✓ 已切换到 小明"
        );
        assert_eq!(WebToastService::render(&Toast::plain("切换失败")), "切换失败");
    }
}
