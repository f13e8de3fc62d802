//! User-facing outcome reporting.
//!
//! The core never renders anything itself; it reports toasts and a loading
//! flag to whatever host implements [`Notifier`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl fmt::Display for ToastLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToastLevel::Success => write!(f, "success"),
            ToastLevel::Error => write!(f, "error"),
            ToastLevel::Warning => write!(f, "warning"),
            ToastLevel::Info => write!(f, "info"),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn toast(&self, level: ToastLevel, message: &str);

    /// Raises the loading flag with a label for a long-running call.
    fn show_loading(&self, label: &str);

    fn hide_loading(&self);
}

/// Hides the loading indicator when dropped, so early returns cannot leave it up.
pub struct LoadingGuard {
    notifier: Arc<dyn Notifier>,
}

impl LoadingGuard {
    pub fn new(notifier: Arc<dyn Notifier>, label: &str) -> Self {
        notifier.show_loading(label);
        Self { notifier }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.notifier.hide_loading();
    }
}

/// Routes every notification to the `log` facade.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn toast(&self, level: ToastLevel, message: &str) {
        match level {
            ToastLevel::Error => log::error!("{}", message),
            ToastLevel::Warning => log::warn!("{}", message),
            ToastLevel::Success | ToastLevel::Info => log::info!("{}", message),
        }
    }

    fn show_loading(&self, label: &str) {
        log::info!("{}", label);
    }

    fn hide_loading(&self) {}
}
