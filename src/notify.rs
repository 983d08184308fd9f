// SPDX-License-Identifier: GPL-3.0-only

//! User-facing notices
//!
//! Device access and render failures interrupt the user with a blocking
//! notice. How the notice is shown belongs to the host surface.

use std::sync::Mutex;
use tracing::error;

/// Sink for blocking notices
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Notifier that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        error!(notice = message, "User notice");
    }
}

/// Notifier that keeps every message, for front ends that show them later
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    messages: Mutex<Vec<String>>,
}

impl CollectingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, message: &str) {
        error!(notice = message, "User notice");
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}
