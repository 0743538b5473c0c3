//! Transient notifications ("toasts") shown on a rendered page.

use serde::Serialize;
use std::time::Duration;

/// How long the success toast stays on screen.
pub const SUCCESS_DURATION: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Pending,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    /// `None` keeps the toast until dismissed.
    pub duration_ms: Option<u64>,
}

/// Ordered toast list for one page view.
#[derive(Debug, Default)]
pub struct Toasts {
    next_id: u64,
    items: Vec<Toast>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(
        &mut self,
        kind: ToastKind,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.items.push(Toast {
            id,
            kind,
            message: message.into(),
            duration_ms: duration.map(|d| d.as_millis() as u64),
        });
        id
    }

    /// Returns whether a toast was removed.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t.id != id);
        self.items.len() != before
    }

    pub fn active(&self) -> &[Toast] {
        &self.items
    }

    pub fn has(&self, kind: ToastKind) -> bool {
        self.items.iter().any(|t| t.kind == kind)
    }
}
