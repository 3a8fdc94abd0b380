use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub expires_at: Instant,
}

/// Single-slot holder for the latest notification.
///
/// A newer notification replaces the current one together with its expiry;
/// reading after expiry clears the slot.
#[derive(Debug, Clone)]
pub struct Notifier {
    ttl: Duration,
    next_id: u64,
    current: Option<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_id: 1,
            current: None,
        }
    }

    pub fn notify(&mut self, severity: Severity, message: impl Into<String>, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let message = message.into();
        debug!(id, %severity, message = %message, "notification raised");
        if let Some(previous) = self.current.as_ref() {
            debug!(id = previous.id, "notification superseded");
        }
        self.current = Some(Notification {
            id,
            message,
            severity,
            expires_at: now + self.ttl,
        });
        id
    }

    /// The visible notification at `now`, clearing it once expired.
    pub fn active(&mut self, now: Instant) -> Option<&Notification> {
        if self.current.as_ref().is_some_and(|n| now >= n.expires_at) {
            if let Some(expired) = self.current.take() {
                debug!(id = expired.id, "notification expired");
            }
        }
        self.current.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}
