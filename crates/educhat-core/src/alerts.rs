use std::time::{Duration, Instant};

use tracing::debug;

/// Alerts remove themselves after this long unless dismissed first.
pub const ALERT_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Danger,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Alert {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub created_at: Instant,
}

impl Alert {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= ALERT_TIMEOUT
    }
}

/// The alerts container: every notice shown to the user lives here.
#[derive(Debug, Default)]
pub struct AlertCenter {
    alerts: Vec<Alert>,
    next_id: u64,
}

impl AlertCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: impl Into<String>, severity: Severity) -> u64 {
        self.show_at(message, severity, Instant::now())
    }

    pub fn show_at(&mut self, message: impl Into<String>, severity: Severity, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let message = message.into();
        debug!(id, severity = severity.as_str(), %message, "alert shown");
        self.alerts.push(Alert {
            id,
            message,
            severity,
            created_at: now,
        });
        id
    }

    /// Manual dismissal. Returns false when the alert is already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        self.alerts.len() != before
    }

    pub fn dismiss_latest(&mut self) -> bool {
        self.alerts.pop().is_some()
    }

    /// Drops alerts whose timeout has elapsed. Returns how many were removed.
    pub fn prune_expired(&mut self, now: Instant) -> usize {
        let before = self.alerts.len();
        self.alerts.retain(|a| !a.is_expired(now));
        before - self.alerts.len()
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_expires_after_timeout() {
        let start = Instant::now();
        let mut center = AlertCenter::new();
        center.show_at("Document uploaded successfully!", Severity::Success, start);

        assert_eq!(center.prune_expired(start + Duration::from_millis(4999)), 0);
        assert_eq!(center.alerts().len(), 1);
        assert_eq!(center.prune_expired(start + ALERT_TIMEOUT), 1);
        assert!(center.is_empty());
    }

    #[test]
    fn test_manual_dismiss_before_timeout() {
        let start = Instant::now();
        let mut center = AlertCenter::new();
        let first = center.show_at("one", Severity::Info, start);
        let second = center.show_at("two", Severity::Danger, start);

        assert!(center.dismiss(first));
        assert!(!center.dismiss(first));
        assert_eq!(center.alerts()[0].id, second);

        // The timer firing later finds nothing to remove
        center.dismiss(second);
        assert_eq!(center.prune_expired(start + ALERT_TIMEOUT), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut center = AlertCenter::new();
        let a = center.show("a", Severity::Warning);
        let b = center.show("b", Severity::Warning);
        assert_ne!(a, b);
        assert!(center.dismiss_latest());
        assert_eq!(center.alerts()[0].message, "a");
    }
}
