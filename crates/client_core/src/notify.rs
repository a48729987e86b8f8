use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::config::DEFAULT_NOTIFICATION_TTL_SECS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Danger,
}

impl NotificationLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "success",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
    expires_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Dismissible, self-expiring notices. Newest first.
#[derive(Debug)]
pub struct NotificationCenter {
    ttl: Duration,
    next_id: u64,
    items: Vec<Notification>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_NOTIFICATION_TTL_SECS))
    }
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_id: 1,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, level: NotificationLevel, message: impl Into<String>) -> u64 {
        self.push_at(level, message, Instant::now())
    }

    pub fn push_at(
        &mut self,
        level: NotificationLevel,
        message: impl Into<String>,
        now: Instant,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.insert(
            0,
            Notification {
                id,
                level,
                message: message.into(),
                created_at: Utc::now(),
                expires_at: now + self.ttl,
            },
        );
        id
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Info, message)
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Success, message)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Warning, message)
    }

    pub fn danger(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Danger, message)
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Drops everything that has outlived the TTL; returns how many were dropped.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !item.is_expired(now));
        before - self.items.len()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_notification_comes_first() {
        let mut center = NotificationCenter::default();
        center.info("first");
        center.danger("second");

        let latest = center.latest().expect("latest");
        assert_eq!(latest.message, "second");
        assert_eq!(latest.level, NotificationLevel::Danger);
        assert_eq!(center.len(), 2);
    }

    #[test]
    fn notifications_expire_after_ttl() {
        let mut center = NotificationCenter::new(Duration::from_secs(5));
        let start = Instant::now();
        center.push_at(NotificationLevel::Warning, "old", start);
        center.push_at(NotificationLevel::Info, "new", start + Duration::from_secs(3));

        assert_eq!(center.prune(start + Duration::from_secs(4)), 0);
        assert_eq!(center.prune(start + Duration::from_secs(5)), 1);
        assert_eq!(center.latest().map(|n| n.message.as_str()), Some("new"));
    }

    #[test]
    fn dismiss_removes_only_that_notification() {
        let mut center = NotificationCenter::default();
        let keep = center.info("keep");
        let drop = center.warning("drop");

        assert!(center.dismiss(drop));
        assert!(!center.dismiss(drop));
        assert_eq!(center.iter().map(|n| n.id).collect::<Vec<_>>(), vec![keep]);
    }
}
