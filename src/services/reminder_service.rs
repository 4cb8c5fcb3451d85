use chrono::{DateTime, Utc};
use tracing::{error, warn};
use uuid::Uuid;

use super::backend::AdminBackend;
use super::dates;
use super::local_store::LocalStore;
use crate::error::PortalError;
use crate::models::{FeedbackRecord, Reminder, ReminderKind};

pub const REMINDERS_KEY: &str = "adminReminders";
pub const NO_REMINDERS: &str = "No reminders. You're all caught up!";
const VISIBLE_LIMIT: usize = 5;

/// Admin reminders kept in the local store, newest first.
pub struct ReminderService<'a> {
    store: &'a LocalStore,
}

impl<'a> ReminderService<'a> {
    pub fn new(store: &'a LocalStore) -> Self {
        Self { store }
    }

    /// Stored custom reminders. A corrupt list reads as empty.
    pub fn custom(&self) -> Vec<Reminder> {
        match self.store.get::<Vec<Reminder>>(REMINDERS_KEY) {
            Ok(reminders) => reminders.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Error loading custom reminders");
                Vec::new()
            }
        }
    }

    pub fn add(&self, title: &str) -> Result<Reminder, PortalError> {
        self.add_at(title, Utc::now())
    }

    pub fn add_at(&self, title: &str, created_at: DateTime<Utc>) -> Result<Reminder, PortalError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(PortalError::InvalidInput("Please enter a reminder title".to_string()));
        }

        let reminder = Reminder {
            id: format!("custom-{}", Uuid::new_v4()),
            title: title.to_string(),
            created_at,
            kind: ReminderKind::Custom,
        };

        let mut reminders = self.custom();
        reminders.insert(0, reminder.clone());
        self.store.set(REMINDERS_KEY, &reminders)?;
        Ok(reminder)
    }

    /// Mark a custom reminder done. Returns whether one was removed.
    pub fn complete(&self, id: &str) -> Result<bool, PortalError> {
        let mut reminders = self.custom();
        let before = reminders.len();
        reminders.retain(|r| r.id != id);
        if reminders.len() == before {
            return Ok(false);
        }
        self.store.set(REMINDERS_KEY, &reminders)?;
        Ok(true)
    }

    /// Custom reminders followed by pending feedback. When pending feedback
    /// cannot be fetched only the custom ones are listed.
    pub async fn list(&self, backend: &dyn AdminBackend) -> Vec<Reminder> {
        let custom = self.custom();
        let pending = match backend.pending_feedback().await {
            Ok(pending) => pending,
            Err(e) => {
                error!(error = %e, "Error loading reminders");
                Vec::new()
            }
        };
        merge_reminders(custom, &pending)
    }
}

pub fn merge_reminders(custom: Vec<Reminder>, pending: &[FeedbackRecord]) -> Vec<Reminder> {
    let limit = VISIBLE_LIMIT.saturating_sub(custom.len()).max(1);
    let mut merged = custom;
    merged.extend(pending.iter().take(limit).map(|feedback| Reminder {
        id: format!("feedback-{}", feedback.id),
        title: feedback
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Pending Review".to_string()),
        created_at: feedback
            .created_at
            .as_deref()
            .and_then(dates::parse_timestamp)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now),
        kind: ReminderKind::Feedback,
    }));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::FakePortal;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn pending(count: i64) -> Vec<FeedbackRecord> {
        (1..=count)
            .map(|id| FeedbackRecord {
                id,
                title: if id == 1 { None } else { Some(format!("Feedback {}", id)) },
                created_at: Some("2025-05-03 14:00:00".to_string()),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn add_puts_newest_first_and_complete_removes() {
        let dir = tempdir().unwrap();
        let store = LocalStore::at(dir.path()).unwrap();
        let reminders = ReminderService::new(&store);

        let first = reminders.add("Update FAQ categories").unwrap();
        let second = reminders.add("  Review pending feedback ").unwrap();
        assert!(first.id.starts_with("custom-"));
        assert_eq!(second.title, "Review pending feedback");

        let stored = reminders.custom();
        assert_eq!(stored[0].id, second.id);
        assert_eq!(stored[1].id, first.id);

        assert!(reminders.complete(&first.id).unwrap());
        assert!(!reminders.complete(&first.id).unwrap());
        assert_eq!(reminders.custom().len(), 1);
    }

    #[test]
    fn blank_titles_are_rejected() {
        let dir = tempdir().unwrap();
        let store = LocalStore::at(dir.path()).unwrap();
        assert!(ReminderService::new(&store).add("   ").is_err());
    }

    #[test]
    fn stored_shape_matches_portal() {
        let dir = tempdir().unwrap();
        let store = LocalStore::at(dir.path()).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 1, 7, 15, 4, 0).unwrap();
        ReminderService::new(&store).add_at("Call IT", at).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&store.get_raw(REMINDERS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw[0]["type"], "custom");
        assert_eq!(raw[0]["title"], "Call IT");
        assert!(raw[0]["createdAt"].is_string());
    }

    #[test]
    fn pending_fills_remaining_slots() {
        let merged = merge_reminders(Vec::new(), &pending(8));
        assert_eq!(merged.len(), 5);
        assert_eq!(merged[0].id, "feedback-1");
        assert_eq!(merged[0].title, "Pending Review");
        assert_eq!(merged[1].title, "Feedback 2");
        assert_eq!(merged[0].kind, ReminderKind::Feedback);
    }

    #[test]
    fn at_least_one_pending_item_is_shown() {
        let at = Utc::now();
        let custom: Vec<Reminder> = (0..6)
            .map(|i| Reminder {
                id: format!("custom-{}", i),
                title: "x".to_string(),
                created_at: at,
                kind: ReminderKind::Custom,
            })
            .collect();
        let merged = merge_reminders(custom, &pending(3));
        assert_eq!(merged.len(), 7);
        assert_eq!(merged[6].id, "feedback-1");
    }

    #[tokio::test]
    async fn failed_pending_fetch_keeps_custom() {
        let dir = tempdir().unwrap();
        let store = LocalStore::at(dir.path()).unwrap();
        let reminders = ReminderService::new(&store);
        reminders.add("Only mine").unwrap();

        let backend = FakePortal { offline: true, ..FakePortal::signed_in("1") };
        let listed = reminders.list(&backend).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Only mine");

        let backend = FakePortal { pending: Some(pending(2)), ..FakePortal::signed_in("1") };
        assert_eq!(reminders.list(&backend).await.len(), 3);
    }
}
