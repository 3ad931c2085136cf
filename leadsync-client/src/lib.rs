pub mod cache;
pub mod client;
pub mod errors;
pub mod events;
pub mod offline_queue;
pub mod overlay;
pub mod queries;
pub mod remote;
pub mod session;
pub mod storage;
pub mod sync_engine;

pub use cache::RecordCache;
pub use client::Client;
pub use errors::{ClientError, ClientResult};
pub use events::{ClientEvent, EventDispatcher};
pub use offline_queue::OfflineQueue;
pub use overlay::ReminderOverlay;
pub use remote::{HttpRemote, RemoteStore};
pub use session::Session;
pub use storage::LocalStore;
pub use sync_engine::{SyncEngine, SyncState};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use leadsync_core::models::Lead;
    use leadsync_core::reminders::Reminder;
    use uuid::Uuid;

    async fn memory_store() -> Arc<LocalStore> {
        let url = format!("file:{}?mode=memory&cache=shared", Uuid::new_v4());
        let store = LocalStore::new(&url).await.unwrap();
        store.init_schema().await.unwrap();
        Arc::new(store)
    }

    fn lead(id: &str, name: &str) -> Lead {
        serde_json::from_value(serde_json::json!({
            "LeadID": id,
            "LeadName": name,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_blob_round_trip() {
        let store = memory_store().await;

        let missing: Option<Vec<Lead>> = store.read_blob(storage::LEADS_CACHE_KEY).await.unwrap();
        assert!(missing.is_none());

        let leads = vec![lead("L1", "Jo Bloggs"), lead("L2", "Sam Smith")];
        store
            .write_blob(storage::LEADS_CACHE_KEY, &leads)
            .await
            .unwrap();

        let loaded: Option<Vec<Lead>> = store.read_blob(storage::LEADS_CACHE_KEY).await.unwrap();
        assert_eq!(loaded.unwrap(), leads);
    }

    #[tokio::test]
    async fn test_corrupt_blob_reads_as_absent() {
        let store = memory_store().await;

        sqlx::query("INSERT INTO local_state (key, value) VALUES (?1, ?2)")
            .bind(storage::LEADS_CACHE_KEY)
            .bind("{not json")
            .execute(&store.pool)
            .await
            .unwrap();

        let loaded: Option<Vec<Lead>> = store.read_blob(storage::LEADS_CACHE_KEY).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_overlay_set_get_and_clear() {
        let store = memory_store().await;
        let overlay = ReminderOverlay::new(store);

        assert!(overlay.get().await.is_empty());

        let reminder = Reminder::from_input("2024-12-25T10:30", "follow up").unwrap();
        overlay.set("L1", Some(reminder.clone())).await;

        let map = overlay.get().await;
        assert_eq!(map.get("L1"), Some(&reminder));

        // Last write wins.
        let replacement = Reminder::from_input("2025-01-02T09:00", "").unwrap();
        overlay.set("L1", Some(replacement.clone())).await;
        assert_eq!(overlay.get().await.get("L1"), Some(&replacement));

        overlay.set("L1", None).await;
        assert!(overlay.get().await.is_empty());
    }

    #[tokio::test]
    async fn test_overlay_merge_sets_and_clears_reminder_fields() {
        let store = memory_store().await;
        let overlay = Arc::new(ReminderOverlay::new(store));

        let reminder = Reminder::from_input("2024-12-25T10:30", "follow up").unwrap();
        overlay.set("L1", Some(reminder.clone())).await;

        let mut leads = vec![lead("L1", "Jo Bloggs"), lead("L2", "Sam Smith")];
        // Stale overlay data on a lead with no stored reminder must clear.
        leads[1].reminder_note = Some("stale".to_string());

        overlay.merge_into(&mut leads).await;

        assert_eq!(leads[0].reminder_due_at, Some(reminder.due_at));
        assert_eq!(leads[0].reminder_note.as_deref(), Some("follow up"));
        assert!(leads[1].reminder_due_at.is_none());
        assert!(leads[1].reminder_note.is_none());
    }

    #[tokio::test]
    async fn test_cache_load_survives_missing_table() {
        // A database without the schema behaves as empty rather than failing.
        let url = format!("file:{}?mode=memory&cache=shared", Uuid::new_v4());
        let store = Arc::new(LocalStore::new(&url).await.unwrap());
        let overlay = Arc::new(ReminderOverlay::new(Arc::clone(&store)));
        let cache = RecordCache::new(store, overlay);

        assert!(cache.load().await.is_empty());
    }
}
