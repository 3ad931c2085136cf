#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use leadsync_client::{Client, ClientEvent, LocalStore, RemoteStore};
use leadsync_core::errors::RemoteError;
use leadsync_core::models::{Connectivity, Lead, LeadFields, NotePayload};
use leadsync_core::notes::{format_note_entry, prepend_note};
use uuid::Uuid;

/// One observed remote call, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    FetchAll,
    PatchFields { id: String, fields: LeadFields },
    AppendNote { id: String, note: NotePayload },
    PersistIdentifier { position: usize, id: String },
}

#[derive(Default)]
pub struct MockState {
    pub leads: Vec<Lead>,
    pub calls: Vec<RemoteCall>,
    pub fail_fetch: bool,
    pub fail_patch: bool,
    pub fail_note: bool,
}

/// An in-memory stand-in for the spreadsheet-backed store. Applies writes to
/// its own lead list (stamping `LastUpdated` the way the real store does),
/// records every call, and injects failures on demand.
pub struct MockRemote {
    pub state: Mutex<MockState>,
}

impl MockRemote {
    pub fn new(leads: Vec<Lead>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MockState {
                leads,
                ..MockState::default()
            }),
        })
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn lead(&self, id: &str) -> Option<Lead> {
        self.state
            .lock()
            .unwrap()
            .leads
            .iter()
            .find(|lead| lead.id == id)
            .cloned()
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.state.lock().unwrap().fail_fetch = fail;
    }

    pub fn set_fail_patch(&self, fail: bool) {
        self.state.lock().unwrap().fail_patch = fail;
    }

    pub fn set_fail_note(&self, fail: bool) {
        self.state.lock().unwrap().fail_note = fail;
    }

    fn store_timestamp() -> String {
        Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn fetch_all(&self) -> Result<Vec<Lead>, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RemoteCall::FetchAll);
        if state.fail_fetch {
            return Err(RemoteError::Transport("connection refused".to_string()));
        }
        Ok(state.leads.clone())
    }

    async fn patch_fields(&self, id: &str, fields: &LeadFields) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RemoteCall::PatchFields {
            id: id.to_string(),
            fields: fields.clone(),
        });
        if state.fail_patch {
            return Err(RemoteError::Status(500));
        }

        let Some(lead) = state.leads.iter_mut().find(|lead| lead.id == id) else {
            return Err(RemoteError::NotFound(id.to_string()));
        };
        fields.apply_to(lead);
        lead.last_updated = Self::store_timestamp();
        Ok(())
    }

    async fn append_note(&self, id: &str, note: &NotePayload) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RemoteCall::AppendNote {
            id: id.to_string(),
            note: note.clone(),
        });
        if state.fail_note {
            return Err(RemoteError::Status(500));
        }

        let Some(lead) = state.leads.iter_mut().find(|lead| lead.id == id) else {
            return Err(RemoteError::NotFound(id.to_string()));
        };
        let entry = format_note_entry(&note.note_text, &note.rep_name, Utc::now());
        lead.notes = prepend_note(&lead.notes, &entry);
        lead.last_updated = Self::store_timestamp();
        Ok(())
    }

    async fn persist_identifier(&self, position: usize, id: &str) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RemoteCall::PersistIdentifier {
            position,
            id: id.to_string(),
        });
        if let Some(lead) = state.leads.get_mut(position) {
            lead.id = id.to_string();
        }
        Ok(())
    }
}

/// A lead the way the remote store would return it.
#[allow(dead_code)]
pub fn make_lead(id: &str, name: &str) -> Lead {
    serde_json::from_value(serde_json::json!({
        "LeadID": id,
        "Date": "2024-06-01",
        "LeadName": name,
        "ContactNumber": "0400 000 000",
        "LeadStatus": "New",
    }))
    .unwrap()
}

/// A unique shared-cache in-memory database URL, so every pool connection in
/// one test sees the same data.
#[allow(dead_code)]
pub fn memory_db_url() -> String {
    format!("file:{}?mode=memory&cache=shared", Uuid::new_v4())
}

/// A client over an in-memory database and the given mock remote.
#[allow(dead_code)]
pub async fn setup_client(
    remote: Arc<MockRemote>,
    connectivity: Connectivity,
) -> (Client, String) {
    let db_url = memory_db_url();
    let client = Client::new(&db_url, remote, connectivity).await.unwrap();
    (client, db_url)
}

/// Open a second store over the same database, for inspecting durable state
/// behind the client's back.
#[allow(dead_code)]
pub async fn open_store(db_url: &str) -> LocalStore {
    LocalStore::new(db_url).await.unwrap()
}

/// Forward every client event into a channel the test can await on.
#[allow(dead_code)]
pub fn capture_events(client: &Client) -> tokio::sync::mpsc::UnboundedReceiver<ClientEvent> {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    client
        .events()
        .register(move |event| {
            let _ = tx.send(event.clone());
        })
        .unwrap();
    rx
}

/// Give background tasks a moment to observe a connectivity transition.
/// Watch channels coalesce rapid back-to-back writes, so tests that toggle
/// offline-then-online must let the listener see the intermediate value.
#[allow(dead_code)]
pub async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
}

/// Wait (bounded) for the next event matching `matches`, discarding others.
#[allow(dead_code)]
pub async fn wait_for_event<F>(
    rx: &mut tokio::sync::mpsc::UnboundedReceiver<ClientEvent>,
    matches: F,
) -> ClientEvent
where
    F: Fn(&ClientEvent) -> bool,
{
    loop {
        let event = tokio::time::timeout(std::time::Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed");
        if matches(&event) {
            return event;
        }
    }
}
