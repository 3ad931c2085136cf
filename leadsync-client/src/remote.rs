use async_trait::async_trait;

use leadsync_core::errors::RemoteError;
use leadsync_core::models::{Lead, LeadFields, NotePayload};

/// The contract the spreadsheet-backed persistence layer must satisfy.
///
/// The store has weak consistency: lookups are row scans keyed by the lead
/// identifier, writes are best effort, and `LastUpdated` is stamped by the
/// store itself on every successful mutation.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Every lead in the store. Records may come back without an identifier;
    /// the caller assigns one and writes it back with `persist_identifier`.
    async fn fetch_all(&self) -> Result<Vec<Lead>, RemoteError>;

    /// Patch a subset of fields on one lead.
    async fn patch_fields(&self, id: &str, fields: &LeadFields) -> Result<(), RemoteError>;

    /// Append a raw note to one lead. The store formats the entry (timestamp
    /// prefix, rep name) with its own clock and prepends it blank-line
    /// separated, mirroring the client-side optimistic rendering.
    async fn append_note(&self, id: &str, note: &NotePayload) -> Result<(), RemoteError>;

    /// Write a generated identifier into the backing row at `position`, the
    /// 0-based position in the most recent `fetch_all` ordering. Used only
    /// for rows fetched without an identifier.
    async fn persist_identifier(&self, position: usize, id: &str) -> Result<(), RemoteError>;
}

fn transport(e: reqwest::Error) -> RemoteError {
    RemoteError::Transport(e.to_string())
}

/// [`RemoteStore`] over the lead API's REST surface.
pub struct HttpRemote {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn check(id: Option<&str>, response: &reqwest::Response) -> Result<(), RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(id.unwrap_or_default().to_string()));
        }
        Err(RemoteError::Status(status.as_u16()))
    }
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn fetch_all(&self) -> Result<Vec<Lead>, RemoteError> {
        let response = self
            .http
            .get(self.url("/api/leads"))
            .send()
            .await
            .map_err(transport)?;
        Self::check(None, &response)?;
        response.json().await.map_err(transport)
    }

    async fn patch_fields(&self, id: &str, fields: &LeadFields) -> Result<(), RemoteError> {
        let response = self
            .http
            .patch(self.url(&format!("/api/leads/{id}")))
            .json(&serde_json::json!({ "fields": fields }))
            .send()
            .await
            .map_err(transport)?;
        Self::check(Some(id), &response)
    }

    async fn append_note(&self, id: &str, note: &NotePayload) -> Result<(), RemoteError> {
        let response = self
            .http
            .post(self.url(&format!("/api/leads/{id}/notes")))
            .json(note)
            .send()
            .await
            .map_err(transport)?;
        Self::check(Some(id), &response)
    }

    async fn persist_identifier(&self, position: usize, id: &str) -> Result<(), RemoteError> {
        let response = self
            .http
            .patch(self.url(&format!("/api/leads/positions/{position}/id")))
            .json(&serde_json::json!({ "leadId": id }))
            .send()
            .await
            .map_err(transport)?;
        Self::check(Some(id), &response)
    }
}
