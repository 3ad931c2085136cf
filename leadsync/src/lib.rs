//! Leadsync - offline-first lead management
//!
//! This crate provides a unified API for the leadsync client.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use leadsync::{Client, Connectivity, HttpRemote};
//!
//! let remote = Arc::new(HttpRemote::new("https://leads.example.com"));
//! let client = Client::new("sqlite:leads.db?mode=rwc", remote, Connectivity::Online).await?;
//! let leads = client.start().await;
//! ```

// Re-export client types
pub use leadsync_client::{
    Client, ClientError, ClientEvent, ClientResult, EventDispatcher, HttpRemote, RemoteStore,
    SyncEngine, SyncState,
};

// Re-export core types that external applications may need
pub use leadsync_core::errors::RemoteError;
pub use leadsync_core::models::{Connectivity, Lead, LeadFields, NotePayload, OfflineAction};
pub use leadsync_core::reminders::{format_distance, upcoming, Reminder};
