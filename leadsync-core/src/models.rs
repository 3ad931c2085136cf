use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Statuses the pipeline moves a lead through. `LeadStatus` stays an open
/// string so rows edited outside the app survive a round-trip unchanged.
pub const KNOWN_STATUSES: [&str; 5] = [
    "New",
    "In Progress",
    "Callback",
    "Closed",
    "Not Interested",
];

/// Call outcomes offered by the detail form. Also an open string field.
pub const KNOWN_CALL_RESULTS: [&str; 4] = [
    "No Answer",
    "Left Voicemail",
    "Booked Appointment",
    "Follow-up Required",
];

pub const DEFAULT_STATUS: &str = "New";

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

/// A sales prospect record.
///
/// Field names on the wire match the remote store's column headers. The
/// identifier is immutable once assigned; rows fetched without one get a
/// generated identifier that is persisted back exactly once. `LastUpdated` is
/// stamped by the store on every successful mutation, never by the client.
/// Deserialization is lenient because the backing rows are weakly typed:
/// missing fields default, and the status defaults to "New".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(rename = "LeadID", default)]
    pub id: String,

    /// Creation date, "YYYY-MM-DD".
    #[serde(rename = "Date", default)]
    pub date: String,

    #[serde(rename = "LeadName", default)]
    pub name: String,

    #[serde(rename = "Address", default)]
    pub address: String,

    #[serde(rename = "ContactNumber", default)]
    pub contact_number: String,

    /// Communication log, newest entry first, entries separated by a blank
    /// line. See [`crate::notes`] for the entry format.
    #[serde(rename = "Notes", default)]
    pub notes: String,

    #[serde(rename = "Called", default)]
    pub called: bool,

    #[serde(rename = "RenterOwner", default)]
    pub renter_owner: RenterOwner,

    #[serde(rename = "Superannuation", default)]
    pub superannuation: String,

    #[serde(rename = "RepName", default)]
    pub rep_name: String,

    #[serde(rename = "LeadStatus", default = "default_status")]
    pub status: String,

    /// Last call time, "YYYY-MM-DD HH:MM:SS".
    #[serde(rename = "CallTimestamp", default)]
    pub call_timestamp: String,

    #[serde(rename = "CallResult", default)]
    pub call_result: String,

    /// Store-assigned, "YYYY-MM-DD HH:MM:SS".
    #[serde(rename = "LastUpdated", default)]
    pub last_updated: String,

    /// Reminder overlay, merged in locally; never sent to the remote store.
    #[serde(
        rename = "ReminderDateTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reminder_due_at: Option<DateTime<Utc>>,

    #[serde(
        rename = "ReminderNote",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reminder_note: Option<String>,
}

/// Whether the prospect rents or owns, or is not yet known. The remote store
/// keeps this as a plain cell that may be blank.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
pub enum RenterOwner {
    Renter,
    Owner,
    #[default]
    #[serde(rename = "")]
    #[strum(serialize = "")]
    Unspecified,
}

/// A partial field set for one lead: exactly the fields present are written.
///
/// The identifier and `LastUpdated` are deliberately absent; identity never
/// changes and the store stamps its own modification time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadFields {
    #[serde(rename = "Date", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(rename = "LeadName", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "Address", default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(
        rename = "ContactNumber",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_number: Option<String>,

    #[serde(rename = "Notes", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(rename = "Called", default, skip_serializing_if = "Option::is_none")]
    pub called: Option<bool>,

    #[serde(
        rename = "RenterOwner",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub renter_owner: Option<RenterOwner>,

    #[serde(
        rename = "Superannuation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub superannuation: Option<String>,

    #[serde(rename = "RepName", default, skip_serializing_if = "Option::is_none")]
    pub rep_name: Option<String>,

    #[serde(
        rename = "LeadStatus",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,

    #[serde(
        rename = "CallTimestamp",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub call_timestamp: Option<String>,

    #[serde(
        rename = "CallResult",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub call_result: Option<String>,
}

impl LeadFields {
    /// Overwrite exactly the fields present in this patch. No validation
    /// beyond presence.
    pub fn apply_to(&self, lead: &mut Lead) {
        if let Some(date) = &self.date {
            lead.date = date.clone();
        }
        if let Some(name) = &self.name {
            lead.name = name.clone();
        }
        if let Some(address) = &self.address {
            lead.address = address.clone();
        }
        if let Some(contact_number) = &self.contact_number {
            lead.contact_number = contact_number.clone();
        }
        if let Some(notes) = &self.notes {
            lead.notes = notes.clone();
        }
        if let Some(called) = self.called {
            lead.called = called;
        }
        if let Some(renter_owner) = self.renter_owner {
            lead.renter_owner = renter_owner;
        }
        if let Some(superannuation) = &self.superannuation {
            lead.superannuation = superannuation.clone();
        }
        if let Some(rep_name) = &self.rep_name {
            lead.rep_name = rep_name.clone();
        }
        if let Some(status) = &self.status {
            lead.status = status.clone();
        }
        if let Some(call_timestamp) = &self.call_timestamp {
            lead.call_timestamp = call_timestamp.clone();
        }
        if let Some(call_result) = &self.call_result {
            lead.call_result = call_result.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == LeadFields::default()
    }
}

/// Body of a note append as the remote API takes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotePayload {
    #[serde(rename = "noteText")]
    pub note_text: String,

    #[serde(rename = "repName")]
    pub rep_name: String,
}

/// A mutation recorded while the remote store is unreachable.
///
/// Actions form a strict FIFO log: appended on creation, consumed only by a
/// full-queue drain, never reordered or deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum OfflineAction {
    #[serde(rename = "UPDATE_LEAD")]
    UpdateLead { id: String, fields: LeadFields },

    /// Carries the raw note text; the remote store formats the entry with its
    /// own clock when the action is replayed.
    #[serde(rename = "ADD_NOTE")]
    AddNote {
        id: String,
        #[serde(rename = "noteText")]
        note_text: String,
        #[serde(rename = "repName")]
        rep_name: String,
    },
}

/// Process-wide network status, driven by an external signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Connectivity {
    Online,
    Offline,
}

impl Connectivity {
    pub fn is_online(self) -> bool {
        matches!(self, Connectivity::Online)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lead_deserializes_leniently() {
        let lead: Lead = serde_json::from_value(json!({ "LeadID": "L1" })).unwrap();

        assert_eq!(lead.id, "L1");
        assert_eq!(lead.status, "New");
        assert_eq!(lead.renter_owner, RenterOwner::Unspecified);
        assert!(!lead.called);
        assert!(lead.reminder_due_at.is_none());
    }

    #[test]
    fn test_lead_wire_names() {
        let lead: Lead = serde_json::from_value(json!({
            "LeadID": "L1",
            "LeadName": "Jo Bloggs",
            "ContactNumber": "0400 000 000",
            "RenterOwner": "Owner",
            "LeadStatus": "Callback",
            "LastUpdated": "2024-11-02 09:15:00"
        }))
        .unwrap();

        assert_eq!(lead.name, "Jo Bloggs");
        assert_eq!(lead.renter_owner, RenterOwner::Owner);

        let value = serde_json::to_value(&lead).unwrap();
        assert_eq!(value["LeadStatus"], "Callback");
        assert_eq!(value["LastUpdated"], "2024-11-02 09:15:00");
        // Reminder fields stay off the wire until the overlay sets them.
        assert!(value.get("ReminderDateTime").is_none());
    }

    #[test]
    fn test_fields_apply_overwrites_only_present_fields() {
        let mut lead: Lead = serde_json::from_value(json!({
            "LeadID": "L1",
            "LeadName": "Jo Bloggs",
            "LeadStatus": "New",
            "Called": false
        }))
        .unwrap();

        let fields = LeadFields {
            status: Some("Closed".to_string()),
            called: Some(true),
            ..LeadFields::default()
        };
        fields.apply_to(&mut lead);

        assert_eq!(lead.status, "Closed");
        assert!(lead.called);
        assert_eq!(lead.name, "Jo Bloggs");
    }

    #[test]
    fn test_fields_serialize_sparsely() {
        let fields = LeadFields {
            status: Some("Closed".to_string()),
            ..LeadFields::default()
        };

        assert_eq!(
            serde_json::to_value(&fields).unwrap(),
            json!({ "LeadStatus": "Closed" })
        );
    }

    #[test]
    fn test_offline_action_wire_shape() {
        let update = OfflineAction::UpdateLead {
            id: "L1".to_string(),
            fields: LeadFields {
                status: Some("Closed".to_string()),
                ..LeadFields::default()
            },
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({
                "type": "UPDATE_LEAD",
                "payload": { "id": "L1", "fields": { "LeadStatus": "Closed" } }
            })
        );

        let note = OfflineAction::AddNote {
            id: "L1".to_string(),
            note_text: "Called, no answer".to_string(),
            rep_name: "Alice".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&note).unwrap(),
            json!({
                "type": "ADD_NOTE",
                "payload": {
                    "id": "L1",
                    "noteText": "Called, no answer",
                    "repName": "Alice"
                }
            })
        );

        let round_tripped: OfflineAction =
            serde_json::from_value(serde_json::to_value(&note).unwrap()).unwrap();
        assert_eq!(round_tripped, note);
    }

    #[test]
    fn test_renter_owner_as_string() {
        assert_eq!(RenterOwner::Owner.to_string(), "Owner");
        assert_eq!(RenterOwner::Unspecified.to_string(), "");
        assert_eq!("Renter".parse::<RenterOwner>().unwrap(), RenterOwner::Renter);
        assert_eq!("".parse::<RenterOwner>().unwrap(), RenterOwner::Unspecified);
    }
}
