//! Job model and the merge rules applied when the server sends an update.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::serde_helpers::{double_option, flexible_bool, flexible_bool_opt};
use super::{Message, Role};

/// A status change recorded on a job. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub notify_client: bool,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub notify_technician: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A file attached to a job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobFile {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A unit of work between a client and an optional technician.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: i64,
    #[serde(default)]
    pub client_id: Option<i64>,
    #[serde(default)]
    pub technician_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub notify_client: bool,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub notify_technician: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
    #[serde(default)]
    pub files: Vec<JobFile>,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Server fields this client does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An update for a job as sent by the server.
///
/// Only `id` is mandatory. Absent fields leave the cached job untouched;
/// an explicit `null` clears the cached value (`technician_id: null` unassigns).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JobPatch {
    pub id: i64,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_id: Option<Option<i64>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub technician_id: Option<Option<i64>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub job_type: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "flexible_bool_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub notify_client: Option<bool>,
    #[serde(
        default,
        deserialize_with = "flexible_bool_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub notify_technician: Option<bool>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Vec<TimelineEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<JobFile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobPatch {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// The server marks soft-deleted jobs with a `terminated` key.
    pub fn is_terminated(&self) -> bool {
        self.extra.contains_key("terminated")
    }

    /// Whether the job is unassigned according to this patch alone.
    pub fn is_unassigned(&self) -> bool {
        !matches!(self.technician_id, Some(Some(id)) if id != 0)
    }
}

impl From<JobPatch> for Job {
    fn from(patch: JobPatch) -> Self {
        Self {
            id: patch.id,
            client_id: patch.client_id.flatten(),
            technician_id: patch.technician_id.flatten(),
            job_type: patch.job_type.flatten(),
            status: patch.status.flatten(),
            deadline: patch.deadline.flatten(),
            description: patch.description.flatten(),
            notify_client: patch.notify_client.unwrap_or(false),
            notify_technician: patch.notify_technician.unwrap_or(false),
            created_at: patch.created_at.flatten(),
            updated_at: patch.updated_at.flatten(),
            timeline: patch.timeline.unwrap_or_default(),
            files: patch.files.unwrap_or_default(),
            messages: patch.messages.unwrap_or_default(),
            extra: patch.extra,
        }
    }
}

impl Job {
    /// No technician, or the placeholder id 0.
    pub fn is_unassigned(&self) -> bool {
        self.technician_id.map_or(true, |id| id == 0)
    }

    /// The notify flag relevant to `role`.
    pub fn notify_for(&self, role: Role) -> bool {
        match role {
            Role::Client => self.notify_client,
            Role::Technician => self.notify_technician,
        }
    }

    pub fn set_notify_for(&mut self, role: Role, value: bool) {
        match role {
            Role::Client => self.notify_client = value,
            Role::Technician => self.notify_technician = value,
        }
    }

    /// Merge a server update into this job.
    ///
    /// Scalars present in the patch overwrite, `null` included, unless the
    /// patch is older than what is cached. Timeline and files are appended,
    /// skipping entries whose id is already known. Messages are never taken
    /// from a patch.
    ///
    /// Returns `false` when the scalar part was discarded as stale.
    pub fn apply(&mut self, patch: JobPatch) -> bool {
        let incoming = patch.updated_at.as_ref().and_then(|ts| ts.as_deref());
        let stale = is_older(incoming, self.updated_at.as_deref());

        if !stale {
            if let Some(client_id) = patch.client_id {
                self.client_id = client_id;
            }
            if let Some(technician_id) = patch.technician_id {
                self.technician_id = technician_id;
            }
            if let Some(job_type) = patch.job_type {
                self.job_type = job_type;
            }
            if let Some(status) = patch.status {
                self.status = status;
            }
            if let Some(deadline) = patch.deadline {
                self.deadline = deadline;
            }
            if let Some(description) = patch.description {
                self.description = description;
            }
            if let Some(flag) = patch.notify_client {
                self.notify_client = flag;
            }
            if let Some(flag) = patch.notify_technician {
                self.notify_technician = flag;
            }
            if let Some(created_at) = patch.created_at {
                self.created_at = created_at;
            }
            if let Some(updated_at) = patch.updated_at {
                self.updated_at = updated_at;
            }
            self.extra.extend(patch.extra);
        }

        if let Some(timeline) = patch.timeline {
            append_unseen(&mut self.timeline, timeline, |event| event.id);
        }
        if let Some(files) = patch.files {
            append_unseen(&mut self.files, files, |file| Some(file.id));
        }

        !stale
    }

    /// Clear the unseen markers on messages and on the role's timeline flags.
    pub fn clear_notifications(&mut self, role: Role) {
        for message in &mut self.messages {
            message.notify = false;
        }
        for event in &mut self.timeline {
            match role {
                Role::Client => event.notify_client = false,
                Role::Technician => event.notify_technician = false,
            }
        }
    }
}

/// Append `incoming` to `existing`, skipping entries whose id is already present.
/// Entries without an id are always appended.
fn append_unseen<T, F>(existing: &mut Vec<T>, incoming: Vec<T>, key: F)
where
    F: Fn(&T) -> Option<i64>,
{
    for item in incoming {
        let seen = key(&item).is_some_and(|id| existing.iter().any(|e| key(e) == Some(id)));
        if !seen {
            existing.push(item);
        }
    }
}

/// Parse the timestamp formats the API emits (ISO-8601 or `Y-m-d H:i:s`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// True only when both timestamps parse and `incoming` is strictly earlier.
fn is_older(incoming: Option<&str>, current: Option<&str>) -> bool {
    match (incoming.and_then(parse_timestamp), current.and_then(parse_timestamp)) {
        (Some(incoming), Some(current)) => incoming < current,
        _ => false,
    }
}
