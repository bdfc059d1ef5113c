//! Message model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::serde_helpers::flexible_bool;

/// A chat message attached to a job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: i64,
    pub job_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<i64>,
    #[serde(default)]
    pub text: String,
    /// Unseen by the recipient
    #[serde(default, deserialize_with = "flexible_bool")]
    pub notify: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
