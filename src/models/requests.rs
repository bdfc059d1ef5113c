//! Request payloads sent to the API.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::SettingField;

/// Fields of a job being created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub client_id: i64,
    pub job_type: String,
    pub deadline: DateTime<Utc>,
    pub description: String,
}

impl NewJob {
    /// Deadline in the `YYYY-MM-DDTHH:MM:SS.sssZ` form the API expects.
    pub fn deadline_json(&self) -> String {
        self.deadline.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// A file to upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            mime: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// Body of `POST /api/job/update-status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub id: i64,
    pub status: String,
}

/// Body of requests that only carry a job id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobIdRequest {
    pub id: i64,
}

/// Body of `POST /api/job/assign`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignRequest {
    #[serde(rename = "idArray")]
    pub id_array: Vec<i64>,
}

/// Body of `POST /api/job/terminate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminateRequest {
    pub id: i64,
    pub rating: Option<u8>,
}

/// Body of `POST /api/message/store`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMessageRequest {
    pub job_id: i64,
    pub text: String,
}

/// Body of `POST /api/user/update-settings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    pub fields: Vec<SettingField>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_deadline_json() {
        let job = NewJob {
            client_id: 1,
            job_type: "repair".to_string(),
            deadline: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            description: String::new(),
        };
        assert_eq!(job.deadline_json(), "2024-05-01T12:30:00.000Z");
    }

    #[test]
    fn test_assign_request_wire_name() {
        let body = serde_json::to_value(AssignRequest { id_array: vec![1, 2] }).unwrap();
        assert_eq!(body, serde_json::json!({"idArray": [1, 2]}));
    }
}
