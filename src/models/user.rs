//! User model and role.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::serde_helpers::flexible_bool;
use crate::errors::Result;

/// Which side of a job the current user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Technician,
}

/// The signed-in user. Replaced wholesale on every update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_technician: bool,
    /// Every other column the server sends, user settings included
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl User {
    /// Parse the JSON value the server embeds in the page for the signed-in user.
    pub fn from_meta(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw.trim())?)
    }

    pub fn role(&self) -> Role {
        if self.is_technician {
            Role::Technician
        } else {
            Role::Client
        }
    }

    /// Read a boolean setting; integer columns count as booleans.
    pub fn setting(&self, name: &str) -> Option<bool> {
        match self.settings.get(name)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().map(|i| i != 0),
            _ => None,
        }
    }
}

/// A single setting change sent to `/api/user/update-settings`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingField {
    pub name: String,
    pub value: bool,
}

impl SettingField {
    pub fn new(name: impl Into<String>, value: bool) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_from_meta() {
        let user = User::from_meta(
            r#" {"id":12,"name":"Ana","is_technician":0,"email_notifications":1,"dark_mode":false} "#,
        )
        .unwrap();

        assert_eq!(user.id, 12);
        assert_eq!(user.name.as_deref(), Some("Ana"));
        assert_eq!(user.role(), Role::Client);
        assert_eq!(user.setting("email_notifications"), Some(true));
        assert_eq!(user.setting("dark_mode"), Some(false));
        assert_eq!(user.setting("missing"), None);
    }

    #[test]
    fn test_user_from_meta_rejects_garbage() {
        assert!(User::from_meta("not json").is_err());
    }
}
