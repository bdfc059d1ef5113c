//! Data models for the JobTrack client.
//!
//! Field names follow the API's snake_case JSON so payloads decode as-is.

mod form;
mod job;
mod message;
mod requests;
mod serde_helpers;
mod user;

pub use form::*;
pub use job::*;
pub use message::*;
pub use requests::*;
pub use user::*;

use serde::Deserialize;

/// Payload that is either a single item or an array of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_or_many() {
        let one: OneOrMany<JobPatch> = serde_json::from_str(r#"{"id":1}"#).unwrap();
        assert_eq!(one.into_vec().len(), 1);

        let many: OneOrMany<JobPatch> = serde_json::from_str(r#"[{"id":1},{"id":2}]"#).unwrap();
        let ids: Vec<i64> = many.into_vec().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
