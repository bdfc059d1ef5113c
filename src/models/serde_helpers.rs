//! Deserialization helpers for loosely typed server payloads.

use serde::{Deserialize, Deserializer};

/// Accept `true`/`false`, `0`/`1`, `"0"`/`"1"` and `null` (as false).
pub fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Str(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(i)) => i != 0,
        Some(Flag::Str(s)) => !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")),
        None => false,
    })
}

/// Like [`flexible_bool`], but keeps "absent" distinct from "false".
pub fn flexible_bool_opt<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    flexible_bool(deserializer).map(Some)
}

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
///
/// Must be paired with `#[serde(default)]`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
