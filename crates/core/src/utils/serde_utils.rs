//! Serde helpers for loosely typed job payloads.

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Int(i64),
    Float(f64),
}

/// Accepts an identifier written either as a JSON string or a JSON number.
///
/// The API process historically sends numeric user ids, while ids produced
/// by this worker are strings.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Str(s) if s.trim().is_empty() => {
            Err(de::Error::custom("identifier must not be empty"))
        }
        StringOrNumber::Str(s) => Ok(s),
        StringOrNumber::Int(n) => Ok(n.to_string()),
        StringOrNumber::Float(f) if f.fract() == 0.0 && f.is_finite() => {
            Ok(format!("{}", f as i64))
        }
        StringOrNumber::Float(f) => Err(de::Error::custom(format!(
            "identifier must be an integer, got {}",
            f
        ))),
    }
}
