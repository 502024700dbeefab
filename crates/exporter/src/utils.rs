use serde::{Deserialize, Deserializer};

/// Beacon API quantities are JSON strings ("12345"), decode them as u64.
pub fn deserialize_string_to_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    value.parse::<u64>().map_err(serde::de::Error::custom)
}
