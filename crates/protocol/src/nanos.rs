//! Serde helpers for `Duration` fields encoded as integer nanoseconds
//!
//! ```ignore
//! #[derive(Serialize, Deserialize)]
//! struct Record {
//!     #[serde(with = "flowmap_protocol::nanos")]
//!     start_time: Duration,
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Serialize a duration as whole nanoseconds
///
/// Saturates at `u64::MAX` (roughly year 2554 for epoch timestamps).
pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let nanos = u64::try_from(value.as_nanos()).unwrap_or(u64::MAX);
    serializer.serialize_u64(nanos)
}

/// Deserialize a duration from whole nanoseconds
pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let nanos = u64::deserialize(deserializer)?;
    Ok(Duration::from_nanos(nanos))
}
