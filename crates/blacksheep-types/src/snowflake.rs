use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Milliseconds between the Unix epoch and the platform epoch (2015-01-01T00:00:00Z)
pub const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// Bits below the timestamp: worker id, process id and increment
const TIMESTAMP_SHIFT: u32 = 22;

/// A 64-bit time-sortable identifier.
///
/// The platform sends these as decimal strings, so that is also the
/// serialized form. Ordering follows creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Snowflake(u64);

impl Snowflake {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Milliseconds since the Unix epoch at which this id was minted
    #[must_use]
    pub const fn timestamp_millis(self) -> u64 {
        (self.0 >> TIMESTAMP_SHIFT) + DISCORD_EPOCH_MS
    }

    /// Wall-clock creation time encoded in the id
    #[must_use]
    pub fn timestamp(self) -> DateTime<Utc> {
        // 42 timestamp bits past 2015 always fit in chrono's range
        DateTime::from_timestamp_millis(self.timestamp_millis() as i64).unwrap_or_default()
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Snowflake {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl TryFrom<String> for Snowflake {
    type Error = ParseIntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Snowflake> for String {
    fn from(value: Snowflake) -> Self {
        value.to_string()
    }
}

impl From<u64> for Snowflake {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
