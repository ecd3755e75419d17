//! Backend-native timestamp type.

use std::fmt;

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A point in time as stored by the document database.
///
/// Timestamps travel as RFC 3339 strings in UTC. Conversion to the device's
/// local time happens only at the model boundary via [`Timestamp::to_local`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Wrap a UTC date-time.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Convert from a local date-time.
    pub fn from_local(dt: DateTime<Local>) -> Self {
        Self(dt.with_timezone(&Utc))
    }

    /// Returns the UTC date-time.
    pub fn as_utc(&self) -> DateTime<Utc> {
        self.0
    }

    /// Convert to the device's local time zone.
    pub fn to_local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    /// Format as RFC 3339 with a `Z` suffix.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    /// Parse an RFC 3339 string.
    ///
    /// # Errors
    ///
    /// Returns the parser error for malformed input.
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s).map(|dt| Self(dt.with_timezone(&Utc)))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Timestamp::parse(&s).map_err(serde::de::Error::custom)
    }
}
