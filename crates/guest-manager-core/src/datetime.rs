// ABOUTME: Serde helpers for local (timezone-less) date-times such as "2024-05-01T09:30".
// ABOUTME: Accepts minute or second precision and writes minute precision when seconds are zero.

use chrono::{DateTime, NaiveDateTime, Timelike};

const MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";
const SECOND_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const FRACTION_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse a local date-time. RFC 3339 input with an offset is accepted and
/// reduced to its UTC wall-clock time.
pub fn parse_local(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, MINUTE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, FRACTION_FORMAT))
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.naive_utc()))
}

/// Format a local date-time with the shortest precision that loses nothing.
pub fn format_local(value: &NaiveDateTime) -> String {
    let format = if value.nanosecond() != 0 {
        FRACTION_FORMAT
    } else if value.second() != 0 {
        SECOND_FORMAT
    } else {
        MINUTE_FORMAT
    };
    value.format(format).to_string()
}

/// `#[serde(with = "crate::datetime::local")]` for required fields.
pub mod local {
    use chrono::NaiveDateTime;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_local(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_local(&raw).map_err(D::Error::custom)
    }
}

/// `#[serde(default, with = "crate::datetime::local_opt")]` for nullable
/// fields. Empty strings (an untouched form input) decode as `None`.
pub mod local_opt {
    use chrono::NaiveDateTime;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&super::format_local(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => {
                super::parse_local(&raw).map(Some).map_err(D::Error::custom)
            }
            _ => Ok(None),
        }
    }
}
