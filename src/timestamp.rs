//! Timestamps as they arrive from external records.
//!
//! Entity documents carry instants in several encodings: Firestore-style
//! `{seconds, nanoseconds}` objects, epoch milliseconds, RFC 3339 strings or bare
//! calendar dates. [`Timestamp`] captures all of them as one tagged value so the
//! shape is decided once, where JSON is deserialized, and never re-inspected.

use crate::calendar::date_key;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Firestore {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
    EpochMillis(i64),
    Text(String),
}

impl Timestamp {
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::Firestore {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(*seconds, *nanoseconds),
            Timestamp::EpochMillis(millis) => DateTime::from_timestamp_millis(*millis),
            Timestamp::Text(text) => {
                let text = text.trim();
                if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
                    return Some(parsed.with_timezone(&Utc));
                }
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc())
            }
        }
    }

    /// Calendar day of the instant. Numeric encodings resolve in UTC; RFC 3339
    /// text keeps the day as written in its own offset.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Timestamp::Text(text) => {
                let text = text.trim();
                if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
                    return Some(parsed.date_naive());
                }
                NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
            }
            _ => self.to_datetime().map(|instant| instant.date_naive()),
        }
    }

    /// `YYYY-MM-DD` key used by the exclusion queries.
    pub fn date_key(&self) -> Option<String> {
        self.date().map(date_key)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Timestamp::Firestore {
            seconds: value.timestamp(),
            nanoseconds: value.timestamp_subsec_nanos(),
        }
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(value: NaiveDate) -> Self {
        Timestamp::Text(date_key(value))
    }
}
