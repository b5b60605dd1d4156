//! Strong type definitions for Ecole records.
//!
//! Identifiers and months are newtypes so they cannot be mixed up with
//! arbitrary strings at call sites.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use time::OffsetDateTime;

use crate::error::{CoreError, Result};

/// Whole currency units (francs).
pub type Amount = i64;

/// Last millisecond value handed out by [`RecordId::generate`].
static LAST_GENERATED: AtomicI64 = AtomicI64::new(0);

/// A record identifier.
///
/// Generated ids are the creation time in Unix milliseconds. Ids handed out
/// by one process are strictly increasing, so two records created within the
/// same millisecond still get distinct ids.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh timestamp-derived identifier.
    pub fn generate() -> Self {
        Self(next_millis().to_string())
    }

    /// Generate a timestamp-derived identifier with a suffix, e.g. `_reply`.
    pub fn generate_with_suffix(suffix: &str) -> Self {
        Self(format!("{}{}", next_millis(), suffix))
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the identifier text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for RecordId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RecordId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A calendar month in `YYYY-MM` form.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month(String);

impl Month {
    /// Parse a `YYYY-MM` string.
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[5..].iter().all(u8::is_ascii_digit);
        if !well_formed {
            return Err(CoreError::InvalidMonth(s.to_string()));
        }
        match s[5..].parse::<u8>() {
            Ok(1..=12) => Ok(Self(s.to_string())),
            _ => Err(CoreError::InvalidMonth(s.to_string())),
        }
    }

    /// The current UTC month.
    pub fn current() -> Self {
        let now = OffsetDateTime::now_utc();
        Self(format!("{:04}-{:02}", now.year(), u8::from(now.month())))
    }

    /// The `YYYY` part.
    pub fn year(&self) -> &str {
        &self.0[..4]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Month({})", self.0)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Month {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self> {
        Month::parse(&s)
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.0
    }
}

/// Current time in Unix milliseconds.
pub fn now_millis() -> i64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    (nanos / 1_000_000) as i64
}

/// Current UTC instant as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

/// Current UTC date as `YYYY-MM-DD`.
pub fn today() -> String {
    OffsetDateTime::now_utc().date().to_string()
}

fn next_millis() -> i64 {
    let now = now_millis();
    let mut last = LAST_GENERATED.load(Ordering::Relaxed);
    loop {
        let next = if now > last { now } else { last + 1 };
        match LAST_GENERATED.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = RecordId::generate();
        let b = RecordId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().parse::<i64>().unwrap() < b.as_str().parse::<i64>().unwrap());
    }

    #[test]
    fn test_suffixed_id() {
        let id = RecordId::generate_with_suffix("_reply");
        assert!(id.as_str().ends_with("_reply"));
    }

    #[test]
    fn test_month_parse() {
        let month = Month::parse("2024-10").unwrap();
        assert_eq!(month.year(), "2024");
        assert_eq!(month.to_string(), "2024-10");

        assert!(Month::parse("2024-13").is_err());
        assert!(Month::parse("2024-1").is_err());
        assert!(Month::parse("24-10-01").is_err());
    }

    #[test]
    fn test_month_serde() {
        let month: Month = serde_json::from_str("\"2025-01\"").unwrap();
        assert_eq!(month.as_str(), "2025-01");
        assert!(serde_json::from_str::<Month>("\"january\"").is_err());
    }

    #[test]
    fn test_current_month_is_valid() {
        let month = Month::current();
        assert!(Month::parse(month.as_str()).is_ok());
    }
}
