//! Core data types for the storage layer.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PasteError, Result};
use crate::id::PasteId;

/// Metadata keys with a dedicated field; they cannot appear in `extra`.
const RESERVED_PASTE_KEYS: &[&str] = &[
    "created_at",
    "expire_interval",
    "formatter",
    "open_discussion",
    "burn_after_reading",
];
const RESERVED_COMMENT_KEYS: &[&str] = &["created_at", "icon"];

/// Outcome of a create call. Losing to an existing record is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

impl CreateOutcome {
    pub fn is_created(self) -> bool {
        matches!(self, CreateOutcome::Created)
    }
}

/// Metadata stored alongside a paste payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasteMeta {
    /// When this paste was created
    pub created_at: DateTime<Utc>,

    /// How long after `created_at` the paste stays readable
    #[serde(
        default,
        with = "duration_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub expire_interval: Option<Duration>,

    /// Display hint (e.g. "markdown"), opaque to the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatter: Option<String>,

    /// Whether comments are allowed, opaque to the store
    #[serde(default)]
    pub open_discussion: bool,

    /// Caller-enforced: delete after the first successful read
    #[serde(default)]
    pub burn_after_reading: bool,

    /// Any other scalar metadata supplied by the caller
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl PasteMeta {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            expire_interval: None,
            formatter: None,
            open_discussion: false,
            burn_after_reading: false,
            extra: BTreeMap::new(),
        }
    }

    /// When this paste expires, if ever.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        crate::lifecycle::expires_at(self)
    }
}

/// A stored paste.
#[derive(Debug, Clone, PartialEq)]
pub struct Paste {
    pub id: PasteId,

    /// Opaque (already encrypted) payload
    pub payload: Vec<u8>,

    pub meta: PasteMeta,
}

/// Builder for creating new pastes.
#[derive(Debug, Clone)]
pub struct NewPaste {
    pub payload: Vec<u8>,

    /// Creation time; stamped by the store when `None`
    pub created_at: Option<DateTime<Utc>>,

    pub expire_interval: Option<Duration>,
    pub formatter: Option<String>,
    pub open_discussion: bool,
    pub burn_after_reading: bool,
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl NewPaste {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            created_at: None,
            expire_interval: None,
            formatter: None,
            open_discussion: false,
            burn_after_reading: false,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_expire_interval(mut self, interval: Duration) -> Self {
        self.expire_interval = Some(interval);
        self
    }

    pub fn with_expire(mut self, preset: ExpirePreset) -> Self {
        self.expire_interval = preset.interval();
        self
    }

    pub fn with_formatter(mut self, formatter: impl Into<String>) -> Self {
        self.formatter = Some(formatter.into());
        self
    }

    pub fn with_open_discussion(mut self, open: bool) -> Self {
        self.open_discussion = open;
        self
    }

    pub fn with_burn_after_reading(mut self, burn: bool) -> Self {
        self.burn_after_reading = burn;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Check caller-supplied metadata before anything touches storage.
    pub fn validate(&self) -> Result<()> {
        validate_extra(&self.extra, RESERVED_PASTE_KEYS)
    }

    /// Resolve the metadata to persist, stamping `now` if no time was given.
    pub fn meta(&self, now: DateTime<Utc>) -> PasteMeta {
        PasteMeta {
            created_at: self.created_at.unwrap_or(now),
            expire_interval: self.expire_interval,
            formatter: self.formatter.clone(),
            open_discussion: self.open_discussion,
            burn_after_reading: self.burn_after_reading,
            extra: self.extra.clone(),
        }
    }
}

/// Metadata stored alongside a comment payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentMeta {
    pub created_at: DateTime<Utc>,

    /// Avatar hint, opaque to the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A discussion comment attached to a paste.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: PasteId,
    pub paste_id: PasteId,

    /// The paste id for top-level comments, otherwise the replied-to comment
    pub parent_id: PasteId,

    pub payload: Vec<u8>,
    pub meta: CommentMeta,
}

/// Builder for creating new comments.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub payload: Vec<u8>,
    pub created_at: Option<DateTime<Utc>>,
    pub icon: Option<String>,
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl NewComment {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            created_at: None,
            icon: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_extra(&self.extra, RESERVED_COMMENT_KEYS)
    }

    pub fn meta(&self, now: DateTime<Utc>) -> CommentMeta {
        CommentMeta {
            created_at: self.created_at.unwrap_or(now),
            icon: self.icon.clone(),
            extra: self.extra.clone(),
        }
    }
}

fn validate_extra(extra: &BTreeMap<String, serde_json::Value>, reserved: &[&str]) -> Result<()> {
    for (key, value) in extra {
        if key.is_empty() {
            return Err(PasteError::InvalidInput(
                "Empty metadata key is not allowed".to_string(),
            ));
        }
        if reserved.contains(&key.as_str()) || key == "format_version" {
            return Err(PasteError::InvalidInput(format!(
                "Metadata key \"{}\" is reserved",
                key
            )));
        }
        if value.is_array() || value.is_object() {
            return Err(PasteError::InvalidInput(format!(
                "Metadata value for \"{}\" must be a scalar",
                key
            )));
        }
    }
    Ok(())
}

/// Named expiration choices offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpirePreset {
    FiveMinutes,
    TenMinutes,
    OneHour,
    OneDay,
    OneWeek,
    OneMonth,
    OneYear,
    Never,
}

impl ExpirePreset {
    pub const ALL: [ExpirePreset; 8] = [
        ExpirePreset::FiveMinutes,
        ExpirePreset::TenMinutes,
        ExpirePreset::OneHour,
        ExpirePreset::OneDay,
        ExpirePreset::OneWeek,
        ExpirePreset::OneMonth,
        ExpirePreset::OneYear,
        ExpirePreset::Never,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExpirePreset::FiveMinutes => "5min",
            ExpirePreset::TenMinutes => "10min",
            ExpirePreset::OneHour => "1hour",
            ExpirePreset::OneDay => "1day",
            ExpirePreset::OneWeek => "1week",
            ExpirePreset::OneMonth => "1month",
            ExpirePreset::OneYear => "1year",
            ExpirePreset::Never => "never",
        }
    }

    /// The interval in effect, `None` for [`ExpirePreset::Never`].
    pub fn interval(self) -> Option<Duration> {
        let secs = match self {
            ExpirePreset::FiveMinutes => 300,
            ExpirePreset::TenMinutes => 600,
            ExpirePreset::OneHour => 3_600,
            ExpirePreset::OneDay => 86_400,
            ExpirePreset::OneWeek => 604_800,
            ExpirePreset::OneMonth => 2_592_000,
            ExpirePreset::OneYear => 31_536_000,
            ExpirePreset::Never => return None,
        };
        Some(Duration::from_secs(secs))
    }
}

impl fmt::Display for ExpirePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpirePreset {
    type Err = PasteError;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        ExpirePreset::ALL
            .into_iter()
            .find(|preset| preset.as_str() == token)
            .ok_or_else(|| {
                let known: Vec<&str> = ExpirePreset::ALL.iter().map(|p| p.as_str()).collect();
                PasteError::InvalidInput(format!(
                    "Unknown expiration \"{}\" (expected one of: {})",
                    s,
                    known.join(", ")
                ))
            })
    }
}

/// Serialize an optional `Duration` as whole seconds.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&duration.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_paste_builder() {
        let created = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let paste = NewPaste::new("ciphertext")
            .with_created_at(created)
            .with_expire(ExpirePreset::OneWeek)
            .with_formatter("markdown")
            .with_open_discussion(true)
            .with_extra("version", 2);

        let meta = paste.meta(Utc::now());
        assert_eq!(meta.created_at, created);
        assert_eq!(meta.expire_interval, Some(Duration::from_secs(604_800)));
        assert_eq!(meta.formatter.as_deref(), Some("markdown"));
        assert!(meta.open_discussion);
        assert!(!meta.burn_after_reading);
        assert_eq!(meta.extra["version"], serde_json::json!(2));
    }

    #[test]
    fn test_meta_stamps_now_when_unset() {
        let now = Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(NewPaste::new("x").meta(now).created_at, now);
        assert_eq!(NewComment::new("x").meta(now).created_at, now);
    }

    #[test]
    fn test_validate_rejects_nested_extra() {
        let paste = NewPaste::new("x").with_extra("tags", serde_json::json!(["a"]));
        assert!(matches!(paste.validate(), Err(PasteError::InvalidInput(_))));

        let comment = NewComment::new("x").with_extra("obj", serde_json::json!({"a": 1}));
        assert!(matches!(comment.validate(), Err(PasteError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_rejects_reserved_keys() {
        let paste = NewPaste::new("x").with_extra("formatter", "plaintext");
        assert!(matches!(paste.validate(), Err(PasteError::InvalidInput(_))));
        let paste = NewPaste::new("x").with_extra("", true);
        assert!(paste.validate().is_err());
        let comment = NewComment::new("x").with_extra("icon", "x");
        assert!(comment.validate().is_err());
    }

    #[test]
    fn test_meta_json_shape() {
        let created = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let meta = NewPaste::new("x")
            .with_created_at(created)
            .with_expire(ExpirePreset::FiveMinutes)
            .with_extra("salt", "abc")
            .meta(created);

        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["expire_interval"], serde_json::json!(300));
        assert_eq!(value["salt"], serde_json::json!("abc"));
        assert!(value.get("formatter").is_none());

        let back: PasteMeta = serde_json::from_value(value).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn test_meta_defaults_when_fields_missing() {
        let meta: PasteMeta =
            serde_json::from_str(r#"{"created_at":"2024-01-02T03:04:05Z"}"#).unwrap();
        assert!(meta.expire_interval.is_none());
        assert!(!meta.open_discussion);
        assert!(!meta.burn_after_reading);
        assert!(meta.extra.is_empty());
    }

    #[test]
    fn test_expire_preset_parse() {
        assert_eq!("1week".parse::<ExpirePreset>().unwrap(), ExpirePreset::OneWeek);
        assert_eq!(
            "1month".parse::<ExpirePreset>().unwrap().interval(),
            Some(Duration::from_secs(2_592_000))
        );
        assert_eq!("never".parse::<ExpirePreset>().unwrap().interval(), None);
        assert!(" 5min ".parse::<ExpirePreset>().is_ok());
        assert!("5 minutes".parse::<ExpirePreset>().is_err());
    }

    #[test]
    fn test_create_outcome() {
        assert!(CreateOutcome::Created.is_created());
        assert!(!CreateOutcome::AlreadyExists.is_created());
    }
}
