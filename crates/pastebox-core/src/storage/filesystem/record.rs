//! On-disk record envelopes, before parsing into domain types.

use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PasteError, Result};
use crate::id::PasteId;
use crate::storage::types::{Comment, CommentMeta, Paste, PasteMeta};

/// Version written into every record file.
pub const FORMAT_VERSION: u32 = 1;

/// A paste file as persisted.
#[derive(Debug, Serialize, Deserialize)]
pub struct PasteRecord {
    pub format_version: u32,
    pub id: PasteId,
    pub meta: PasteMeta,
    #[serde(with = "base64_payload")]
    pub payload: Vec<u8>,
}

/// The metadata part of a paste file. The payload string is skipped, not
/// decoded.
#[derive(Debug, Deserialize)]
pub struct PasteHeader {
    pub format_version: u32,
    pub id: PasteId,
    pub meta: PasteMeta,
}

/// A comment file as persisted.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentRecord {
    pub format_version: u32,
    pub id: PasteId,
    pub paste_id: PasteId,
    pub parent_id: PasteId,
    pub meta: CommentMeta,
    #[serde(with = "base64_payload")]
    pub payload: Vec<u8>,
}

impl PasteRecord {
    pub fn new(id: PasteId, meta: PasteMeta, payload: Vec<u8>) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            id,
            meta,
            payload,
        }
    }
}

impl From<PasteRecord> for Paste {
    fn from(record: PasteRecord) -> Self {
        Paste {
            id: record.id,
            payload: record.payload,
            meta: record.meta,
        }
    }
}

impl From<CommentRecord> for Comment {
    fn from(record: CommentRecord) -> Self {
        Comment {
            id: record.id,
            paste_id: record.paste_id,
            parent_id: record.parent_id,
            payload: record.payload,
            meta: record.meta,
        }
    }
}

/// Decode a paste file and check it belongs to `expected`.
pub fn decode_paste(bytes: &[u8], expected: &PasteId, path: &Path) -> Result<PasteRecord> {
    let record: PasteRecord = decode(bytes, path)?;
    check(record.format_version, &record.id, expected, path)?;
    Ok(record)
}

/// Decode only the header of a paste file.
///
/// The payload string is scanned past while streaming, never buffered.
pub fn decode_header<R: Read>(reader: R, expected: &PasteId, path: &Path) -> Result<PasteHeader> {
    let header: PasteHeader =
        serde_json::from_reader(BufReader::new(reader)).map_err(|e| {
            if e.is_io() {
                PasteError::Storage(format!("read {}: {}", path.display(), e))
            } else {
                PasteError::Corrupt(format!("{}: {}", path.display(), e))
            }
        })?;
    check(header.format_version, &header.id, expected, path)?;
    Ok(header)
}

pub fn decode_comment(bytes: &[u8], path: &Path) -> Result<CommentRecord> {
    let record: CommentRecord = decode(bytes, path)?;
    if record.format_version != FORMAT_VERSION {
        return Err(unsupported_version(record.format_version, path));
    }
    Ok(record)
}

fn decode<'a, T: Deserialize<'a>>(bytes: &'a [u8], path: &Path) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| PasteError::Corrupt(format!("{}: {}", path.display(), e)))
}

fn check(version: u32, found: &PasteId, expected: &PasteId, path: &Path) -> Result<()> {
    if version != FORMAT_VERSION {
        return Err(unsupported_version(version, path));
    }
    if found != expected {
        return Err(PasteError::Corrupt(format!(
            "{}: holds paste {} instead of {}",
            path.display(),
            found,
            expected
        )));
    }
    Ok(())
}

fn unsupported_version(version: u32, path: &Path) -> PasteError {
    PasteError::Corrupt(format!(
        "{}: unsupported format version {}",
        path.display(),
        version
    ))
}

mod base64_payload {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
