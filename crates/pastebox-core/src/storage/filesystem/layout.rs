//! Mapping from identifiers to filesystem locations.
//!
//! ```text
//! <root>/<id[0..2]>/<id[2..4]>/<id>.json               paste record
//! <root>/<id[0..2]>/<id[2..4]>/<id>.discussion/        comments of <id>
//!     <comment_id>.json                                one comment; its
//!                                                      parent is in the record
//! <root>/<id[0..2]>/<id[2..4]>/.<id>.json.purge.tmp    held while <id> is
//!                                                      being reclaimed
//! ```
//!
//! Two levels of two-character fan-out keep any single directory small. The
//! mapping depends only on the id, so every process agrees on it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::fs::TEMP_SUFFIX;
use crate::id::PasteId;

const RECORD_EXT: &str = ".json";
const DISCUSSION_EXT: &str = ".discussion";

/// Resolved locations for one paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PastePaths {
    pub shard_dir: PathBuf,
    pub record: PathBuf,
    pub discussion: PathBuf,
    pub purge_lock: PathBuf,
}

/// Identifier-to-path mapper rooted at a storage directory.
#[derive(Debug, Clone)]
pub struct ShardLayout {
    root: PathBuf,
}

impl ShardLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn paste(&self, id: &PasteId) -> PastePaths {
        let (first, second) = id.shard();
        let shard_dir = self.root.join(first).join(second);
        let record = shard_dir.join(format!("{}{}", id, RECORD_EXT));
        let discussion = shard_dir.join(format!("{}{}", id, DISCUSSION_EXT));
        let purge_lock = shard_dir.join(format!(".{}{}.purge{}", id, RECORD_EXT, TEMP_SUFFIX));
        PastePaths {
            shard_dir,
            record,
            discussion,
            purge_lock,
        }
    }

    /// File name of a comment inside its paste's discussion directory.
    ///
    /// Keyed by the comment id alone, so one comment id can be published only
    /// once per paste whatever its parent.
    pub fn comment_file_name(comment_id: &PasteId) -> String {
        format!("{}{}", comment_id, RECORD_EXT)
    }

    /// Recover the paste id from a record file name, ignoring anything else.
    pub fn parse_record_name(name: &str) -> Option<PasteId> {
        let stem = name.strip_suffix(RECORD_EXT)?;
        PasteId::parse(stem).ok()
    }

    /// Recover the comment id from a comment file name.
    pub fn parse_comment_name(name: &str) -> Option<PasteId> {
        Self::parse_record_name(name)
    }

    /// All second-level shard directories currently present.
    ///
    /// A missing root yields an empty list.
    pub fn shard_dirs(&self) -> io::Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for first in subdirs(&self.root)? {
            dirs.extend(subdirs(&first)?);
        }
        dirs.sort();
        Ok(dirs)
    }
}

fn subdirs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };
    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        // Shard names are exactly two id characters
        let is_shard = name.len() == 2 && !name.to_string_lossy().starts_with('.');
        if is_shard && entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}
