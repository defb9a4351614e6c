//! Filesystem storage backend.
//!
//! Each paste is one JSON file under a sharded directory tree (see
//! [`layout`]). Files are written to a temporary name and published with a
//! single no-clobber link, so readers see either the whole record or nothing
//! and a live paste is never overwritten. Nothing is ever modified in place.
//!
//! Workers share nothing but the directory tree; there are no locks.

mod layout;
mod record;

use std::fmt;
use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::StoreConfig;
use crate::error::{PasteError, Result};
use crate::fs::{
    capture, is_temp_name, open_if_exists, LockFile, publish_no_clobber, read_if_exists,
    remove_dir_all_if_exists, remove_file_if_exists, write_temp,
};
use crate::id::PasteId;
use crate::lifecycle::{is_expired, Clock, Reclaimer, SystemClock};
use crate::storage::traits::PasteStore;
use crate::storage::types::{Comment, CreateOutcome, NewComment, NewPaste, Paste, PasteMeta};

pub use layout::{PastePaths, ShardLayout};
pub use record::FORMAT_VERSION;

use record::{decode_comment, decode_header, decode_paste, CommentRecord, PasteHeader, PasteRecord};

/// Age after which a reclamation lock is treated as left behind by a crash.
const PURGE_LOCK_STALE_AFTER: Duration = Duration::from_secs(30);

/// Filesystem-backed paste store.
///
/// Cloning is cheap and clones share the same clock.
#[derive(Clone)]
pub struct FilesystemStore {
    layout: ShardLayout,
    clock: Arc<dyn Clock>,
    reclaimer: Reclaimer,
    fsync: bool,
}

impl fmt::Debug for FilesystemStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilesystemStore")
            .field("root", &self.layout.root())
            .field("purge_mode", &self.reclaimer.mode())
            .field("fsync", &self.fsync)
            .finish_non_exhaustive()
    }
}

impl FilesystemStore {
    /// Open a store on the wall clock, creating the root directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `PasteError::Storage` if the root cannot be created.
    pub fn open(config: StoreConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Open a store that reads time from `clock`.
    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        fs::create_dir_all(&config.root)
            .map_err(|e| PasteError::storage("create root", &config.root, e))?;
        tracing::debug!(root = %config.root.display(), purge_mode = ?config.purge_mode, "opened paste store");
        Ok(Self {
            layout: ShardLayout::new(config.root),
            clock,
            reclaimer: Reclaimer::new(config.purge_mode),
            fsync: config.fsync,
        })
    }

    pub fn layout(&self) -> &ShardLayout {
        &self.layout
    }

    fn expired(&self, meta: &PasteMeta) -> bool {
        is_expired(meta, self.clock.now())
    }

    fn load_paste(&self, id: &PasteId) -> Result<Option<PasteRecord>> {
        let path = self.layout.paste(id).record;
        match read_if_exists(&path).map_err(|e| PasteError::storage("read", &path, e))? {
            Some(bytes) => Ok(Some(decode_paste(&bytes, id, &path)?)),
            None => Ok(None),
        }
    }

    fn load_header(&self, id: &PasteId) -> Result<Option<PasteHeader>> {
        let path = self.layout.paste(id).record;
        match open_if_exists(&path).map_err(|e| PasteError::storage("read", &path, e))? {
            Some(file) => Ok(Some(decode_header(file, id, &path)?)),
            None => Ok(None),
        }
    }

    /// Header of the paste if it exists and is live; schedules reclamation
    /// when it turns out to be expired.
    fn live_header(&self, id: &PasteId) -> Result<Option<PasteHeader>> {
        match self.load_header(id)? {
            Some(header) if self.expired(&header.meta) => {
                self.schedule_purge(id);
                Ok(None)
            }
            other => Ok(other),
        }
    }

    fn schedule_purge(&self, id: &PasteId) {
        let store = self.clone();
        let owned = id.clone();
        self.reclaimer
            .schedule(id, move || store.purge_if_expired(&owned));
    }

    /// Remove the paste only if it is still expired.
    ///
    /// Reclaimers of one id are serialized by a lock file, and expiry is
    /// judged again once the lock is held, so a record published after a
    /// stale look is never touched. A caller that finds the lock taken leaves
    /// the work to its holder. The record is then moved aside to a private
    /// temporary name and judged a final time, so only the file this call
    /// captured is ever unlinked; a capture that turns out to be live (after
    /// an explicit delete and re-create) is put back without clobbering.
    fn purge_if_expired(&self, id: &PasteId) -> Result<bool> {
        if !self.header_expired(id)? {
            return Ok(false);
        }

        let paths = self.layout.paste(id);
        let lock = LockFile::try_acquire(&paths.purge_lock, PURGE_LOCK_STALE_AFTER)
            .map_err(|e| PasteError::storage("lock", &paths.purge_lock, e))?;
        let Some(_lock) = lock else {
            tracing::debug!(paste_id = %id, "reclamation already in progress");
            return Ok(false);
        };
        if !self.header_expired(id)? {
            return Ok(false);
        }

        let Some(captured) =
            capture(&paths.record).map_err(|e| PasteError::storage("capture", &paths.record, e))?
        else {
            return Ok(false);
        };

        let verdict = File::open(&captured)
            .map_err(|e| PasteError::storage("read", &captured, e))
            .and_then(|file| decode_header(file, id, &captured))
            .map(|header| self.expired(&header.meta));
        match verdict {
            Ok(true) => {
                remove_file_if_exists(&captured)
                    .map_err(|e| PasteError::storage("delete", &captured, e))?;
                remove_dir_all_if_exists(&paths.discussion)
                    .map_err(|e| PasteError::storage("delete", &paths.discussion, e))?;
                Ok(true)
            }
            Ok(false) => {
                self.restore(id, &captured, &paths.record)?;
                Ok(false)
            }
            Err(err) => {
                self.restore(id, &captured, &paths.record)?;
                Err(err)
            }
        }
    }

    fn header_expired(&self, id: &PasteId) -> Result<bool> {
        Ok(self
            .load_header(id)?
            .is_some_and(|header| self.expired(&header.meta)))
    }

    /// Put a captured record back at `record` unless a newer one took its place.
    fn restore(&self, id: &PasteId, captured: &Path, record: &Path) -> Result<()> {
        let restored = publish_no_clobber(captured, record)
            .map_err(|e| PasteError::storage("restore", record, e))?;
        if !restored {
            tracing::warn!(paste_id = %id, "captured paste was displaced by a concurrent create");
        }
        Ok(())
    }

    /// Remove the record first so the paste disappears in one step, then its
    /// discussion.
    fn remove_paste(&self, id: &PasteId) -> Result<bool> {
        let paths = self.layout.paste(id);
        let removed = remove_file_if_exists(&paths.record)
            .map_err(|e| PasteError::storage("delete", &paths.record, e))?;
        remove_dir_all_if_exists(&paths.discussion)
            .map_err(|e| PasteError::storage("delete", &paths.discussion, e))?;
        Ok(removed)
    }

    /// Write `bytes` beside `destination` and publish without overwriting.
    fn publish(&self, destination: &Path, bytes: &[u8]) -> Result<bool> {
        let dir = destination.parent().ok_or_else(|| {
            PasteError::Storage(format!("{} has no parent directory", destination.display()))
        })?;
        fs::create_dir_all(dir).map_err(|e| PasteError::storage("create dir", dir, e))?;

        let stem = destination
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let temp = write_temp(dir, &stem, bytes, self.fsync)
            .map_err(|e| PasteError::storage("write", dir, e))?;
        publish_no_clobber(&temp, destination)
            .map_err(|e| PasteError::storage("publish", destination, e))
    }

    fn comment_ids(&self, paste_id: &PasteId) -> Result<Vec<PasteId>> {
        let discussion = self.layout.paste(paste_id).discussion;
        let entries = match fs::read_dir(&discussion) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(PasteError::storage("list", &discussion, err)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PasteError::storage("list", &discussion, e))?;
            let name = entry.file_name().to_string_lossy().to_string();
            if is_temp_name(&name) {
                continue;
            }
            if let Some(comment_id) = ShardLayout::parse_comment_name(&name) {
                ids.push(comment_id);
            }
        }
        Ok(ids)
    }

    fn load_comment(&self, paste_id: &PasteId, comment_id: &PasteId) -> Result<Option<Comment>> {
        let path = self
            .layout
            .paste(paste_id)
            .discussion
            .join(ShardLayout::comment_file_name(comment_id));
        match read_if_exists(&path).map_err(|e| PasteError::storage("read", &path, e))? {
            Some(bytes) => Ok(Some(decode_comment(&bytes, &path)?.into())),
            None => Ok(None),
        }
    }
}

impl PasteStore for FilesystemStore {
    fn create(&self, id: &PasteId, paste: &NewPaste) -> Result<CreateOutcome> {
        paste.validate()?;

        // An expired occupant does not block a new paste
        if self.purge_if_expired(id)? {
            tracing::debug!(paste_id = %id, "reclaimed expired paste before create");
        }

        let paths = self.layout.paste(id);
        let record = PasteRecord::new(id.clone(), paste.meta(self.clock.now()), paste.payload.clone());
        let bytes = serde_json::to_vec(&record)
            .map_err(|e| PasteError::Storage(format!("encode paste {}: {}", id, e)))?;

        if self.publish(&paths.record, &bytes)? {
            tracing::debug!(paste_id = %id, bytes = bytes.len(), "created paste");
            Ok(CreateOutcome::Created)
        } else {
            tracing::debug!(paste_id = %id, "paste already exists");
            Ok(CreateOutcome::AlreadyExists)
        }
    }

    fn read(&self, id: &PasteId) -> Result<Option<Paste>> {
        match self.load_paste(id)? {
            Some(record) if self.expired(&record.meta) => {
                self.schedule_purge(id);
                Ok(None)
            }
            Some(record) => Ok(Some(record.into())),
            None => Ok(None),
        }
    }

    fn delete(&self, id: &PasteId) -> Result<()> {
        if self.remove_paste(id)? {
            tracing::debug!(paste_id = %id, "deleted paste");
        }
        Ok(())
    }

    fn exists(&self, id: &PasteId) -> Result<bool> {
        Ok(self.live_header(id)?.is_some())
    }

    fn create_comment(
        &self,
        paste_id: &PasteId,
        parent_id: &PasteId,
        comment_id: &PasteId,
        comment: &NewComment,
    ) -> Result<CreateOutcome> {
        comment.validate()?;

        if self.live_header(paste_id)?.is_none() {
            return Err(PasteError::NotFound(format!("paste {}", paste_id)));
        }
        let discussion = self.layout.paste(paste_id).discussion;
        let parent_file = discussion.join(ShardLayout::comment_file_name(parent_id));
        if parent_id != paste_id && !parent_file.is_file() {
            return Err(PasteError::NotFound(format!(
                "comment {} on paste {}",
                parent_id, paste_id
            )));
        }

        // The comment id alone names the file, so the no-clobber publish
        // rejects a duplicate under any parent
        let destination = discussion.join(ShardLayout::comment_file_name(comment_id));
        let record = CommentRecord {
            format_version: FORMAT_VERSION,
            id: comment_id.clone(),
            paste_id: paste_id.clone(),
            parent_id: parent_id.clone(),
            meta: comment.meta(self.clock.now()),
            payload: comment.payload.clone(),
        };
        let bytes = serde_json::to_vec(&record)
            .map_err(|e| PasteError::Storage(format!("encode comment {}: {}", comment_id, e)))?;

        if !self.publish(&destination, &bytes)? {
            return Ok(CreateOutcome::AlreadyExists);
        }

        // The paste may have been deleted while the comment was being written
        if self.load_header(paste_id)?.is_none() {
            remove_dir_all_if_exists(&discussion)
                .map_err(|e| PasteError::storage("delete", &discussion, e))?;
            return Err(PasteError::NotFound(format!("paste {}", paste_id)));
        }

        tracing::debug!(paste_id = %paste_id, comment_id = %comment_id, "created comment");
        Ok(CreateOutcome::Created)
    }

    fn read_comments(&self, paste_id: &PasteId) -> Result<Vec<Comment>> {
        if self.live_header(paste_id)?.is_none() {
            return Ok(Vec::new());
        }

        let mut comments = Vec::new();
        for comment_id in self.comment_ids(paste_id)? {
            // A concurrent delete may remove files between listing and reading
            if let Some(comment) = self.load_comment(paste_id, &comment_id)? {
                comments.push(comment);
            }
        }

        comments.sort_by(|a, b| {
            a.meta
                .created_at
                .cmp(&b.meta.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(comments)
    }

    fn exists_comment(
        &self,
        paste_id: &PasteId,
        parent_id: &PasteId,
        comment_id: &PasteId,
    ) -> Result<bool> {
        if self.live_header(paste_id)?.is_none() {
            return Ok(false);
        }
        Ok(self
            .load_comment(paste_id, comment_id)?
            .is_some_and(|comment| comment.parent_id == *parent_id))
    }

    fn list_ids(&self) -> Result<Vec<PasteId>> {
        let now = self.clock.now();
        let mut ids = Vec::new();
        for id in self.record_ids()? {
            match self.load_header(&id) {
                Ok(Some(header)) if !is_expired(&header.meta, now) => ids.push(id),
                Ok(_) => {}
                Err(err) => tracing::warn!(paste_id = %id, error = %err, "skipping unreadable paste"),
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn purge_expired(&self, batch_size: usize) -> Result<usize> {
        let mut purged = 0;
        for id in self.record_ids()? {
            if purged >= batch_size {
                break;
            }
            match self.purge_if_expired(&id) {
                Ok(true) => purged += 1,
                Ok(false) => {}
                Err(err) => tracing::warn!(paste_id = %id, error = %err, "purge of expired paste failed"),
            }
        }
        if purged > 0 {
            tracing::info!(purged, "purged expired pastes");
        }
        Ok(purged)
    }
}

impl FilesystemStore {
    /// Every record file name present under the root, in shard order.
    fn record_ids(&self) -> Result<Vec<PasteId>> {
        let root = self.layout.root();
        let shards = self
            .layout
            .shard_dirs()
            .map_err(|e| PasteError::storage("list", root, e))?;

        let mut ids = Vec::new();
        for shard in shards {
            let entries = match fs::read_dir(&shard) {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(PasteError::storage("list", &shard, err)),
            };
            let mut names = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|e| PasteError::storage("list", &shard, e))?;
                names.push(entry.file_name().to_string_lossy().to_string());
            }
            names.sort();
            ids.extend(
                names
                    .iter()
                    .filter(|name| !is_temp_name(name))
                    .filter_map(|name| ShardLayout::parse_record_name(name)),
            );
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{ManualClock, PurgeMode};
    use chrono::{TimeZone, Utc};
    use std::time::Duration;
    use tempfile::TempDir;

    fn id(value: &str) -> PasteId {
        PasteId::parse(value).unwrap()
    }

    fn store(dir: &TempDir) -> (FilesystemStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        ));
        let config = StoreConfig::new(dir.path())
            .with_purge_mode(PurgeMode::Inline)
            .with_fsync(false);
        let store = FilesystemStore::with_clock(config, clock.clone()).unwrap();
        (store, clock)
    }

    #[test]
    fn test_create_writes_sharded_record() {
        let dir = TempDir::new().unwrap();
        let (store, _clock) = store(&dir);
        let paste_id = id("f468483c313401e8");

        let outcome = store.create(&paste_id, &NewPaste::new("payload")).unwrap();
        assert_eq!(outcome, CreateOutcome::Created);

        let expected = dir.path().join("f4").join("68").join("f468483c313401e8.json");
        assert!(expected.is_file());
        let names: Vec<String> = fs::read_dir(dir.path().join("f4").join("68"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["f468483c313401e8.json".to_string()]);
    }

    #[test]
    fn test_create_stamps_clock_time() {
        let dir = TempDir::new().unwrap();
        let (store, clock) = store(&dir);
        let paste_id = id("abcd1234");

        store.create(&paste_id, &NewPaste::new("x")).unwrap();
        let paste = store.read(&paste_id).unwrap().unwrap();
        assert_eq!(paste.meta.created_at, clock.now());
    }

    #[test]
    fn test_invalid_metadata_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let (store, _clock) = store(&dir);
        let paste = NewPaste::new("x").with_extra("nested", serde_json::json!({"a": 1}));

        let err = store.create(&id("abcd1234"), &paste).unwrap_err();
        assert!(matches!(err, PasteError::InvalidInput(_)));
        assert!(!dir.path().join("ab").exists());
    }

    #[test]
    fn test_expired_occupant_is_replaced() {
        let dir = TempDir::new().unwrap();
        let (store, clock) = store(&dir);
        let paste_id = id("abcd1234");

        let short = NewPaste::new("old").with_expire_interval(Duration::from_secs(60));
        assert!(store.create(&paste_id, &short).unwrap().is_created());
        assert_eq!(
            store.create(&paste_id, &NewPaste::new("new")).unwrap(),
            CreateOutcome::AlreadyExists
        );

        clock.advance(Duration::from_secs(61));
        assert!(store.create(&paste_id, &NewPaste::new("new")).unwrap().is_created());
        assert_eq!(store.read(&paste_id).unwrap().unwrap().payload, b"new");
    }

    #[test]
    fn test_corrupt_record_is_reported() {
        let dir = TempDir::new().unwrap();
        let (store, _clock) = store(&dir);
        let paste_id = id("abcd1234");
        let paths = store.layout().paste(&paste_id);
        fs::create_dir_all(&paths.shard_dir).unwrap();
        fs::write(&paths.record, b"{ not json").unwrap();

        assert!(matches!(store.read(&paste_id), Err(PasteError::Corrupt(_))));
        assert!(matches!(store.exists(&paste_id), Err(PasteError::Corrupt(_))));
    }

    #[test]
    fn test_list_ids_skips_temp_and_expired() {
        let dir = TempDir::new().unwrap();
        let (store, clock) = store(&dir);
        store.create(&id("aaaa0001"), &NewPaste::new("a")).unwrap();
        store
            .create(
                &id("bbbb0002"),
                &NewPaste::new("b").with_expire_interval(Duration::from_secs(10)),
            )
            .unwrap();
        let shard = store.layout().paste(&id("aaaa0001")).shard_dir;
        fs::write(shard.join(".aaaa0003.json.deadbeef.tmp"), b"partial").unwrap();

        assert_eq!(store.list_ids().unwrap(), vec![id("aaaa0001"), id("bbbb0002")]);
        clock.advance(Duration::from_secs(10));
        assert_eq!(store.list_ids().unwrap(), vec![id("aaaa0001")]);
    }

    #[test]
    fn test_debug_names_root() {
        let dir = TempDir::new().unwrap();
        let (store, _clock) = store(&dir);
        let rendered = format!("{:?}", store);
        assert!(rendered.contains("FilesystemStore"));
        assert!(rendered.contains("Inline"));
    }
}
