//! Paste store trait definition.
//!
//! The `PasteStore` trait defines the interface that every storage backend
//! implements. Callers hold a `dyn PasteStore` (or a generic) and never touch
//! the medium directly.

use crate::error::Result;
use crate::id::PasteId;

use super::types::{Comment, CreateOutcome, NewComment, NewPaste, Paste};

/// Storage interface for encrypted pastes and their discussions.
///
/// All implementations must ensure:
/// - A paste becomes visible in one atomic step, never partially
/// - A live paste is never overwritten (there is no update operation)
/// - Expired pastes are indistinguishable from absent ones
/// - Absence and conflict are outcomes, not errors
pub trait PasteStore: Send + Sync {
    /// Store a new paste under `id`.
    ///
    /// # Returns
    ///
    /// `CreateOutcome::AlreadyExists` if a live paste already holds `id`; the
    /// existing paste is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `PasteError::InvalidInput` for malformed metadata and
    /// `PasteError::Storage` if the medium fails. A failed create never
    /// leaves a visible partial paste.
    fn create(&self, id: &PasteId, paste: &NewPaste) -> Result<CreateOutcome>;

    /// Get a paste by ID.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(paste))` if found and live, `Ok(None)` if it was never
    /// created, was deleted, or has expired.
    fn read(&self, id: &PasteId) -> Result<Option<Paste>>;

    /// Ensure no paste (and no discussion) exists under `id`.
    ///
    /// Deleting an absent paste succeeds.
    fn delete(&self, id: &PasteId) -> Result<()>;

    /// Whether a live paste exists, without decoding its payload.
    fn exists(&self, id: &PasteId) -> Result<bool>;

    // --- Discussion operations ---

    /// Attach a comment to a live paste.
    ///
    /// # Errors
    ///
    /// Returns `PasteError::NotFound` if the paste is absent or expired, or if
    /// `parent_id` names neither the paste nor one of its comments.
    fn create_comment(
        &self,
        paste_id: &PasteId,
        parent_id: &PasteId,
        comment_id: &PasteId,
        comment: &NewComment,
    ) -> Result<CreateOutcome>;

    /// All comments of a paste, oldest first. Empty if the paste is gone.
    fn read_comments(&self, paste_id: &PasteId) -> Result<Vec<Comment>>;

    /// Whether a specific comment exists on a live paste.
    fn exists_comment(
        &self,
        paste_id: &PasteId,
        parent_id: &PasteId,
        comment_id: &PasteId,
    ) -> Result<bool>;

    // --- Maintenance operations ---

    /// IDs of all live pastes, sorted.
    fn list_ids(&self) -> Result<Vec<PasteId>>;

    /// Physically remove up to `batch_size` expired pastes.
    ///
    /// # Returns
    ///
    /// The number of pastes removed.
    fn purge_expired(&self, batch_size: usize) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_is_object_safe() {
        fn _accepts_store(_store: &dyn PasteStore) {}
    }
}
