//! Storage abstractions and the filesystem backend.

pub mod filesystem;
pub mod traits;
pub mod types;

pub use filesystem::{FilesystemStore, PastePaths, ShardLayout};
pub use traits::PasteStore;
pub use types::{
    Comment, CommentMeta, CreateOutcome, ExpirePreset, NewComment, NewPaste, Paste, PasteMeta,
};
