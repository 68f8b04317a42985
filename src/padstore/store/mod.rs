//! # Storage Layer
//!
//! Each scope owns its own durable state: one metadata index plus one content blob
//! per note. [`NoteStore`] implements the note semantics (keys, timestamps,
//! ordering, patching) on top of a [`StorageBackend`], which only knows how to move
//! bytes.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: Production file-based storage
//!   - Metadata in `index.json`, rewritten through a temp file + rename
//!   - Content in `files/<key>`, raw bytes, written the same way
//!
//! - [`mem_backend::MemBackend`]: In-memory storage for testing
//!
//! Backends are handed out per scope by a [`BackendProvider`]
//! ([`fs_backend::FsProvider`] or [`mem_backend::MemProvider`]).
//!
//! ## Storage Format
//!
//! ```text
//! <data_dir>/
//! ├── global/
//! │   ├── index.json      # {"version": 1, "notes": {<key>: Note}}
//! │   └── files/<key>     # content blobs
//! └── <project>/
//!     └── ...
//! ```
//!
//! ## Write Ordering
//!
//! Content is written before the index entry that points at it, and the index entry
//! is removed before its content. A crash between the two steps leaves an orphan
//! blob (recovered by discovery), never an index entry without content.
//!
//! Concurrent processes get last-writer-wins at index granularity: the rename
//! guarantees the index is never seen half-written, nothing more.

use crate::model::{Note, NoteKey, NoteState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod note_store;

pub use backend::{BackendProvider, StorageBackend};
pub use note_store::NoteStore;

pub const INDEX_VERSION: u32 = 1;

/// The persisted metadata index of one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexFile {
    pub version: u32,
    #[serde(default)]
    pub notes: BTreeMap<NoteKey, Note>,
}

impl Default for IndexFile {
    fn default() -> Self {
        Self {
            version: INDEX_VERSION,
            notes: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFilter {
    #[default]
    Active,
    Deleted,
    All,
}

impl ListFilter {
    pub fn accepts(&self, note: &Note) -> bool {
        match self {
            ListFilter::Active => !note.is_deleted(),
            ListFilter::Deleted => note.is_deleted(),
            ListFilter::All => true,
        }
    }
}

/// Field changes applied by [`NoteStore::update`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<Vec<u8>>,
    pub state: Option<NoteState>,
}

impl NotePatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn content(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn state(state: NoteState) -> Self {
        Self {
            state: Some(state),
            ..Default::default()
        }
    }
}

/// Result of a state-changing call that may turn out to be a no-op.
#[derive(Debug, Clone)]
pub enum Outcome {
    Changed(Note),
    Unchanged(Note),
}

impl Outcome {
    pub fn note(&self) -> &Note {
        match self {
            Outcome::Changed(n) | Outcome::Unchanged(n) => n,
        }
    }

    pub fn into_note(self) -> Note {
        match self {
            Outcome::Changed(n) | Outcome::Unchanged(n) => n,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Outcome::Changed(_))
    }
}
