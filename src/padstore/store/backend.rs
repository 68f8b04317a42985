use super::IndexFile;
use crate::error::Result;
use crate::model::{NoteKey, Scope};
use std::path::PathBuf;

/// Raw storage I/O for a single scope.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while NoteStore handles the "what" (ordering, timestamps, lifecycle).
pub trait StorageBackend {
    // --- Index Operations ---

    /// Load the metadata index. A scope that was never written yields an empty index.
    fn load_index(&self) -> Result<IndexFile>;

    /// Persist the metadata index. MUST replace the previous index atomically.
    fn save_index(&self, index: &IndexFile) -> Result<()>;

    // --- Content Operations ---

    /// Read the raw bytes of a note.
    /// Returns Ok(None) if the blob does not exist (zombie detection relies on it).
    fn read_blob(&self, key: &NoteKey) -> Result<Option<Vec<u8>>>;

    /// Write the full content of a note, replacing any previous blob atomically.
    fn write_blob(&self, key: &NoteKey, content: &[u8]) -> Result<()>;

    /// Delete a blob. Deleting a missing blob succeeds.
    fn delete_blob(&self, key: &NoteKey) -> Result<()>;

    // --- Discovery ---

    /// Keys of every blob present, whether or not the index knows them.
    fn list_blob_keys(&self) -> Result<Vec<NoteKey>>;

    /// Remove temp files left behind by interrupted writes. Returns how many were removed.
    fn sweep_temp_files(&self) -> Result<usize>;

    // --- Paths ---

    /// Location of the blob. For FsBackend this is the real path,
    /// for MemBackend a virtual one.
    fn blob_path(&self, key: &NoteKey) -> PathBuf;
}

/// Hands out one backend per scope and knows which scopes hold data.
pub trait BackendProvider {
    type Backend: StorageBackend;

    fn open(&self, scope: &Scope) -> Result<Self::Backend>;

    /// Scopes with persisted state, in name order.
    fn known_scopes(&self) -> Result<Vec<Scope>>;
}
