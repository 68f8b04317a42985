use super::backend::{BackendProvider, StorageBackend};
use super::IndexFile;
use crate::error::{PadError, Result};
use crate::model::{NoteKey, Scope};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since the engine is single-threaded.
/// This keeps every `StorageBackend` method on `&self`.
#[derive(Default)]
pub struct MemBackend {
    index: RefCell<IndexFile>,
    blobs: RefCell<BTreeMap<NoteKey, Vec<u8>>>,
    simulate_write_error: RefCell<bool>,
    simulate_corrupt_index: RefCell<bool>,
    simulate_index_write_error: RefCell<bool>,
    simulate_list_error: RefCell<bool>,
    unreadable: RefCell<BTreeSet<NoteKey>>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Make `load_index` fail as if the index file were unreadable.
    pub fn set_simulate_corrupt_index(&self, simulate: bool) {
        *self.simulate_corrupt_index.borrow_mut() = simulate;
    }

    /// Fail only `save_index`, letting blob writes through.
    pub fn set_simulate_index_write_error(&self, simulate: bool) {
        *self.simulate_index_write_error.borrow_mut() = simulate;
    }

    /// Make `list_blob_keys` fail while the index stays readable.
    pub fn set_simulate_list_error(&self, simulate: bool) {
        *self.simulate_list_error.borrow_mut() = simulate;
    }

    /// Make `read_blob` fail for one key.
    pub fn set_unreadable(&self, key: NoteKey) {
        self.unreadable.borrow_mut().insert(key);
    }

    fn check_writable(&self) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(PadError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn load_index(&self) -> Result<IndexFile> {
        if *self.simulate_corrupt_index.borrow() {
            return Err(PadError::Store("Simulated corrupt index".to_string()));
        }
        Ok(self.index.borrow().clone())
    }

    fn save_index(&self, index: &IndexFile) -> Result<()> {
        self.check_writable()?;
        if *self.simulate_index_write_error.borrow() {
            return Err(PadError::Store("Simulated index write error".to_string()));
        }
        *self.index.borrow_mut() = index.clone();
        Ok(())
    }

    fn read_blob(&self, key: &NoteKey) -> Result<Option<Vec<u8>>> {
        if self.unreadable.borrow().contains(key) {
            return Err(PadError::Store(format!("Simulated unreadable blob {}", key)));
        }
        Ok(self.blobs.borrow().get(key).cloned())
    }

    fn write_blob(&self, key: &NoteKey, content: &[u8]) -> Result<()> {
        self.check_writable()?;
        self.blobs.borrow_mut().insert(*key, content.to_vec());
        Ok(())
    }

    fn delete_blob(&self, key: &NoteKey) -> Result<()> {
        self.blobs.borrow_mut().remove(key);
        Ok(())
    }

    fn list_blob_keys(&self) -> Result<Vec<NoteKey>> {
        if *self.simulate_list_error.borrow() {
            return Err(PadError::Store("Simulated listing error".to_string()));
        }
        Ok(self.blobs.borrow().keys().copied().collect())
    }

    fn sweep_temp_files(&self) -> Result<usize> {
        Ok(0)
    }

    fn blob_path(&self, key: &NoteKey) -> PathBuf {
        PathBuf::from(format!("memory://files/{}", key))
    }
}

/// Provider over in-memory backends. Scopes can be pre-seeded with a prepared
/// backend; any other scope opens empty.
#[derive(Default)]
pub struct MemProvider {
    seeded: RefCell<HashMap<Scope, MemBackend>>,
    known: RefCell<BTreeSet<Scope>>,
}

impl MemProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(self, scope: Scope, backend: MemBackend) -> Self {
        self.known.borrow_mut().insert(scope.clone());
        self.seeded.borrow_mut().insert(scope, backend);
        self
    }
}

impl BackendProvider for MemProvider {
    type Backend = MemBackend;

    fn open(&self, scope: &Scope) -> Result<MemBackend> {
        self.known.borrow_mut().insert(scope.clone());
        Ok(self.seeded.borrow_mut().remove(scope).unwrap_or_default())
    }

    fn known_scopes(&self) -> Result<Vec<Scope>> {
        Ok(self.known.borrow().iter().cloned().collect())
    }
}
