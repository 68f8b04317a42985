use super::backend::{BackendProvider, StorageBackend};
use super::IndexFile;
use crate::error::{PadError, Result};
use crate::model::{NoteKey, Scope};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

pub const INDEX_FILE: &str = "index.json";
pub const CONTENT_DIR: &str = "files";

/// Filesystem storage for one scope directory:
///
/// ```text
/// <root>/index.json
/// <root>/files/<key>
/// ```
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    fn content_dir(&self) -> PathBuf {
        self.root.join(CONTENT_DIR)
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(PadError::Io)?;
        }
        Ok(())
    }
}

/// Write to a dot-prefixed temp file next to `target`, flush it to disk, then
/// rename over the target. Readers see either the old or the new file.
fn write_atomic(target: &Path, bytes: &[u8], tag: &str) -> Result<()> {
    let dir = target
        .parent()
        .ok_or_else(|| PadError::Store(format!("no parent for {}", target.display())))?;
    let tmp = dir.join(format!(".{}-{}.tmp", tag, Uuid::new_v4()));

    let written = (|| -> io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, target)
    })();

    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written.map_err(PadError::Io)
}

fn is_temp_file(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(".tmp")
}

fn sweep_dir(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }
    let mut removed = 0;
    for entry in fs::read_dir(dir).map_err(PadError::Io)? {
        let entry = entry.map_err(PadError::Io)?;
        let is_tmp = entry.file_name().to_str().is_some_and(is_temp_file);
        if is_tmp && entry.path().is_file() {
            fs::remove_file(entry.path()).map_err(PadError::Io)?;
            removed += 1;
        }
    }
    Ok(removed)
}

impl StorageBackend for FsBackend {
    fn load_index(&self) -> Result<IndexFile> {
        let content = match fs::read_to_string(self.index_path()) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(IndexFile::default()),
            Err(e) => return Err(PadError::Io(e)),
        };
        let index: IndexFile = serde_json::from_str(&content).map_err(PadError::Serialization)?;
        Ok(index)
    }

    fn save_index(&self, index: &IndexFile) -> Result<()> {
        self.ensure_dir(&self.root)?;
        let content = serde_json::to_string_pretty(index).map_err(PadError::Serialization)?;
        write_atomic(&self.index_path(), content.as_bytes(), "index")?;
        debug!(root = %self.root.display(), notes = index.notes.len(), "index saved");
        Ok(())
    }

    fn read_blob(&self, key: &NoteKey) -> Result<Option<Vec<u8>>> {
        match fs::read(self.blob_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PadError::Io(e)),
        }
    }

    fn write_blob(&self, key: &NoteKey, content: &[u8]) -> Result<()> {
        self.ensure_dir(&self.content_dir())?;
        write_atomic(&self.blob_path(key), content, "blob")
    }

    fn delete_blob(&self, key: &NoteKey) -> Result<()> {
        match fs::remove_file(self.blob_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PadError::Io(e)),
        }
    }

    fn list_blob_keys(&self) -> Result<Vec<NoteKey>> {
        let dir = self.content_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in fs::read_dir(&dir).map_err(PadError::Io)? {
            let entry = entry.map_err(PadError::Io)?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                if let Ok(id) = Uuid::parse_str(name) {
                    keys.push(NoteKey::from(id));
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn sweep_temp_files(&self) -> Result<usize> {
        Ok(sweep_dir(&self.root)? + sweep_dir(&self.content_dir())?)
    }

    fn blob_path(&self, key: &NoteKey) -> PathBuf {
        self.content_dir().join(key.to_string())
    }
}

/// One [`FsBackend`] per scope, each in `<data_dir>/<scope name>/`.
#[derive(Debug, Clone)]
pub struct FsProvider {
    data_dir: PathBuf,
}

impl FsProvider {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl BackendProvider for FsProvider {
    type Backend = FsBackend;

    fn open(&self, scope: &Scope) -> Result<FsBackend> {
        Ok(FsBackend::new(self.data_dir.join(scope.dir_name())))
    }

    fn known_scopes(&self) -> Result<Vec<Scope>> {
        if !self.data_dir.exists() {
            return Ok(Vec::new());
        }

        let mut scopes = Vec::new();
        for entry in fs::read_dir(&self.data_dir).map_err(PadError::Io)? {
            let entry = entry.map_err(PadError::Io)?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let has_state = path.join(INDEX_FILE).exists() || path.join(CONTENT_DIR).is_dir();
            let scope = entry.file_name().to_str().and_then(|n| n.parse::<Scope>().ok());
            if let (true, Some(scope)) = (has_state, scope) {
                scopes.push(scope);
            }
        }
        scopes.sort();
        Ok(scopes)
    }
}
