use super::backend::StorageBackend;
use super::{IndexFile, ListFilter, NotePatch, Outcome};
use crate::error::{PadError, Result};
use crate::model::{title_from_content, Note, NoteKey, Scope};
use chrono::{DateTime, Duration, Utc};
use std::path::PathBuf;
use tracing::{debug, warn};

pub const UNTITLED: &str = "Untitled";

/// Durable state of one scope.
pub struct NoteStore<B: StorageBackend> {
    scope: Scope,
    /// The underlying storage backend.
    /// Exposed as pub(crate) for discovery and tests.
    pub(crate) backend: B,
}

impl<B: StorageBackend> NoteStore<B> {
    pub fn new(scope: Scope, backend: B) -> Self {
        Self { scope, backend }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Load the index, stamping every record with this store's scope.
    pub(crate) fn load_index(&self) -> Result<IndexFile> {
        let mut index = self.backend.load_index()?;
        for note in index.notes.values_mut() {
            note.scope = self.scope.clone();
        }
        Ok(index)
    }

    pub(crate) fn save_index(&self, index: &IndexFile) -> Result<()> {
        self.backend.save_index(index)
    }

    pub fn create(&self, content: &[u8], title: &str) -> Result<Note> {
        let mut index = self.load_index()?;
        let now = next_timestamp(&index);
        let title = resolve_title(title, content);
        let note = Note::new(self.scope.clone(), title, content, now);

        // Content first: a failure here leaves nothing behind in the index.
        self.backend.write_blob(&note.key, content)?;
        index.notes.insert(note.key, note.clone());
        if let Err(e) = self.save_index(&index) {
            self.restore_blob(&note.key, None);
            return Err(e);
        }

        debug!(scope = %self.scope, key = %note.key, size = note.size, "note created");
        Ok(note)
    }

    /// Metadata only. The index is authoritative: a blob without an entry is not a note.
    pub fn note(&self, key: &NoteKey) -> Result<Note> {
        let index = self.load_index()?;
        index
            .notes
            .get(key)
            .cloned()
            .ok_or_else(|| PadError::NotFound(format!("note {} in scope {}", key, self.scope)))
    }

    pub fn get(&self, key: &NoteKey) -> Result<(Note, Vec<u8>)> {
        let note = self.note(key)?;
        let content = self.content(key)?;
        Ok((note, content))
    }

    /// Raw content of a note known to the index.
    pub fn content(&self, key: &NoteKey) -> Result<Vec<u8>> {
        self.backend.read_blob(key)?.ok_or_else(|| {
            PadError::NotFound(format!(
                "content of note {} in scope {} is missing (run doctor)",
                key, self.scope
            ))
        })
    }

    pub fn update(&self, key: &NoteKey, patch: NotePatch) -> Result<Note> {
        let mut patch = patch;
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                let derived = match &patch.content {
                    Some(content) => resolve_title("", content),
                    None => resolve_title("", &self.content(key)?),
                };
                patch.title = Some(derived);
            }
        }
        self.modify(key, |_, _, _| Ok(Some(patch)))
            .map(Outcome::into_note)
    }

    /// Load, decide, apply. `decide` sees the current record, the whole index and the
    /// timestamp this change would carry, and returns `None` for a no-op.
    pub(crate) fn modify<F>(&self, key: &NoteKey, decide: F) -> Result<Outcome>
    where
        F: FnOnce(&Note, &IndexFile, DateTime<Utc>) -> Result<Option<NotePatch>>,
    {
        let mut index = self.load_index()?;
        let current = index
            .notes
            .get(key)
            .cloned()
            .ok_or_else(|| PadError::NotFound(format!("note {} in scope {}", key, self.scope)))?;
        let now = next_timestamp(&index);

        let patch = match decide(&current, &index, now)? {
            Some(patch) => patch,
            None => return Ok(Outcome::Unchanged(current)),
        };

        let mut note = current;
        let mut previous = None;
        if let Some(content) = &patch.content {
            previous = Some(self.backend.read_blob(key)?);
            self.backend.write_blob(key, content)?;
            note.set_content_stats(content);
        }
        if let Some(title) = patch.title {
            note.title = title.trim().to_string();
        }
        if let Some(state) = patch.state {
            note.state = state;
        }
        note.updated_at = now;

        index.notes.insert(*key, note.clone());
        if let Err(e) = self.save_index(&index) {
            if let Some(previous) = previous {
                self.restore_blob(key, previous);
            }
            return Err(e);
        }
        debug!(scope = %self.scope, key = %key, "note updated");
        Ok(Outcome::Changed(note))
    }

    /// Notes matching `filter`, newest creation first.
    pub fn list(&self, filter: ListFilter) -> Result<Vec<Note>> {
        let index = self.load_index()?;
        let mut notes: Vec<Note> = index
            .notes
            .into_values()
            .filter(|n| filter.accepts(n))
            .collect();
        notes.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.key.cmp(&b.key))
        });
        Ok(notes)
    }

    /// Hard delete of metadata and content. Removing an absent key succeeds.
    pub fn remove(&self, key: &NoteKey) -> Result<()> {
        let mut index = self.load_index()?;
        if index.notes.remove(key).is_some() {
            self.save_index(&index)?;
        }
        self.backend.delete_blob(key)?;
        debug!(scope = %self.scope, key = %key, "note removed");
        Ok(())
    }

    /// Puts a blob back the way it was before a write whose index save failed.
    /// `None` means the blob did not exist. Rollback failures are logged, the
    /// original error is what the caller sees.
    fn restore_blob(&self, key: &NoteKey, previous: Option<Vec<u8>>) {
        let rollback = match &previous {
            Some(content) => self.backend.write_blob(key, content),
            None => self.backend.delete_blob(key),
        };
        if let Err(e) = rollback {
            warn!(scope = %self.scope, key = %key, error = %e, "could not roll back content after failed index write");
        }
    }

    pub fn content_path(&self, key: &NoteKey) -> PathBuf {
        self.backend.blob_path(key)
    }
}

fn resolve_title(title: &str, content: &[u8]) -> String {
    let title = title.trim();
    if !title.is_empty() {
        return title.to_string();
    }
    title_from_content(content).unwrap_or_else(|| UNTITLED.to_string())
}

/// A timestamp strictly newer than every creation, pin and deletion stamp in the
/// index, so orderings derived from them never tie.
pub(crate) fn next_timestamp(index: &IndexFile) -> DateTime<Utc> {
    let now = Utc::now();
    let latest = index
        .notes
        .values()
        .flat_map(|n| [Some(n.created_at), n.pinned_at(), n.deleted_at()])
        .flatten()
        .max();
    match latest {
        Some(latest) if latest >= now => latest + Duration::microseconds(1),
        _ => now,
    }
}
