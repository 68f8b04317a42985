//! # Discovery and Repair
//!
//! The index and the content directory can drift apart: a crash between writing a
//! blob and saving the index, or a file dropped into the content directory by hand,
//! leaves an *orphan* blob the index does not know about.
//!
//! [`discover`] adopts orphans: each gets a synthesized record titled after its
//! first non-blank line. It only ever adds records, so running it again without a
//! filesystem change leaves the index untouched. The dispatcher runs it before
//! reads and swallows its errors.
//!
//! [`doctor`] is the explicit, heavier pass: discovery, then removal of index
//! entries whose blob is gone (zombies), refresh of size/checksum that disagree with
//! the blob, and cleanup of temp files left by interrupted writes.

use crate::error::Result;
use crate::model::{title_from_content, Note, NoteKey};
use crate::store::note_store::next_timestamp;
use crate::store::{NoteStore, StorageBackend};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, warn};

pub const RECOVERED_TITLE: &str = "Untitled (recovered)";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryReport {
    pub recovered: Vec<NoteKey>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorReport {
    pub recovered: usize,
    pub zombies_removed: usize,
    pub stats_refreshed: usize,
    pub temp_files_removed: usize,
}

impl DoctorReport {
    pub fn is_clean(&self) -> bool {
        *self == DoctorReport::default()
    }
}

pub fn discover<B: StorageBackend>(store: &NoteStore<B>) -> Result<DiscoveryReport> {
    let mut index = store.load_index()?;
    let mut report = DiscoveryReport::default();

    for key in store.backend.list_blob_keys()? {
        if index.notes.contains_key(&key) {
            continue;
        }
        let content = match store.backend.read_blob(&key) {
            Ok(Some(content)) => content,
            Ok(None) => continue,
            Err(e) => {
                warn!(scope = %store.scope(), key = %key, error = %e, "skipping unreadable orphan");
                continue;
            }
        };

        let title = title_from_content(&content).unwrap_or_else(|| RECOVERED_TITLE.to_string());
        let mut note = Note::new(store.scope().clone(), title, &content, next_timestamp(&index));
        note.key = key;

        info!(scope = %store.scope(), key = %key, title = %note.title, "recovered orphaned note");
        index.notes.insert(key, note);
        report.recovered.push(key);
    }

    if !report.recovered.is_empty() {
        store.save_index(&index)?;
    }
    Ok(report)
}

pub fn doctor<B: StorageBackend>(store: &NoteStore<B>) -> Result<DoctorReport> {
    let mut report = DoctorReport {
        recovered: discover(store)?.recovered.len(),
        ..Default::default()
    };

    let mut index = store.load_index()?;
    let blobs: BTreeSet<NoteKey> = store.backend.list_blob_keys()?.into_iter().collect();
    let keys: Vec<NoteKey> = index.notes.keys().copied().collect();
    let mut changed = false;

    for key in keys {
        let content = if blobs.contains(&key) {
            store.backend.read_blob(&key)?
        } else {
            None
        };

        match content {
            None => {
                index.notes.remove(&key);
                report.zombies_removed += 1;
                changed = true;
                info!(scope = %store.scope(), key = %key, "removed index entry without content");
            }
            Some(content) => {
                if let Some(note) = index.notes.get_mut(&key) {
                    let before = (note.size, note.checksum.clone());
                    note.set_content_stats(&content);
                    if before != (note.size, note.checksum.clone()) {
                        report.stats_refreshed += 1;
                        changed = true;
                    }
                }
            }
        }
    }

    if changed {
        store.save_index(&index)?;
    }
    report.temp_files_removed = store.backend.sweep_temp_files()?;
    Ok(report)
}
