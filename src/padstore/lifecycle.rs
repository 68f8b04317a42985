//! # Note Lifecycle
//!
//! ```text
//!            pin / unpin
//!           ┌─────────┐
//!           ▼         │
//! create ─▶ Active ───┘ ──soft delete──▶ Deleted ──flush──▶ (gone)
//!             ▲                            │
//!             └──────────restore───────────┘
//! ```
//!
//! Pinned is a flag of Active. Soft delete clears it, restore brings a note back
//! unpinned and keeps its original `created_at`, so it lands where it was in the
//! regular ordering. At most [`PIN_CAP`] notes are pinned per scope.
//!
//! The transition functions are pure and return `Ok(None)` when the note is already
//! in the requested state; the `NoteStore` methods below apply them.

use crate::error::{PadError, Result};
use crate::model::{Note, NoteKey, NoteState};
use crate::store::{NotePatch, NoteStore, Outcome, StorageBackend};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Maximum simultaneously pinned notes per scope.
pub const PIN_CAP: usize = 5;

pub fn pin(state: &NoteState, pinned_in_scope: usize, now: DateTime<Utc>) -> Result<Option<NoteState>> {
    match state {
        NoteState::Deleted { .. } => Err(PadError::InvalidTransition(
            "cannot pin a deleted note, restore it first".to_string(),
        )),
        NoteState::Active { pinned_at: Some(_) } => Ok(None),
        NoteState::Active { pinned_at: None } if pinned_in_scope >= PIN_CAP => {
            Err(PadError::Capacity { cap: PIN_CAP })
        }
        NoteState::Active { pinned_at: None } => Ok(Some(NoteState::Active {
            pinned_at: Some(now),
        })),
    }
}

pub fn unpin(state: &NoteState) -> Result<Option<NoteState>> {
    match state {
        NoteState::Deleted { .. } => Err(PadError::InvalidTransition(
            "cannot unpin a deleted note".to_string(),
        )),
        NoteState::Active { pinned_at: None } => Ok(None),
        NoteState::Active { pinned_at: Some(_) } => Ok(Some(NoteState::active())),
    }
}

/// Active or pinned to deleted; the pin is dropped.
pub fn soft_delete(state: &NoteState, now: DateTime<Utc>) -> Option<NoteState> {
    match state {
        NoteState::Deleted { .. } => None,
        NoteState::Active { .. } => Some(NoteState::Deleted { deleted_at: now }),
    }
}

pub fn restore(state: &NoteState) -> Result<Option<NoteState>> {
    match state {
        NoteState::Deleted { .. } => Ok(Some(NoteState::active())),
        NoteState::Active { .. } => Err(PadError::InvalidTransition(
            "note is not deleted".to_string(),
        )),
    }
}

pub fn check_flushable(state: &NoteState) -> Result<()> {
    match state {
        NoteState::Deleted { .. } => Ok(()),
        NoteState::Active { .. } => Err(PadError::InvalidTransition(
            "only deleted notes can be flushed, delete it first".to_string(),
        )),
    }
}

impl<B: StorageBackend> NoteStore<B> {
    pub fn pin(&self, key: &NoteKey) -> Result<Outcome> {
        self.modify(key, |note, index, now| {
            let pinned = index.notes.values().filter(|n| n.is_pinned()).count();
            Ok(pin(&note.state, pinned, now)?.map(NotePatch::state))
        })
    }

    pub fn unpin(&self, key: &NoteKey) -> Result<Outcome> {
        self.modify(key, |note, _, _| Ok(unpin(&note.state)?.map(NotePatch::state)))
    }

    pub fn soft_delete(&self, key: &NoteKey) -> Result<Outcome> {
        self.modify(key, |note, _, now| {
            Ok(soft_delete(&note.state, now).map(NotePatch::state))
        })
    }

    pub fn restore(&self, key: &NoteKey) -> Result<Outcome> {
        self.modify(key, |note, _, _| Ok(restore(&note.state)?.map(NotePatch::state)))
    }

    /// Permanently remove a deleted note. Irreversible.
    pub fn flush(&self, key: &NoteKey) -> Result<Note> {
        let note = self.note(key)?;
        check_flushable(&note.state)?;
        self.remove(key)?;
        debug!(scope = %self.scope(), key = %key, "note flushed");
        Ok(note)
    }
}
