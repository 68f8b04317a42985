use crate::commands::{CmdMessage, CmdResult};
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::model::Scope;
use crate::store::{BackendProvider, NoteStore, StorageBackend};
use chrono::{Duration, Utc};

use super::helpers::{deleted_targets, entries_for, run_batch, run_selected, Target};

/// Which deleted notes to bring back.
#[derive(Debug, Clone)]
pub enum RestoreTarget {
    Ids(Vec<String>),
    /// Every deleted note whose deletion happened within the last `Duration`.
    NewerThan(Duration),
}

/// Restored notes come back unpinned and take their place in the active listing by
/// creation time.
pub fn run<P: BackendProvider>(
    dispatcher: &mut Dispatcher<P>,
    scope: &Scope,
    target: RestoreTarget,
) -> Result<CmdResult> {
    let (mut result, done) = match target {
        RestoreTarget::Ids(ids) => run_batch(dispatcher, scope, &ids[..], restore_one::<P::Backend>),
        RestoreTarget::NewerThan(window) => {
            let cutoff = Utc::now() - window;
            let targets = deleted_targets(dispatcher, scope, |deleted_at| deleted_at >= cutoff)?;
            run_selected(dispatcher, targets, restore_one::<P::Backend>)
        }
    };

    if result.targets == 0 {
        result.add_message(CmdMessage::info("Nothing to restore."));
    }
    result.affected = entries_for(dispatcher, &done, false)?;
    Ok(result)
}

fn restore_one<B: StorageBackend>(
    store: &NoteStore<B>,
    target: &Target,
) -> Result<Option<CmdMessage>> {
    let note = store.restore(&target.resolved.key)?.into_note();
    Ok(Some(CmdMessage::success(format!(
        "Restored {}: {}",
        target.input, note.title
    ))))
}
