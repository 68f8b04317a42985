use crate::commands::{CmdMessage, CmdResult};
use crate::dispatcher::{Dispatcher, Resolved};
use crate::error::Result;
use crate::model::Scope;
use crate::store::{BackendProvider, NoteStore, StorageBackend};
use chrono::{Duration, Utc};

use super::helpers::{deleted_targets, entries_for, resolve_targets, run_selected, Target};

/// Which deleted notes to remove for good.
#[derive(Debug, Clone)]
pub enum FlushTarget {
    Ids(Vec<String>),
    /// Every deleted note whose deletion is older than `Duration`.
    OlderThan(Duration),
    AllDeleted,
}

/// Permanently removes deleted notes. Flushing an active note is refused; window
/// flushes that find nothing succeed with zero targets.
pub fn run<P: BackendProvider>(
    dispatcher: &mut Dispatcher<P>,
    scope: &Scope,
    target: FlushTarget,
) -> Result<CmdResult> {
    let (targets, failures) = match target {
        FlushTarget::Ids(ids) => resolve_targets(dispatcher, scope, &ids[..]),
        FlushTarget::OlderThan(window) => {
            let cutoff = Utc::now() - window;
            let targets = deleted_targets(dispatcher, scope, |deleted_at| deleted_at < cutoff)?;
            (targets, Vec::new())
        }
        FlushTarget::AllDeleted => (deleted_targets(dispatcher, scope, |_| true)?, Vec::new()),
    };

    // Entries are gone once flushed, so they are captured beforehand.
    let resolved: Vec<Resolved> = targets.iter().map(|t| t.resolved.clone()).collect();
    let before = entries_for(dispatcher, &resolved, false)?;

    let mut unresolved = failures;
    let (mut result, done) = run_selected(dispatcher, targets, flush_one::<P::Backend>);
    result.targets += unresolved.len();
    unresolved.append(&mut result.failures);
    result.failures = unresolved;

    if result.targets == 0 {
        result.add_message(CmdMessage::info("Nothing to flush."));
    }
    result.affected = before
        .into_iter()
        .filter(|dn| {
            done.iter()
                .any(|r| r.key == dn.note.key && r.scope == dn.note.scope)
        })
        .collect();
    Ok(result)
}

fn flush_one<B: StorageBackend>(store: &NoteStore<B>, target: &Target) -> Result<Option<CmdMessage>> {
    let note = store.flush(&target.resolved.key)?;
    Ok(Some(CmdMessage::success(format!(
        "Flushed {}: {}",
        target.input, note.title
    ))))
}
