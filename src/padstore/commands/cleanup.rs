use crate::commands::{CmdMessage, CmdResult};
use crate::dispatcher::{Dispatcher, Resolved};
use crate::error::Result;
use crate::index::DisplayIndex;
use crate::model::Scope;
use crate::store::BackendProvider;
use chrono::{Duration, Utc};

use super::helpers::{deleted_targets, entries_for, run_selected, select_targets};

/// Ages out a scope in two steps. Deleted notes whose deletion is older than
/// `purge_after` are flushed, then unpinned active notes created before
/// `stale_after` are soft-deleted. Notes deleted by this run are never flushed by it.
pub fn run<P: BackendProvider>(
    dispatcher: &mut Dispatcher<P>,
    scope: &Scope,
    stale_after: Duration,
    purge_after: Duration,
) -> Result<CmdResult> {
    let now = Utc::now();
    let purge_cutoff = now - purge_after;
    let stale_cutoff = now - stale_after;

    let purge = deleted_targets(dispatcher, scope, |deleted_at| deleted_at < purge_cutoff)?;
    let stale = select_targets(dispatcher, scope, |dn| {
        matches!(dn.index, DisplayIndex::Regular(_))
            && !dn.note.is_pinned()
            && dn.note.created_at < stale_cutoff
    })?;

    // Flushed entries vanish from the listing, so they are captured first.
    let purge_keys: Vec<Resolved> = purge.iter().map(|t| t.resolved.clone()).collect();
    let before = entries_for(dispatcher, &purge_keys, false)?;

    let (mut result, flushed) = run_selected(dispatcher, purge, |store, target| {
        store.flush(&target.resolved.key)?;
        Ok(None)
    });
    let (stale_result, deleted) = run_selected(dispatcher, stale, |store, target| {
        store.soft_delete(&target.resolved.key)?;
        Ok(None)
    });
    result.targets += stale_result.targets;
    result.failures.extend(stale_result.failures);

    result.affected = before
        .into_iter()
        .filter(|dn| flushed.iter().any(|r| r.key == dn.note.key))
        .collect();
    result
        .affected
        .extend(entries_for(dispatcher, &deleted, false)?);

    if result.targets == 0 {
        result.add_message(CmdMessage::info("Nothing to clean up."));
    } else {
        result.add_message(CmdMessage::success(format!(
            "Flushed {} and deleted {} notes in scope {}.",
            flushed.len(),
            deleted.len(),
            scope
        )));
    }
    Ok(result)
}
