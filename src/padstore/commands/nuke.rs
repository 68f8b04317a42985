use crate::commands::{CmdMessage, CmdResult};
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::index::DisplayIndex;
use crate::model::Scope;
use crate::store::BackendProvider;

use super::helpers::{entries_for, run_selected, select_targets};

/// Soft-deletes every active note of `scope`, pinned ones included. The notes stay
/// restorable until flushed.
pub fn run<P: BackendProvider>(dispatcher: &mut Dispatcher<P>, scope: &Scope) -> Result<CmdResult> {
    let targets = select_targets(dispatcher, scope, |dn| {
        matches!(dn.index, DisplayIndex::Regular(_))
    })?;

    let (mut result, done) = run_selected(dispatcher, targets, |store, target| {
        store.soft_delete(&target.resolved.key)?;
        Ok(None)
    });

    if result.targets == 0 {
        result.add_message(CmdMessage::info(format!("No notes in scope {}.", scope)));
    } else if result.succeeded() > 0 {
        result.add_message(CmdMessage::success(format!(
            "Deleted {} notes in scope {}.",
            result.succeeded(),
            scope
        )));
    }
    result.affected = entries_for(dispatcher, &done, false)?;
    Ok(result)
}
