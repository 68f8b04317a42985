use crate::commands::{CmdMessage, CmdResult};
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::model::Scope;
use crate::store::BackendProvider;

use super::helpers::{entries_for, run_batch};

/// Soft-deletes every identified note. Pinned notes lose their pin; already
/// deleted notes are left as they are.
pub fn run<P: BackendProvider, I: AsRef<str>>(
    dispatcher: &mut Dispatcher<P>,
    scope: &Scope,
    ids: &[I],
) -> Result<CmdResult> {
    let (mut result, done) = run_batch(dispatcher, scope, ids, |store, target| {
        let outcome = store.soft_delete(&target.resolved.key)?;
        let title = &outcome.note().title;
        Ok(Some(if outcome.is_changed() {
            CmdMessage::success(format!("Deleted {}: {}", target.input, title))
        } else {
            CmdMessage::info(format!("Already deleted {}: {}", target.input, title))
        }))
    });

    result.affected = entries_for(dispatcher, &done, false)?;
    Ok(result)
}
