use crate::commands::{CmdMessage, CmdResult};
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::model::Scope;
use crate::store::BackendProvider;

use super::helpers::{entries_for, run_batch};

pub fn pin<P: BackendProvider, I: AsRef<str>>(
    dispatcher: &mut Dispatcher<P>,
    scope: &Scope,
    ids: &[I],
) -> Result<CmdResult> {
    pin_state(dispatcher, scope, ids, true)
}

pub fn unpin<P: BackendProvider, I: AsRef<str>>(
    dispatcher: &mut Dispatcher<P>,
    scope: &Scope,
    ids: &[I],
) -> Result<CmdResult> {
    pin_state(dispatcher, scope, ids, false)
}

fn pin_state<P: BackendProvider, I: AsRef<str>>(
    dispatcher: &mut Dispatcher<P>,
    scope: &Scope,
    ids: &[I],
    pinned: bool,
) -> Result<CmdResult> {
    let (mut result, done) = run_batch(dispatcher, scope, ids, |store, target| {
        let key = &target.resolved.key;
        let outcome = if pinned {
            store.pin(key)?
        } else {
            store.unpin(key)?
        };

        let verb = if pinned { "Pinned" } else { "Unpinned" };
        let title = &outcome.note().title;
        Ok(Some(if outcome.is_changed() {
            CmdMessage::success(format!("{} {}: {}", verb, target.input, title))
        } else {
            CmdMessage::info(format!("Already {} {}: {}", verb.to_lowercase(), target.input, title))
        }))
    });

    // Pinned notes are reported with their pN index.
    result.affected = entries_for(dispatcher, &done, pinned)?;
    Ok(result)
}
