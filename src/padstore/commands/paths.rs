use crate::commands::CmdResult;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::model::Scope;
use crate::store::BackendProvider;

use super::helpers::run_batch;

/// Location of each identified note's content blob.
pub fn run<P: BackendProvider, I: AsRef<str>>(
    dispatcher: &mut Dispatcher<P>,
    scope: &Scope,
    ids: &[I],
) -> Result<CmdResult> {
    let mut paths = Vec::new();
    let (mut result, _) = run_batch(dispatcher, scope, ids, |store, target| {
        paths.push(store.content_path(&target.resolved.key));
        Ok(None)
    });
    result.paths = paths;
    Ok(result)
}
