use crate::commands::{CmdResult, ViewedNote};
use crate::dispatcher::{Dispatcher, Resolved};
use crate::error::Result;
use crate::model::Scope;
use crate::peek::peek;
use crate::store::BackendProvider;
use std::collections::HashMap;

use super::helpers::{entries_for, run_batch};

/// Content of each identified note. With `peek_lines`, a preview of the opening
/// and closing lines is attached as well.
pub fn run<P: BackendProvider, I: AsRef<str>>(
    dispatcher: &mut Dispatcher<P>,
    scope: &Scope,
    ids: &[I],
    peek_lines: Option<usize>,
) -> Result<CmdResult> {
    let mut contents: HashMap<Resolved, Vec<u8>> = HashMap::new();
    let (mut result, done) = run_batch(dispatcher, scope, ids, |store, target| {
        let content = store.content(&target.resolved.key)?;
        contents.insert(target.resolved.clone(), content);
        Ok(None)
    });

    for entry in entries_for(dispatcher, &done, false)? {
        let resolved = Resolved {
            scope: entry.note.scope.clone(),
            key: entry.note.key,
        };
        let Some(content) = contents.remove(&resolved) else {
            continue;
        };
        let preview = peek_lines.map(|lines| peek(&content, lines));
        result.viewed.push(ViewedNote {
            entry,
            content,
            peek: preview,
        });
    }

    Ok(result)
}
