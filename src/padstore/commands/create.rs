use crate::commands::{CmdMessage, CmdResult};
use crate::dispatcher::{Dispatcher, Resolved};
use crate::error::Result;
use crate::model::Scope;
use crate::store::BackendProvider;

use super::helpers::entries_for;

/// Creates a note in `scope`. A blank title is derived from the content.
pub fn run<P: BackendProvider>(
    dispatcher: &mut Dispatcher<P>,
    scope: &Scope,
    title: &str,
    content: &[u8],
) -> Result<CmdResult> {
    let note = dispatcher.create_in(scope, content, title)?;
    let resolved = Resolved {
        scope: scope.clone(),
        key: note.key,
    };

    let mut result = CmdResult::default();
    result.affected = entries_for(dispatcher, &[resolved], false)?;
    let label = result
        .affected
        .first()
        .map(|dn| dn.index.to_string())
        .unwrap_or_else(|| note.key.to_string());
    result.add_message(CmdMessage::success(format!(
        "Created {}: {}",
        label, note.title
    )));
    Ok(result)
}
