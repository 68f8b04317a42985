use crate::commands::{CmdMessage, CmdResult};
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::model::Scope;
use crate::store::{BackendProvider, NotePatch};

use super::helpers::entries_for;

/// Changes the title and/or content of one note. A blank title is re-derived from
/// the (new) content.
pub fn run<P: BackendProvider>(
    dispatcher: &mut Dispatcher<P>,
    scope: &Scope,
    id: &str,
    title: Option<&str>,
    content: Option<Vec<u8>>,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if title.is_none() && content.is_none() {
        result.add_message(CmdMessage::info("Nothing to update."));
        return Ok(result);
    }

    let resolved = dispatcher.resolve(id, scope)?;
    let patch = NotePatch {
        title: title.map(str::to_string),
        content,
        state: None,
    };
    let note = dispatcher.store(&resolved.scope)?.update(&resolved.key, patch)?;

    result.affected = entries_for(dispatcher, &[resolved], false)?;
    result.add_message(CmdMessage::success(format!("Updated {}: {}", id, note.title)));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PadError;
    use crate::store::mem_backend::MemProvider;

    #[test]
    fn updates_title_and_content() {
        let mut d = Dispatcher::new(MemProvider::new());
        let note = d.create_in(&Scope::Global, b"old", "Old").unwrap();

        let result = run(
            &mut d,
            &Scope::Global,
            "1",
            Some("New"),
            Some(b"new body".to_vec()),
        )
        .unwrap();
        assert_eq!(result.affected[0].note.title, "New");

        let (fetched, content) = d.store(&Scope::Global).unwrap().get(&note.key).unwrap();
        assert_eq!(fetched.title, "New");
        assert_eq!(content, b"new body");
        assert_eq!(fetched.size, 8);
    }

    #[test]
    fn content_only_keeps_title() {
        let mut d = Dispatcher::new(MemProvider::new());
        d.create_in(&Scope::Global, b"old", "Keep").unwrap();

        let result = run(&mut d, &Scope::Global, "1", None, Some(b"x".to_vec())).unwrap();
        assert_eq!(result.affected[0].note.title, "Keep");
    }

    #[test]
    fn unknown_target_is_not_found() {
        let mut d = Dispatcher::new(MemProvider::new());
        let err = run(&mut d, &Scope::Global, "3", Some("t"), None).unwrap_err();
        assert!(matches!(err, PadError::NotFound(_)));
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let mut d = Dispatcher::new(MemProvider::new());
        let result = run(&mut d, &Scope::Global, "1", None, None).unwrap();
        assert!(result.affected.is_empty());
        assert_eq!(result.messages.len(), 1);
    }
}
