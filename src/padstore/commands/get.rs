use crate::commands::{CmdMessage, CmdResult, ScopedNotes};
use crate::dispatcher::Dispatcher;
use crate::error::{Result, TargetFailure};
use crate::model::Scope;
use crate::store::{BackendProvider, ListFilter};

/// Lists `scope`. Pinned notes appear twice, once as `pN` and once with their
/// regular index.
pub fn run<P: BackendProvider>(
    dispatcher: &mut Dispatcher<P>,
    scope: &Scope,
    filter: ListFilter,
) -> Result<CmdResult> {
    let notes = dispatcher
        .indexed(scope)?
        .into_iter()
        .filter(|dn| filter.accepts(&dn.note))
        .collect();
    Ok(CmdResult::default().with_listed(notes))
}

/// Lists every known scope. Unreadable scopes become warnings and never hide the
/// others.
pub fn run_all_scopes<P: BackendProvider>(
    dispatcher: &mut Dispatcher<P>,
    filter: ListFilter,
) -> Result<CmdResult> {
    let listing = dispatcher.list_all_scopes(filter)?;
    let mut result = CmdResult::default();

    for (scope, notes) in listing.results {
        result.scoped.push(ScopedNotes { scope, notes });
    }
    for failed in listing.errors {
        result.add_message(CmdMessage::warning(format!(
            "Scope {} could not be read: {}",
            failed.scope, failed.error
        )));
        result.scope_errors.push(TargetFailure {
            target: failed.scope.to_string(),
            error: failed.error,
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DisplayIndex;
    use crate::store::mem_backend::{MemBackend, MemProvider};

    fn proj() -> Scope {
        Scope::Project("proj".to_string())
    }

    #[test]
    fn active_listing_shows_pinned_twice() {
        let mut d = Dispatcher::new(MemProvider::new());
        let a = d.create_in(&proj(), b"a", "A").unwrap();
        d.create_in(&proj(), b"b", "B").unwrap();
        d.store(&proj()).unwrap().pin(&a.key).unwrap();

        let result = run(&mut d, &proj(), ListFilter::Active).unwrap();
        let indexes: Vec<String> = result.listed.iter().map(|dn| dn.index.to_string()).collect();
        assert_eq!(indexes, vec!["p1", "1", "2"]);
        assert_eq!(result.listed[2].note.title, "A");
    }

    #[test]
    fn deleted_filter_lists_only_deleted() {
        let mut d = Dispatcher::new(MemProvider::new());
        let a = d.create_in(&proj(), b"a", "A").unwrap();
        d.create_in(&proj(), b"b", "B").unwrap();
        d.store(&proj()).unwrap().soft_delete(&a.key).unwrap();

        let result = run(&mut d, &proj(), ListFilter::Deleted).unwrap();
        assert_eq!(result.listed.len(), 1);
        assert_eq!(result.listed[0].index, DisplayIndex::Deleted(1));

        let active = run(&mut d, &proj(), ListFilter::Active).unwrap();
        assert_eq!(active.listed.len(), 1);
        assert_eq!(active.listed[0].note.title, "B");
    }

    #[test]
    fn all_scopes_reports_broken_scope_as_warning() {
        let broken = MemBackend::new();
        broken.set_simulate_corrupt_index(true);
        let broken_scope = Scope::Project("broken".to_string());
        let mut d = Dispatcher::new(MemProvider::new().with_scope(broken_scope, broken));
        d.create_in(&proj(), b"a", "A").unwrap();

        let result = run_all_scopes(&mut d, ListFilter::Active).unwrap();
        assert_eq!(result.scoped.len(), 1);
        assert_eq!(result.scoped[0].scope, proj());
        assert_eq!(result.scope_errors.len(), 1);
        assert_eq!(result.scope_errors[0].target, "broken");
        assert!(result.messages[0].content.contains("broken"));
        assert!(!result.has_failures());
    }
}
