use crate::commands::{CmdMessage, CmdResult};
use crate::dispatcher::Dispatcher;
use crate::error::{PadError, Result, TargetFailure};
use crate::index::{DisplayIndex, DisplayNote};
use crate::model::Scope;
use crate::search::{rank, Query};
use crate::store::{BackendProvider, ListFilter};
use tracing::warn;

/// Ranked search over the notes of `scope`. Deleted notes are only considered
/// with `include_deleted`. Hits carry their plain-listing index.
pub fn run<P: BackendProvider>(
    dispatcher: &mut Dispatcher<P>,
    scope: &Scope,
    query: &Query,
    include_deleted: bool,
) -> Result<CmdResult> {
    let indexed = dispatcher.indexed(scope)?;
    let mut candidates = Vec::new();
    collect_candidates(dispatcher, scope, indexed, include_deleted, &mut candidates)?;

    let mut result = CmdResult::default();
    result.hits = rank(candidates, query);
    no_hits_message(&mut result, query);
    Ok(result)
}

/// Ranked search over every known scope at once. Hits keep the index they have in
/// their own scope; unreadable scopes become warnings.
pub fn run_all_scopes<P: BackendProvider>(
    dispatcher: &mut Dispatcher<P>,
    query: &Query,
    include_deleted: bool,
) -> Result<CmdResult> {
    let filter = if include_deleted {
        ListFilter::All
    } else {
        ListFilter::Active
    };
    let listing = dispatcher.list_all_scopes(filter)?;
    let mut result = CmdResult::default();

    let mut candidates = Vec::new();
    for (scope, notes) in listing.results {
        if let Err(error) =
            collect_candidates(dispatcher, &scope, notes, include_deleted, &mut candidates)
        {
            listing_failure(&mut result, scope, error);
        }
    }
    for failed in listing.errors {
        listing_failure(&mut result, failed.scope, failed.error);
    }

    result.hits = rank(candidates, query);
    no_hits_message(&mut result, query);
    Ok(result)
}

fn collect_candidates<P: BackendProvider>(
    dispatcher: &mut Dispatcher<P>,
    scope: &Scope,
    indexed: Vec<DisplayNote>,
    include_deleted: bool,
    candidates: &mut Vec<(DisplayNote, Vec<u8>)>,
) -> Result<()> {
    let store = dispatcher.store(scope)?;
    for dn in indexed {
        match dn.index {
            DisplayIndex::Pinned(_) => continue,
            DisplayIndex::Deleted(_) if !include_deleted => continue,
            _ => {}
        }
        let content = match store.content(&dn.note.key) {
            Ok(content) => content,
            Err(e) => {
                warn!(key = %dn.note.key, error = %e, "searching title only");
                Vec::new()
            }
        };
        candidates.push((dn, content));
    }
    Ok(())
}

fn listing_failure(result: &mut CmdResult, scope: Scope, error: PadError) {
    result.add_message(CmdMessage::warning(format!(
        "Scope {} could not be searched: {}",
        scope, error
    )));
    result.scope_errors.push(TargetFailure {
        target: scope.to_string(),
        error,
    });
}

fn no_hits_message(result: &mut CmdResult, query: &Query) {
    if result.hits.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "No notes match \"{}\".",
            query.as_str()
        )));
    }
}
