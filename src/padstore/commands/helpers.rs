use crate::commands::{CmdMessage, CmdResult};
use crate::dispatcher::{Dispatcher, Resolved};
use crate::error::{Result, TargetFailure};
use crate::index::{DisplayIndex, DisplayNote};
use crate::model::Scope;
use crate::store::{BackendProvider, NoteStore};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A resolved target, remembering how the user wrote it.
#[derive(Debug, Clone)]
pub struct Target {
    pub input: String,
    pub resolved: Resolved,
}

/// Resolves every input against the current listings before anything is mutated.
/// Inputs naming a note already targeted are dropped.
pub fn resolve_targets<P: BackendProvider, I: AsRef<str>>(
    dispatcher: &mut Dispatcher<P>,
    scope: &Scope,
    inputs: &[I],
) -> (Vec<Target>, Vec<TargetFailure>) {
    let mut targets: Vec<Target> = Vec::new();
    let mut failures = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        match dispatcher.resolve(input, scope) {
            Ok(resolved) => {
                if !targets.iter().any(|t| t.resolved == resolved) {
                    targets.push(Target {
                        input: input.to_string(),
                        resolved,
                    });
                }
            }
            Err(error) => failures.push(TargetFailure {
                target: input.to_string(),
                error,
            }),
        }
    }

    (targets, failures)
}

/// Runs `op` on each target's store independently. Failures are recorded in
/// `result`; the targets that succeeded are returned in input order.
pub fn apply_to_targets<P, F>(
    dispatcher: &mut Dispatcher<P>,
    targets: Vec<Target>,
    result: &mut CmdResult,
    mut op: F,
) -> Vec<Resolved>
where
    P: BackendProvider,
    F: FnMut(&NoteStore<P::Backend>, &Target) -> Result<Option<CmdMessage>>,
{
    let mut done = Vec::new();
    for target in targets {
        let outcome = dispatcher
            .store(&target.resolved.scope)
            .and_then(|store| op(store, &target));
        match outcome {
            Ok(message) => {
                result.messages.extend(message);
                done.push(target.resolved);
            }
            Err(error) => result.failures.push(TargetFailure {
                target: target.input,
                error,
            }),
        }
    }
    done
}

/// Resolve-then-apply for commands taking a list of identifiers. Inputs naming the
/// same note count once.
pub fn run_batch<P, I, F>(
    dispatcher: &mut Dispatcher<P>,
    scope: &Scope,
    inputs: &[I],
    op: F,
) -> (CmdResult, Vec<Resolved>)
where
    P: BackendProvider,
    I: AsRef<str>,
    F: FnMut(&NoteStore<P::Backend>, &Target) -> Result<Option<CmdMessage>>,
{
    let (targets, failures) = resolve_targets(dispatcher, scope, inputs);
    let mut result = CmdResult {
        targets: targets.len() + failures.len(),
        failures,
        ..Default::default()
    };
    let done = apply_to_targets(dispatcher, targets, &mut result, op);
    (result, done)
}

/// Listing entries of `scope` accepted by `pick`, labelled by their display index.
pub fn select_targets<P, F>(
    dispatcher: &mut Dispatcher<P>,
    scope: &Scope,
    pick: F,
) -> Result<Vec<Target>>
where
    P: BackendProvider,
    F: Fn(&DisplayNote) -> bool,
{
    let targets = dispatcher
        .indexed(scope)?
        .into_iter()
        .filter(|dn| pick(dn))
        .map(|dn| Target {
            input: dn.index.to_string(),
            resolved: Resolved {
                scope: scope.clone(),
                key: dn.note.key,
            },
        })
        .collect();
    Ok(targets)
}

/// Every deleted note of `scope` whose deletion time satisfies `keep`, labelled by
/// its `dN` index.
pub fn deleted_targets<P, F>(
    dispatcher: &mut Dispatcher<P>,
    scope: &Scope,
    keep: F,
) -> Result<Vec<Target>>
where
    P: BackendProvider,
    F: Fn(DateTime<Utc>) -> bool,
{
    select_targets(dispatcher, scope, |dn| {
        matches!(dn.index, DisplayIndex::Deleted(_)) && dn.note.deleted_at().is_some_and(&keep)
    })
}

/// Runs `op` over targets selected by a window rather than typed by the user.
pub fn run_selected<P, F>(
    dispatcher: &mut Dispatcher<P>,
    targets: Vec<Target>,
    op: F,
) -> (CmdResult, Vec<Resolved>)
where
    P: BackendProvider,
    F: FnMut(&NoteStore<P::Backend>, &Target) -> Result<Option<CmdMessage>>,
{
    let mut result = CmdResult {
        targets: targets.len(),
        ..Default::default()
    };
    let done = apply_to_targets(dispatcher, targets, &mut result, op);
    (result, done)
}

/// Fresh display entries for notes after a mutation. With `prefer_pinned`, pinned
/// notes are returned with their `pN` entry.
pub fn entries_for<P: BackendProvider>(
    dispatcher: &mut Dispatcher<P>,
    resolved: &[Resolved],
    prefer_pinned: bool,
) -> Result<Vec<DisplayNote>> {
    let mut listings: HashMap<Scope, Vec<DisplayNote>> = HashMap::new();
    let mut entries = Vec::new();

    for r in resolved {
        if !listings.contains_key(&r.scope) {
            listings.insert(r.scope.clone(), dispatcher.indexed(&r.scope)?);
        }
        let Some(indexed) = listings.get(&r.scope) else {
            continue;
        };

        let mut candidates = indexed.iter().filter(|dn| dn.note.key == r.key);
        let entry = if prefer_pinned {
            let all: Vec<&DisplayNote> = candidates.collect();
            all.iter()
                .find(|dn| matches!(dn.index, DisplayIndex::Pinned(_)))
                .or_else(|| all.first())
                .map(|dn| (*dn).clone())
        } else {
            candidates
                .find(|dn| !matches!(dn.index, DisplayIndex::Pinned(_)))
                .cloned()
        };
        entries.extend(entry);
    }

    Ok(entries)
}
