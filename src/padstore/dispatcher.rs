//! # Dispatcher
//!
//! Owns one [`NoteStore`] per scope, opened lazily and cached for the lifetime of
//! the process, and routes scope-aware operations to the right one.
//!
//! ## Identifier Resolution
//!
//! [`Dispatcher::resolve`] turns any accepted identifier into a `(scope, key)` pair.
//! Plain indexes resolve against the current scope, scope-qualified ones against the
//! named scope, key prefixes against the current scope first and then every known
//! scope. An index with no note behind it is retried as a key prefix when it has
//! that shape and is at least [`MIN_FALLBACK_PREFIX`] characters long.
//! Indexes are computed from the listing at resolution time; commands
//! resolve all their targets before mutating anything.
//!
//! ## Opportunistic Discovery
//!
//! The first time a scope is read in a process, orphan discovery runs on it. Its
//! failures are logged and never reach the caller.
//!
//! ## Failure Isolation
//!
//! [`Dispatcher::list_all_scopes`] collects per-scope errors next to the successful
//! listings: one corrupt scope never hides the others.

use crate::discovery;
use crate::error::{PadError, Result};
use crate::index::{
    as_key_prefix, find_by_index, index_notes, match_prefix, DisplayIndex, DisplayNote, Identifier,
};
use crate::model::{Note, NoteKey, Scope};
use crate::store::{BackendProvider, ListFilter, NoteStore};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

/// Shortest index-shaped input retried as a key prefix. Shorter ones (`3`, `d1`)
/// would match keys in other scopes too easily.
pub const MIN_FALLBACK_PREFIX: usize = 4;

/// A fully resolved note address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Resolved {
    pub scope: Scope,
    pub key: NoteKey,
}

#[derive(Debug)]
pub struct ScopeError {
    pub scope: Scope,
    pub error: PadError,
}

#[derive(Debug, Default)]
pub struct ScopeListing {
    pub results: BTreeMap<Scope, Vec<DisplayNote>>,
    pub errors: Vec<ScopeError>,
}

pub struct Dispatcher<P: BackendProvider> {
    provider: P,
    stores: HashMap<Scope, NoteStore<P::Backend>>,
    discovered: HashSet<Scope>,
    discover_on_read: bool,
}

impl<P: BackendProvider> Dispatcher<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            stores: HashMap::new(),
            discovered: HashSet::new(),
            discover_on_read: true,
        }
    }

    pub fn with_discovery(mut self, enabled: bool) -> Self {
        self.discover_on_read = enabled;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn ensure_open(&mut self, scope: &Scope) -> Result<()> {
        if !self.stores.contains_key(scope) {
            let backend = self.provider.open(scope)?;
            debug!(%scope, "opened store");
            self.stores
                .insert(scope.clone(), NoteStore::new(scope.clone(), backend));
        }
        Ok(())
    }

    fn cached(&self, scope: &Scope) -> Result<&NoteStore<P::Backend>> {
        self.stores
            .get(scope)
            .ok_or_else(|| PadError::Store(format!("scope {} is not open", scope)))
    }

    /// The store of `scope` without running discovery on it.
    pub fn open(&mut self, scope: &Scope) -> Result<&NoteStore<P::Backend>> {
        self.ensure_open(scope)?;
        self.cached(scope)
    }

    /// The store of `scope`, with orphan discovery run once per process first.
    pub fn store(&mut self, scope: &Scope) -> Result<&NoteStore<P::Backend>> {
        self.ensure_open(scope)?;
        if self.discover_on_read && self.discovered.insert(scope.clone()) {
            let store = self.cached(scope)?;
            if let Err(e) = discovery::discover(store) {
                warn!(%scope, error = %e, "orphan discovery failed");
            }
        }
        self.cached(scope)
    }

    /// Scopes with persisted state plus any opened in this process.
    pub fn known_scopes(&self) -> Result<Vec<Scope>> {
        let mut scopes: BTreeSet<Scope> = self.provider.known_scopes()?.into_iter().collect();
        scopes.extend(self.stores.keys().cloned());
        Ok(scopes.into_iter().collect())
    }

    /// Every note of `scope` with its current display indexes.
    pub fn indexed(&mut self, scope: &Scope) -> Result<Vec<DisplayNote>> {
        let notes = self.store(scope)?.list(ListFilter::All)?;
        Ok(index_notes(notes))
    }

    pub fn create_in(&mut self, scope: &Scope, content: &[u8], title: &str) -> Result<Note> {
        self.store(scope)?.create(content, title)
    }

    pub fn resolve(&mut self, input: &str, current: &Scope) -> Result<Resolved> {
        match Identifier::parse(input)? {
            Identifier::Index(index) => match self.resolve_index(current, index) {
                // Digit-only key prefixes and ones like `d340` look like indexes.
                Err(PadError::NotFound(msg)) => match as_key_prefix(input) {
                    Some(prefix) if prefix.len() >= MIN_FALLBACK_PREFIX => {
                        match self.resolve_prefix(&prefix, current, input) {
                            Err(PadError::NotFound(_)) => Err(PadError::NotFound(msg)),
                            other => other,
                        }
                    }
                    _ => Err(PadError::NotFound(msg)),
                },
                other => other,
            },
            Identifier::Scoped {
                scope,
                index,
                prefix,
            } => {
                if scope == *current || self.known_scopes()?.contains(&scope) {
                    self.resolve_index(&scope, index)
                } else if let Some(prefix) = prefix {
                    self.resolve_prefix(&prefix, current, input)
                } else {
                    Err(PadError::NotFound(format!("scope {}", scope)))
                }
            }
            Identifier::KeyPrefix(prefix) => self.resolve_prefix(&prefix, current, input),
        }
    }

    fn resolve_index(&mut self, scope: &Scope, index: DisplayIndex) -> Result<Resolved> {
        let indexed = self.indexed(scope)?;
        find_by_index(&indexed, index)
            .map(|dn| Resolved {
                scope: scope.clone(),
                key: dn.note.key,
            })
            .ok_or_else(|| PadError::NotFound(format!("no note at {} in scope {}", index, scope)))
    }

    fn resolve_prefix(&mut self, prefix: &str, current: &Scope, input: &str) -> Result<Resolved> {
        let local = self.indexed(current)?;
        let local_hits = match_prefix(&local, prefix);
        match local_hits.len() {
            1 => {
                return Ok(Resolved {
                    scope: current.clone(),
                    key: local_hits[0].note.key,
                })
            }
            0 => {}
            count => {
                return Err(PadError::AmbiguousId {
                    input: input.to_string(),
                    count,
                })
            }
        }

        let mut found = Vec::new();
        for scope in self.known_scopes()? {
            if scope == *current {
                continue;
            }
            match self.indexed(&scope) {
                Ok(indexed) => found.extend(match_prefix(&indexed, prefix).into_iter().map(|dn| {
                    Resolved {
                        scope: scope.clone(),
                        key: dn.note.key,
                    }
                })),
                Err(e) => warn!(%scope, error = %e, "skipping unreadable scope during key lookup"),
            }
        }

        match found.len() {
            0 => Err(PadError::NotFound(format!("no note key starts with {}", prefix))),
            1 => Ok(found.remove(0)),
            count => Err(PadError::AmbiguousId {
                input: input.to_string(),
                count,
            }),
        }
    }

    pub fn get_across_scopes(&mut self, input: &str, current: &Scope) -> Result<(Note, Vec<u8>)> {
        let resolved = self.resolve(input, current)?;
        self.store(&resolved.scope)?.get(&resolved.key)
    }

    /// Listing of every known scope. Fails only when the scopes themselves cannot
    /// be enumerated.
    pub fn list_all_scopes(&mut self, filter: ListFilter) -> Result<ScopeListing> {
        let mut listing = ScopeListing::default();
        for scope in self.known_scopes()? {
            match self.indexed(&scope) {
                Ok(indexed) => {
                    let notes = indexed
                        .into_iter()
                        .filter(|dn| filter.accepts(&dn.note))
                        .collect();
                    listing.results.insert(scope, notes);
                }
                Err(error) => {
                    warn!(%scope, %error, "scope could not be listed");
                    listing.errors.push(ScopeError { scope, error });
                }
            }
        }
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::{MemBackend, MemProvider};
    use crate::store::StorageBackend;

    fn proj() -> Scope {
        Scope::Project("proj".to_string())
    }

    fn key(s: &str) -> NoteKey {
        s.parse().unwrap()
    }

    #[test]
    fn index_one_in_empty_scope_is_not_found() {
        let mut d = Dispatcher::new(MemProvider::new());
        assert!(matches!(d.resolve("1", &proj()), Err(PadError::NotFound(_))));

        let note = d.create_in(&proj(), b"hello", "Hello").unwrap();
        let resolved = d.resolve("1", &proj()).unwrap();
        assert_eq!(resolved, Resolved { scope: proj(), key: note.key });
    }

    #[test]
    fn plain_indexes_stay_in_current_scope() {
        let mut d = Dispatcher::new(MemProvider::new());
        d.create_in(&Scope::Global, b"g", "G").unwrap();
        assert!(d.resolve("1", &proj()).is_err());
    }

    #[test]
    fn scope_qualified_identifiers_route_to_named_scope() {
        let mut d = Dispatcher::new(MemProvider::new());
        let note = d.create_in(&proj(), b"in proj", "P").unwrap();
        d.store(&proj()).unwrap().pin(&note.key).unwrap();

        let resolved = d.resolve("proj-p1", &Scope::Global).unwrap();
        assert_eq!(resolved.scope, proj());
        assert_eq!(resolved.key, note.key);

        let (fetched, content) = d.get_across_scopes("proj-1", &Scope::Global).unwrap();
        assert_eq!(fetched.key, note.key);
        assert_eq!(content, b"in proj");

        assert!(matches!(
            d.resolve("nowhere-1", &Scope::Global),
            Err(PadError::NotFound(_))
        ));
    }

    #[test]
    fn key_prefix_resolves_across_scopes() {
        let mut d = Dispatcher::new(MemProvider::new());
        let note = d.create_in(&proj(), b"x", "X").unwrap();
        d.create_in(&Scope::Global, b"y", "Y").unwrap();

        let full = note.key.to_string();
        let resolved = d.resolve(&full[..13], &Scope::Global).unwrap();
        assert_eq!(resolved, Resolved { scope: proj(), key: note.key });

        // Full keys whose tail looks like an index still resolve as keys.
        assert_eq!(d.resolve(&full, &Scope::Global).unwrap().key, note.key);
    }

    #[test]
    fn key_prefix_matches_deleted_notes() {
        let mut d = Dispatcher::new(MemProvider::new());
        let note = d.create_in(&proj(), b"x", "X").unwrap();
        d.store(&proj()).unwrap().soft_delete(&note.key).unwrap();

        let prefix = &note.key.to_string()[..13];
        assert_eq!(d.resolve(prefix, &proj()).unwrap().key, note.key);
        assert_eq!(d.resolve("d1", &proj()).unwrap().key, note.key);
    }

    #[test]
    fn ambiguous_prefix_is_an_error() {
        let backend = MemBackend::new();
        backend
            .write_blob(&key("aaaaaaaa-0000-4000-8000-000000000001"), b"one")
            .unwrap();
        backend
            .write_blob(&key("aaaaaaaa-0000-4000-8000-000000000002"), b"two")
            .unwrap();
        let mut d = Dispatcher::new(MemProvider::new().with_scope(proj(), backend));

        assert!(matches!(
            d.resolve("aaaaaaaa", &proj()),
            Err(PadError::AmbiguousId { count: 2, .. })
        ));
        assert!(matches!(d.resolve("bbbb", &proj()), Err(PadError::NotFound(_))));
        assert_eq!(
            d.resolve("aaaaaaaa-0000-4000-8000-000000000002", &proj())
                .unwrap()
                .key,
            key("aaaaaaaa-0000-4000-8000-000000000002")
        );
    }

    #[test]
    fn index_shaped_key_prefix_falls_back_to_key_lookup() {
        let backend = MemBackend::new();
        backend
            .write_blob(&key("12345678-0000-4000-8000-000000000001"), b"digits")
            .unwrap();
        backend
            .write_blob(&key("d3400000-0000-4000-8000-000000000002"), b"deleted-ish")
            .unwrap();
        let mut d = Dispatcher::new(MemProvider::new().with_scope(proj(), backend));

        assert_eq!(
            d.resolve("1234", &proj()).unwrap().key,
            key("12345678-0000-4000-8000-000000000001")
        );
        assert_eq!(
            d.resolve("d340", &proj()).unwrap().key,
            key("d3400000-0000-4000-8000-000000000002")
        );

        // A live index still wins over a key prefix.
        let first = d.resolve("1", &proj()).unwrap();
        assert_eq!(first.key, d.indexed(&proj()).unwrap()[0].note.key);

        assert!(matches!(d.resolve("999", &proj()), Err(PadError::NotFound(_))));
    }

    #[test]
    fn short_missing_index_does_not_reach_into_other_scopes() {
        let global = MemBackend::new();
        global
            .write_blob(&key("30000000-0000-4000-8000-000000000003"), b"elsewhere")
            .unwrap();
        let mut d = Dispatcher::new(MemProvider::new().with_scope(Scope::Global, global));
        d.create_in(&proj(), b"only", "Only").unwrap();

        assert!(matches!(d.resolve("3", &proj()), Err(PadError::NotFound(_))));
        assert_eq!(
            d.resolve("3000", &proj()).unwrap(),
            Resolved {
                scope: Scope::Global,
                key: key("30000000-0000-4000-8000-000000000003"),
            }
        );
    }

    #[test]
    fn discovery_runs_before_first_read() {
        let backend = MemBackend::new();
        backend.write_blob(&NoteKey::new(), b"Lost note").unwrap();
        let mut d = Dispatcher::new(MemProvider::new().with_scope(proj(), backend));

        let indexed = d.indexed(&proj()).unwrap();
        assert_eq!(indexed.len(), 1);
        assert_eq!(indexed[0].note.title, "Lost note");
    }

    #[test]
    fn discovery_can_be_disabled() {
        let backend = MemBackend::new();
        backend.write_blob(&NoteKey::new(), b"Lost note").unwrap();
        let mut d = Dispatcher::new(MemProvider::new().with_scope(proj(), backend)).with_discovery(false);

        assert!(d.indexed(&proj()).unwrap().is_empty());
    }

    #[test]
    fn discovery_failure_does_not_block_reads() {
        let seeded = NoteStore::new(proj(), MemBackend::new());
        let note = seeded.create(b"kept", "Kept").unwrap();
        seeded.backend.set_simulate_list_error(true);
        let mut d = Dispatcher::new(MemProvider::new().with_scope(proj(), seeded.backend));

        let indexed = d.indexed(&proj()).unwrap();
        assert_eq!(indexed.len(), 1);
        assert_eq!(indexed[0].note.key, note.key);
        assert_eq!(d.resolve("1", &proj()).unwrap().key, note.key);
    }

    #[test]
    fn list_all_scopes_isolates_corrupt_scope() {
        let broken = MemBackend::new();
        broken.set_simulate_corrupt_index(true);
        let broken_scope = Scope::Project("broken".to_string());
        let mut d = Dispatcher::new(MemProvider::new().with_scope(broken_scope.clone(), broken));
        d.create_in(&proj(), b"a", "A").unwrap();
        d.create_in(&Scope::Global, b"b", "B").unwrap();

        let listing = d.list_all_scopes(ListFilter::Active).unwrap();
        assert_eq!(listing.results.len(), 2);
        assert_eq!(listing.results[&proj()].len(), 1);
        assert_eq!(listing.errors.len(), 1);
        assert_eq!(listing.errors[0].scope, broken_scope);
    }

    #[test]
    fn stores_are_cached_per_scope() {
        let mut d = Dispatcher::new(MemProvider::new());
        d.create_in(&proj(), b"a", "A").unwrap();
        // A second open would hand out an empty MemBackend.
        assert_eq!(d.store(&proj()).unwrap().list(ListFilter::All).unwrap().len(), 1);
    }
}
