//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single entry
//! point for every padstore operation, whatever the UI.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Dispatches** to the appropriate command function
//! - **Normalizes inputs** (duration strings, literal vs regex queries)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no business logic (that lives in `commands/*.rs`) and no I/O beyond the
//! stores it owns.
//!
//! ## Identifiers
//!
//! Every method taking `ids` accepts the full identifier grammar: `N`, `pN`, `dN`,
//! `<scope>-<index>` and key prefixes. See [`crate::index`].
//!
//! ## Generic Over BackendProvider
//!
//! `PadApi<P: BackendProvider>` is generic over where scopes live:
//! - Production: `PadApi<FsProvider>`
//! - Testing: `PadApi<MemProvider>`

use crate::commands::{self, flush::FlushTarget, restore::RestoreTarget, CmdResult};
use crate::config::PadConfig;
use crate::dispatcher::Dispatcher;
use crate::duration::parse_duration;
use crate::error::Result;
use crate::model::Scope;
use crate::search::Query;
use crate::store::fs_backend::FsProvider;
use crate::store::{BackendProvider, ListFilter};

pub struct PadApi<P: BackendProvider> {
    dispatcher: Dispatcher<P>,
}

impl PadApi<FsProvider> {
    /// Filesystem-backed API rooted at the configured data directory.
    pub fn from_config(config: &PadConfig) -> Result<Self> {
        let provider = FsProvider::new(config.data_dir()?);
        let dispatcher = Dispatcher::new(provider).with_discovery(config.discover_on_read);
        Ok(Self::new(dispatcher))
    }
}

impl<P: BackendProvider> PadApi<P> {
    pub fn new(dispatcher: Dispatcher<P>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&mut self) -> &mut Dispatcher<P> {
        &mut self.dispatcher
    }

    pub fn create_note(&mut self, scope: &Scope, title: &str, content: &[u8]) -> Result<CmdResult> {
        commands::create::run(&mut self.dispatcher, scope, title, content)
    }

    pub fn list_notes(&mut self, scope: &Scope, filter: ListFilter) -> Result<CmdResult> {
        commands::get::run(&mut self.dispatcher, scope, filter)
    }

    pub fn list_all_scopes(&mut self, filter: ListFilter) -> Result<CmdResult> {
        commands::get::run_all_scopes(&mut self.dispatcher, filter)
    }

    pub fn view_notes<I: AsRef<str>>(
        &mut self,
        scope: &Scope,
        ids: &[I],
        peek_lines: Option<usize>,
    ) -> Result<CmdResult> {
        commands::view::run(&mut self.dispatcher, scope, ids, peek_lines)
    }

    pub fn update_note(
        &mut self,
        scope: &Scope,
        id: &str,
        title: Option<&str>,
        content: Option<Vec<u8>>,
    ) -> Result<CmdResult> {
        commands::update::run(&mut self.dispatcher, scope, id, title, content)
    }

    pub fn delete_notes<I: AsRef<str>>(&mut self, scope: &Scope, ids: &[I]) -> Result<CmdResult> {
        commands::delete::run(&mut self.dispatcher, scope, ids)
    }

    pub fn pin_notes<I: AsRef<str>>(&mut self, scope: &Scope, ids: &[I]) -> Result<CmdResult> {
        commands::pinning::pin(&mut self.dispatcher, scope, ids)
    }

    pub fn unpin_notes<I: AsRef<str>>(&mut self, scope: &Scope, ids: &[I]) -> Result<CmdResult> {
        commands::pinning::unpin(&mut self.dispatcher, scope, ids)
    }

    pub fn restore_notes<I: AsRef<str>>(&mut self, scope: &Scope, ids: &[I]) -> Result<CmdResult> {
        let ids = ids.iter().map(|id| id.as_ref().to_string()).collect();
        commands::restore::run(&mut self.dispatcher, scope, RestoreTarget::Ids(ids))
    }

    /// Restores every note deleted within `window` (e.g. `"2h"`, `"3d"`).
    pub fn restore_newer_than(&mut self, scope: &Scope, window: &str) -> Result<CmdResult> {
        let window = parse_duration(window)?;
        commands::restore::run(&mut self.dispatcher, scope, RestoreTarget::NewerThan(window))
    }

    pub fn flush_notes<I: AsRef<str>>(&mut self, scope: &Scope, ids: &[I]) -> Result<CmdResult> {
        let ids = ids.iter().map(|id| id.as_ref().to_string()).collect();
        commands::flush::run(&mut self.dispatcher, scope, FlushTarget::Ids(ids))
    }

    /// Flushes every note deleted longer ago than `window`.
    pub fn flush_older_than(&mut self, scope: &Scope, window: &str) -> Result<CmdResult> {
        let window = parse_duration(window)?;
        commands::flush::run(&mut self.dispatcher, scope, FlushTarget::OlderThan(window))
    }

    pub fn flush_all(&mut self, scope: &Scope) -> Result<CmdResult> {
        commands::flush::run(&mut self.dispatcher, scope, FlushTarget::AllDeleted)
    }

    pub fn search_notes(
        &mut self,
        scope: &Scope,
        query: &str,
        regex: bool,
        include_deleted: bool,
    ) -> Result<CmdResult> {
        let query = build_query(query, regex)?;
        commands::search::run(&mut self.dispatcher, scope, &query, include_deleted)
    }

    pub fn search_all_scopes(
        &mut self,
        query: &str,
        regex: bool,
        include_deleted: bool,
    ) -> Result<CmdResult> {
        let query = build_query(query, regex)?;
        commands::search::run_all_scopes(&mut self.dispatcher, &query, include_deleted)
    }

    /// Soft-deletes every active note of `scope`.
    pub fn nuke(&mut self, scope: &Scope) -> Result<CmdResult> {
        commands::nuke::run(&mut self.dispatcher, scope)
    }

    /// `stale_after` and `purge_after` are duration strings such as `"30d"`.
    pub fn cleanup(&mut self, scope: &Scope, stale_after: &str, purge_after: &str) -> Result<CmdResult> {
        let stale_after = parse_duration(stale_after)?;
        let purge_after = parse_duration(purge_after)?;
        commands::cleanup::run(&mut self.dispatcher, scope, stale_after, purge_after)
    }

    pub fn note_paths<I: AsRef<str>>(&mut self, scope: &Scope, ids: &[I]) -> Result<CmdResult> {
        commands::paths::run(&mut self.dispatcher, scope, ids)
    }

    pub fn doctor(&mut self, scope: &Scope) -> Result<CmdResult> {
        commands::doctor::run(&mut self.dispatcher, scope)
    }
}

fn build_query(query: &str, regex: bool) -> Result<Query> {
    if regex {
        Query::regex(query)
    } else {
        Query::literal(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PadError;
    use crate::index::DisplayIndex;
    use crate::store::mem_backend::MemProvider;

    fn make_api() -> PadApi<MemProvider> {
        PadApi::new(Dispatcher::new(MemProvider::new()))
    }

    fn proj() -> Scope {
        Scope::Project("proj".to_string())
    }

    #[test]
    fn create_and_list_dispatch() {
        let mut api = make_api();
        api.create_note(&proj(), "Title", b"body").unwrap();

        let result = api.list_notes(&proj(), ListFilter::Active).unwrap();
        assert_eq!(result.listed.len(), 1);
        assert_eq!(result.listed[0].index, DisplayIndex::Regular(1));
    }

    #[test]
    fn window_arguments_are_parsed() {
        let mut api = make_api();
        assert!(matches!(
            api.flush_older_than(&proj(), "soon"),
            Err(PadError::InvalidFormat(_))
        ));
        assert_eq!(api.flush_older_than(&proj(), "7d").unwrap().targets, 0);
        assert_eq!(api.restore_newer_than(&proj(), "1h").unwrap().targets, 0);
    }

    #[test]
    fn delete_restore_flush_round() {
        let mut api = make_api();
        api.create_note(&proj(), "A", b"a").unwrap();
        api.delete_notes(&proj(), &["1"]).unwrap();
        api.restore_notes(&proj(), &["d1"]).unwrap();
        assert_eq!(api.list_notes(&proj(), ListFilter::Active).unwrap().listed.len(), 1);

        api.delete_notes(&proj(), &["1"]).unwrap();
        let result = api.flush_all(&proj()).unwrap();
        assert_eq!(result.succeeded(), 1);
        assert!(api.list_notes(&proj(), ListFilter::All).unwrap().listed.is_empty());
    }

    #[test]
    fn nuke_and_cleanup_dispatch() {
        let mut api = make_api();
        api.create_note(&proj(), "A", b"a").unwrap();
        api.create_note(&proj(), "B", b"b").unwrap();

        assert!(matches!(
            api.cleanup(&proj(), "whenever", "7d"),
            Err(PadError::InvalidFormat(_))
        ));
        assert_eq!(api.cleanup(&proj(), "30d", "7d").unwrap().targets, 0);

        assert_eq!(api.nuke(&proj()).unwrap().succeeded(), 2);
        assert!(api.list_notes(&proj(), ListFilter::Active).unwrap().listed.is_empty());
        assert_eq!(api.list_notes(&proj(), ListFilter::Deleted).unwrap().listed.len(), 2);
    }

    #[test]
    fn search_all_scopes_dispatch() {
        let mut api = make_api();
        api.create_note(&proj(), "needle here", b"").unwrap();
        api.create_note(&Scope::Global, "needle there", b"").unwrap();

        assert_eq!(api.search_all_scopes("needle", false, false).unwrap().hits.len(), 2);
        assert_eq!(api.search_notes(&proj(), "needle", false, false).unwrap().hits.len(), 1);
    }

    #[test]
    fn search_query_kinds() {
        let mut api = make_api();
        api.create_note(&proj(), "a+b", b"").unwrap();

        assert_eq!(api.search_notes(&proj(), "a+b", false, false).unwrap().hits.len(), 1);
        assert!(api.search_notes(&proj(), "a+b", true, false).unwrap().hits.is_empty());
        assert!(matches!(
            api.search_notes(&proj(), "(", true, false),
            Err(PadError::InvalidFormat(_))
        ));
    }
}
