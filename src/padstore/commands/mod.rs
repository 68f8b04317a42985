//! # Command Layer
//!
//! This module contains the business logic of every user-facing operation. Each
//! command lives in its own submodule as plain functions over a
//! [`Dispatcher`](crate::dispatcher::Dispatcher).
//!
//! ## What Commands Do NOT Do
//!
//! - **Any I/O** beyond the stores: no stdout, stderr, colors or terminal concerns
//! - **Argument parsing**: That's the CLI layer's job
//! - **Exit codes**: Return `Result`, let the caller decide
//!
//! ## Structured Returns
//!
//! Commands return [`CmdResult`], not strings. Notes are always returned as
//! [`DisplayNote`] so clients receive them with their current display index.
//!
//! ## Batch Semantics
//!
//! Commands taking several identifiers resolve all of them first, against the
//! listing as it is before anything changes, then process each target on its own.
//! A failing target lands in [`CmdResult::failures`] and the rest carry on. There is
//! no rollback. [`CmdResult::into_result`] turns failures into
//! [`PadError::PartialBatch`] for callers that want an error value.
//!
//! ## Command Modules
//!
//! - [`create`]: Create a note
//! - [`get`]: List notes of one scope or of all scopes
//! - [`view`]: Retrieve note content, optionally as a peek
//! - [`update`]: Change title and/or content
//! - [`delete`]: Soft-delete notes
//! - [`pinning`]: Pin/unpin notes
//! - [`restore`]: Bring deleted notes back
//! - [`flush`]: Permanently remove deleted notes
//! - [`nuke`]: Soft-delete everything in a scope
//! - [`cleanup`]: Age out stale notes and old deletions
//! - [`search`]: Ranked search, in one scope or across all of them
//! - [`paths`]: Filesystem paths to content blobs
//! - [`doctor`]: Verify and repair a scope
//! - [`helpers`]: Target resolution shared by the batch commands

use crate::discovery::DoctorReport;
use crate::error::{PadError, Result, TargetFailure};
use crate::index::DisplayNote;
use crate::model::Scope;
use crate::peek::Peek;
use crate::search::SearchHit;
use serde::{Serialize, Serializer};
use std::path::PathBuf;

pub mod cleanup;
pub mod create;
pub mod delete;
pub mod doctor;
pub mod flush;
pub mod get;
pub mod helpers;
pub mod nuke;
pub mod paths;
pub mod pinning;
pub mod restore;
pub mod search;
pub mod update;
pub mod view;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

fn lossy<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

/// A note together with its content, as returned by `view`.
#[derive(Debug, Clone, Serialize)]
pub struct ViewedNote {
    #[serde(flatten)]
    pub entry: DisplayNote,
    #[serde(serialize_with = "lossy")]
    pub content: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peek: Option<Peek>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScopedNotes {
    pub scope: Scope,
    pub notes: Vec<DisplayNote>,
}

#[derive(Debug, Default, Serialize)]
pub struct CmdResult {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub affected: Vec<DisplayNote>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub listed: Vec<DisplayNote>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scoped: Vec<ScopedNotes>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub viewed: Vec<ViewedNote>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hits: Vec<SearchHit>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<DoctorReport>,
    pub messages: Vec<CmdMessage>,
    /// Number of targets a batch command was asked to process.
    #[serde(skip_serializing_if = "is_zero")]
    pub targets: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<TargetFailure>,
    /// Scopes that could not be read during an all-scopes listing or search.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scope_errors: Vec<TargetFailure>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_listed(mut self, notes: Vec<DisplayNote>) -> Self {
        self.listed = notes;
        self
    }

    pub fn succeeded(&self) -> usize {
        self.targets.saturating_sub(self.failures.len())
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// `Err(PartialBatch)` when any target failed.
    pub fn into_result(self) -> Result<CmdResult> {
        if self.failures.is_empty() {
            return Ok(self);
        }
        Err(PadError::PartialBatch {
            total: self.targets,
            failures: self.failures,
        })
    }
}
