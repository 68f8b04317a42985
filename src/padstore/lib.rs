//! # Padstore Architecture
//!
//! Padstore is a **UI-agnostic scratch-pad library**: notes scoped to the project
//! you are standing in, or to a global scope, addressed by short display indexes.
//! The `pad` binary is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, renders text or JSON, sets exit codes  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, normalizes inputs             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Business logic, batch semantics, structured CmdResult    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Dispatcher (dispatcher.rs)                                 │
//! │  - One NoteStore per scope, identifier resolution           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - StorageBackend trait: FsBackend, MemBackend              │
//! │  - NoteStore: index + content blobs of one scope            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Keys and Indexes
//!
//! A note has a stable [`model::NoteKey`] (a UUID, never reused) and, in every
//! listing, a transient [`index::DisplayIndex`] (`1`, `p1`, `d1`) recomputed on each
//! call. The two are different types on purpose: indexes drift between invocations,
//! keys never do.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr, never exits the
//! process and never assumes a terminal. Diagnostics go through `tracing`; the
//! library never installs a subscriber.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Business logic for each command
//! - [`dispatcher`]: Per-scope store cache and identifier resolution
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Core data types (`Note`, `NoteKey`, `NoteState`, `Scope`)
//! - [`index`]: Display indexes and the identifier grammar
//! - [`scope`]: Scope detection from a working directory
//! - [`lifecycle`]: Pin/delete/restore/flush transitions
//! - [`discovery`]: Orphan recovery and `doctor`
//! - [`search`]: Ranked search
//! - [`duration`]: Duration strings for time windows
//! - [`peek`]: Content previews
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod discovery;
pub mod dispatcher;
pub mod duration;
pub mod error;
pub mod index;
pub mod lifecycle;
pub mod model;
pub mod peek;
pub mod scope;
pub mod search;
pub mod store;
