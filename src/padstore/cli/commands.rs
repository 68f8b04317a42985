//! # CLI Layer
//!
//! This module is **one possible UI client** for padstore. It is the only place
//! that knows about stdout/stderr, exit codes and argument parsing.
//!
//! ## Structure
//!
//! - `run()`: Main dispatch logic (called by `main.rs`)
//! - `init_context()`: Loads configuration, resolves the scope, builds the API
//! - `handle_*()`: Per-command handlers that call the API
//! - `confirm()`: Interactive yes/no prompt for destructive commands
//! - `finish()`: Renders a `CmdResult` as text or JSON and reports whether every
//!   target succeeded

use super::print::{
    print_failures, print_full_notes, print_hits, print_messages, print_notes, print_scoped,
};
use super::setup::{Cli, Commands, OutputFormat};
use anyhow::{bail, Context, Result};
use padstore::api::PadApi;
use padstore::commands::CmdResult;
use padstore::index::DisplayIndex;
use padstore::config::PadConfig;
use padstore::model::Scope;
use padstore::scope::ScopeResolver;
use padstore::store::fs_backend::FsProvider;
use padstore::store::ListFilter;
use std::io::{BufRead, IsTerminal, Read, Write};

/// Presentation choices taken from the command line.
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub verbose: bool,
}

/// Default windows for `cleanup`, from the configuration.
struct CleanupDefaults {
    stale_after: String,
    purge_after: String,
}

struct AppContext {
    api: PadApi<FsProvider>,
    scope: Scope,
    peek_lines: usize,
    cleanup: CleanupDefaults,
    output: OutputOptions,
}

/// Runs the parsed command. `Ok(false)` means some targets failed.
pub fn run(cli: Cli) -> Result<bool> {
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Create { title, content }) => handle_create(&mut ctx, title, content),
        Some(Commands::List {
            deleted,
            all,
            all_scopes,
        }) => handle_list(&mut ctx, deleted, all, all_scopes),
        Some(Commands::View { ids, peek }) => handle_view(&mut ctx, ids, peek),
        Some(Commands::Update { id, title, content }) => {
            handle_update(&mut ctx, id, title, content)
        }
        Some(Commands::Pin { ids }) => {
            let result = ctx.api.pin_notes(&ctx.scope, &ids)?;
            finish(&ctx, result, |_| {})
        }
        Some(Commands::Unpin { ids }) => {
            let result = ctx.api.unpin_notes(&ctx.scope, &ids)?;
            finish(&ctx, result, |_| {})
        }
        Some(Commands::Delete { ids }) => {
            let result = ctx.api.delete_notes(&ctx.scope, &ids)?;
            finish(&ctx, result, |_| {})
        }
        Some(Commands::Restore { ids, newer_than }) => handle_restore(&mut ctx, ids, newer_than),
        Some(Commands::Flush {
            ids,
            older_than,
            all,
        }) => handle_flush(&mut ctx, ids, older_than, all),
        Some(Commands::Search {
            query,
            regex,
            deleted,
            all_scopes,
        }) => {
            let result = if all_scopes {
                ctx.api.search_all_scopes(&query, regex, deleted)?
            } else {
                ctx.api.search_notes(&ctx.scope, &query, regex, deleted)?
            };
            finish(&ctx, result, |r| print_hits(&r.hits, all_scopes))
        }
        Some(Commands::Nuke { yes }) => handle_nuke(&mut ctx, yes),
        Some(Commands::Cleanup {
            stale_after,
            purge_after,
        }) => {
            let stale_after = stale_after.unwrap_or_else(|| ctx.cleanup.stale_after.clone());
            let purge_after = purge_after.unwrap_or_else(|| ctx.cleanup.purge_after.clone());
            let result = ctx.api.cleanup(&ctx.scope, &stale_after, &purge_after)?;
            finish(&ctx, result, |_| {})
        }
        Some(Commands::Path { ids }) => {
            let result = ctx.api.note_paths(&ctx.scope, &ids)?;
            finish(&ctx, result, |r| {
                for path in &r.paths {
                    println!("{}", path.display());
                }
            })
        }
        Some(Commands::Doctor) => {
            let result = ctx.api.doctor(&ctx.scope)?;
            finish(&ctx, result, |_| {})
        }
        None => handle_list(&mut ctx, false, false, false),
    }
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let config = PadConfig::load().context("failed to load configuration")?;

    let scope = if cli.global {
        Scope::Global
    } else {
        let cwd = std::env::current_dir().context("cannot read the working directory")?;
        ScopeResolver::new(config.repo_markers.clone()).resolve(&cwd)
    };

    let api = PadApi::from_config(&config)?;
    Ok(AppContext {
        api,
        scope,
        peek_lines: config.peek_lines,
        cleanup: CleanupDefaults {
            stale_after: config.cleanup_stale_after.clone(),
            purge_after: config.cleanup_purge_after.clone(),
        },
        output: OutputOptions {
            format: cli.format,
            verbose: cli.verbose,
        },
    })
}

fn finish<F: FnOnce(&CmdResult)>(ctx: &AppContext, result: CmdResult, show: F) -> Result<bool> {
    let ok = !result.has_failures();
    match ctx.output.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => {
            show(&result);
            if ctx.output.verbose && !result.affected.is_empty() {
                print_notes(&result.affected);
            }
            print_messages(&result.messages);
            print_failures(&result);
        }
    }
    Ok(ok)
}

fn read_content(content: Option<String>) -> Result<Vec<u8>> {
    if let Some(content) = content {
        return Ok(content.into_bytes());
    }
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(Vec::new());
    }
    let mut buf = Vec::new();
    stdin
        .read_to_end(&mut buf)
        .context("failed to read content from stdin")?;
    Ok(buf)
}

fn handle_create(ctx: &mut AppContext, title: Option<String>, content: Option<String>) -> Result<bool> {
    let content = read_content(content)?;
    let result = ctx
        .api
        .create_note(&ctx.scope, title.as_deref().unwrap_or(""), &content)?;
    finish(ctx, result, |_| {})
}

fn handle_list(ctx: &mut AppContext, deleted: bool, all: bool, all_scopes: bool) -> Result<bool> {
    let filter = match (deleted, all) {
        (_, true) => ListFilter::All,
        (true, false) => ListFilter::Deleted,
        (false, false) => ListFilter::Active,
    };

    if all_scopes {
        let result = ctx.api.list_all_scopes(filter)?;
        // Unreadable scopes are reported as warnings, not as failed targets.
        return finish(ctx, result, |r| print_scoped(&r.scoped));
    }

    let result = ctx.api.list_notes(&ctx.scope, filter)?;
    finish(ctx, result, |r| print_notes(&r.listed))
}

fn handle_view(ctx: &mut AppContext, ids: Vec<String>, peek: bool) -> Result<bool> {
    let peek_lines = peek.then_some(ctx.peek_lines);
    let result = ctx.api.view_notes(&ctx.scope, &ids, peek_lines)?;
    finish(ctx, result, |r| print_full_notes(&r.viewed))
}

fn handle_update(
    ctx: &mut AppContext,
    id: String,
    title: Option<String>,
    content: Option<String>,
) -> Result<bool> {
    let content = content.map(String::into_bytes);
    let result = ctx
        .api
        .update_note(&ctx.scope, &id, title.as_deref(), content)?;
    finish(ctx, result, |_| {})
}

fn handle_restore(ctx: &mut AppContext, ids: Vec<String>, newer_than: Option<String>) -> Result<bool> {
    let result = match newer_than {
        Some(window) => ctx.api.restore_newer_than(&ctx.scope, &window)?,
        None => ctx.api.restore_notes(&ctx.scope, &ids)?,
    };
    finish(ctx, result, |_| {})
}

fn handle_flush(
    ctx: &mut AppContext,
    ids: Vec<String>,
    older_than: Option<String>,
    all: bool,
) -> Result<bool> {
    let result = match (older_than, all) {
        (_, true) => ctx.api.flush_all(&ctx.scope)?,
        (Some(window), false) => ctx.api.flush_older_than(&ctx.scope, &window)?,
        (None, false) => ctx.api.flush_notes(&ctx.scope, &ids)?,
    };
    finish(ctx, result, |_| {})
}

fn handle_nuke(ctx: &mut AppContext, yes: bool) -> Result<bool> {
    if !yes {
        if matches!(ctx.output.format, OutputFormat::Json) || !std::io::stdin().is_terminal() {
            bail!("nuke asks for confirmation; pass --yes to run it non-interactively");
        }
        let count = ctx
            .api
            .list_notes(&ctx.scope, ListFilter::Active)?
            .listed
            .iter()
            .filter(|dn| matches!(dn.index, DisplayIndex::Regular(_)))
            .count();
        if count > 0 && !confirm(&format!("Delete all {} notes in scope {}?", count, ctx.scope))? {
            println!("Cancelled.");
            return Ok(true);
        }
    }
    let result = ctx.api.nuke(&ctx.scope)?;
    finish(ctx, result, |_| {})
}

fn confirm(question: &str) -> Result<bool> {
    eprint!("{} [y/N] ", question);
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
