use chrono::{DateTime, Utc};
use colored::Colorize;
use padstore::commands::{CmdMessage, CmdResult, MessageLevel, ScopedNotes, ViewedNote};
use padstore::error::TargetFailure;
use padstore::index::{DisplayIndex, DisplayNote};
use padstore::search::{MatchSegment, SearchHit};
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const PIN_MARKER: &str = "⚲";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

/// One line per failed target, then how many succeeded.
pub(super) fn print_failures(result: &CmdResult) {
    if !result.has_failures() {
        return;
    }
    for failure in &result.failures {
        eprintln!("{}", failure_line(failure).red());
    }
    eprintln!("{}", summary_line(result));
}

fn failure_line(failure: &TargetFailure) -> String {
    format!("{}: {}", failure.target, failure.error)
}

fn summary_line(result: &CmdResult) -> String {
    format!("{} of {} targets succeeded", result.succeeded(), result.targets)
}

pub(super) fn print_full_notes(notes: &[ViewedNote]) {
    for (i, viewed) in notes.iter().enumerate() {
        if i > 0 {
            println!("\n================================\n");
        }
        println!(
            "{} {}",
            viewed.entry.index.to_string().yellow(),
            viewed.entry.note.title.bold()
        );
        println!("--------------------------------");
        match &viewed.peek {
            Some(peek) => {
                println!("{}", peek.head);
                if let (Some(hidden), Some(tail)) = (peek.hidden, &peek.tail) {
                    println!("{}", format!("... {} more lines ...", hidden).dimmed());
                    println!("{}", tail);
                }
            }
            None => println!("{}", String::from_utf8_lossy(&viewed.content)),
        }
    }
}

pub(super) fn print_notes(notes: &[DisplayNote]) {
    if notes.is_empty() {
        println!("No notes found.");
        return;
    }

    let has_pinned = notes
        .iter()
        .any(|dn| matches!(dn.index, DisplayIndex::Pinned(_)));
    if has_pinned {
        println!();
    }

    let mut last_was_pinned = false;
    for dn in notes {
        let is_pinned_entry = matches!(dn.index, DisplayIndex::Pinned(_));
        if last_was_pinned && !is_pinned_entry {
            println!();
        }
        last_was_pinned = is_pinned_entry;
        println!("{}", note_line(dn));
    }
}

pub(super) fn print_scoped(scoped: &[ScopedNotes]) {
    for (i, group) in scoped.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", group.scope.to_string().bold());
        print_notes(&group.notes);
    }
}

/// With `with_scope`, each hit is prefixed by its scope so hits from different
/// scopes can be told apart (indexes are only unique within a scope).
pub(super) fn print_hits(hits: &[SearchHit], with_scope: bool) {
    for hit in hits {
        let entry = DisplayNote {
            index: hit.index,
            note: hit.note.clone(),
        };
        if with_scope {
            println!("{} {}", format!("[{}]", hit.note.scope).cyan(), note_line(&entry));
        } else {
            println!("{}", note_line(&entry));
        }
        for m in hit.matches.iter().filter(|m| m.line_number > 0) {
            let line: String = m
                .segments
                .iter()
                .map(|segment| match segment {
                    MatchSegment::Plain(text) => text.normal().to_string(),
                    MatchSegment::Match(text) => text.yellow().bold().to_string(),
                })
                .collect();
            println!("        {} {}", format!("{}:", m.line_number).dimmed(), line);
        }
    }
}

fn note_line(dn: &DisplayNote) -> String {
    let is_pinned_entry = matches!(dn.index, DisplayIndex::Pinned(_));
    let idx_str = format!("{}. ", dn.index);

    let left_prefix = if is_pinned_entry {
        format!("  {} ", PIN_MARKER)
    } else {
        "    ".to_string()
    };
    let right_suffix = if dn.note.is_pinned() && !is_pinned_entry {
        format!("{} ", PIN_MARKER)
    } else {
        "  ".to_string()
    };

    let fixed_width = left_prefix.width() + idx_str.width() + right_suffix.width() + TIME_WIDTH;
    let available = LINE_WIDTH.saturating_sub(fixed_width);
    let title = truncate_to_width(&dn.note.title, available);
    let padding = available.saturating_sub(title.width());

    let idx_colored = match dn.index {
        DisplayIndex::Pinned(_) => idx_str.yellow(),
        DisplayIndex::Deleted(_) => idx_str.red(),
        DisplayIndex::Regular(_) => idx_str.normal(),
    };
    let stamp = dn.note.deleted_at().unwrap_or(dn.note.created_at);

    format!(
        "{}{}{}{}{}{}",
        left_prefix,
        idx_colored,
        title,
        " ".repeat(padding),
        right_suffix,
        format_time_ago(stamp).dimmed()
    )
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
