//! # Note Identifiers: Key vs Display Index
//!
//! Notes need to be referenced by ID. Since the primary interface is text, the stable
//! key (a UUID) is cumbersome to type, so users mostly type short display indexes.
//!
//! ## The Dual-Identifier Solution
//!
//! 1. **[`NoteKey`] (Internal)**: Immutable, never reused, independent of position.
//! 2. **[`DisplayIndex`] (External)**: Recomputed from the current ordering on every
//!    call. It is never stored, so it can shift between two invocations when notes
//!    are created, deleted or restored in between.
//!
//! ## Ordering Logic
//!
//! - Regular: all active notes (pinned included) by `created_at` descending (newest = 1)
//! - Pinned: pinned notes by `pinned_at` descending (`p1`..`p5`)
//! - Deleted: deleted notes by `deleted_at` descending (`d1`, `d2`...)
//!
//! A pinned note appears **twice** in the indexed list: once as `pN` and once with its
//! regular index, so unpinning never renumbers the regular list.
//!
//! ## Accepted Identifier Grammar
//!
//! ```text
//! 3            third active note
//! p1           most recently pinned note
//! d2           second most recently deleted note
//! proj-p1      any of the above, in scope "proj" (split on the last dash)
//! 3f2a9b       unique key prefix across active and deleted notes
//! ```
//!
//! Resolution against stores lives in [`crate::dispatcher`]; this module holds the
//! pure parts.

use crate::error::{PadError, Result};
use crate::lifecycle::PIN_CAP;
use crate::model::{Note, NoteKey, Scope};
use serde::{Serialize, Serializer};
use std::str::FromStr;

/// A user-facing index for a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayIndex {
    Pinned(usize),
    Regular(usize),
    Deleted(usize),
}

impl std::fmt::Display for DisplayIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayIndex::Pinned(i) => write!(f, "p{}", i),
            DisplayIndex::Regular(i) => write!(f, "{}", i),
            DisplayIndex::Deleted(i) => write!(f, "d{}", i),
        }
    }
}

impl Serialize for DisplayIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for DisplayIndex {
    type Err = PadError;

    fn from_str(s: &str) -> Result<Self> {
        parse_display_index(s)
            .unwrap_or_else(|| Err(PadError::InvalidFormat(format!("not an index: {}", s))))
    }
}

/// `None` when `s` does not have the shape of an index at all; `Some(Err)` when it
/// does but the number is out of range.
fn parse_display_index(s: &str) -> Option<Result<DisplayIndex>> {
    let lower = s.to_ascii_lowercase();
    let (digits, make): (&str, fn(usize) -> DisplayIndex) =
        if let Some(rest) = lower.strip_prefix('p') {
            (rest, DisplayIndex::Pinned)
        } else if let Some(rest) = lower.strip_prefix('d') {
            (rest, DisplayIndex::Deleted)
        } else {
            (lower.as_str(), DisplayIndex::Regular)
        };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let n = match digits.parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => return Some(Err(PadError::InvalidFormat(format!("index out of range: {}", s)))),
    };

    let index = make(n);
    if matches!(index, DisplayIndex::Pinned(n) if n > PIN_CAP) {
        return Some(Err(PadError::InvalidFormat(format!(
            "pinned index {} exceeds the pin cap of {}",
            s, PIN_CAP
        ))));
    }
    Some(Ok(index))
}

/// `input` normalized for key-prefix matching, if it has the shape of one. Index
/// shaped inputs such as `1234` or `d34` qualify too.
pub fn as_key_prefix(input: &str) -> Option<String> {
    let s = input.trim();
    is_key_prefix(s).then(|| s.to_ascii_lowercase())
}

fn is_key_prefix(s: &str) -> bool {
    !s.starts_with('-')
        && s.bytes().any(|b| b.is_ascii_hexdigit())
        && s.bytes().all(|b| b.is_ascii_hexdigit() || b == b'-')
}

/// A parsed user identifier, before it is resolved against any store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Index(DisplayIndex),
    Scoped {
        scope: Scope,
        index: DisplayIndex,
        /// Set when the whole input is also a valid key prefix, used if `scope`
        /// turns out not to exist.
        prefix: Option<String>,
    },
    KeyPrefix(String),
}

impl Identifier {
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim();
        if s.is_empty() {
            return Err(PadError::InvalidFormat("empty identifier".to_string()));
        }

        if let Some(index) = parse_display_index(s) {
            return index.map(Identifier::Index);
        }

        let prefix = as_key_prefix(s);

        if let Some((scope_part, index_part)) = s.rsplit_once('-') {
            let scope = scope_part.parse::<Scope>().ok();
            match (scope, parse_display_index(index_part)) {
                (Some(scope), Some(Ok(index))) => {
                    return Ok(Identifier::Scoped {
                        scope,
                        index,
                        prefix,
                    })
                }
                (Some(_), Some(Err(e))) if prefix.is_none() => return Err(e),
                _ => {}
            }
        }

        match prefix {
            Some(prefix) => Ok(Identifier::KeyPrefix(prefix)),
            None => Err(PadError::InvalidFormat(input.to_string())),
        }
    }
}

/// Connects a [`Note`] with its [`DisplayIndex`].
#[derive(Debug, Clone, Serialize)]
pub struct DisplayNote {
    pub index: DisplayIndex,
    pub note: Note,
}

/// Assigns canonical display indexes to the notes of one scope.
///
/// The returned list is ordered: pinned entries first, then regular, then deleted.
/// Pinned notes get entries in both the pinned and the regular pass.
pub fn index_notes(notes: Vec<Note>) -> Vec<DisplayNote> {
    let (mut deleted, mut active): (Vec<Note>, Vec<Note>) =
        notes.into_iter().partition(|n| n.is_deleted());

    active.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.key.cmp(&b.key)));
    deleted.sort_by(|a, b| b.deleted_at().cmp(&a.deleted_at()).then_with(|| a.key.cmp(&b.key)));

    let mut pinned: Vec<&Note> = active.iter().filter(|n| n.is_pinned()).collect();
    pinned.sort_by(|a, b| b.pinned_at().cmp(&a.pinned_at()).then_with(|| a.key.cmp(&b.key)));

    let mut results = Vec::with_capacity(active.len() + pinned.len() + deleted.len());
    results.extend(pinned.into_iter().enumerate().map(|(i, note)| DisplayNote {
        index: DisplayIndex::Pinned(i + 1),
        note: note.clone(),
    }));
    results.extend(active.into_iter().enumerate().map(|(i, note)| DisplayNote {
        index: DisplayIndex::Regular(i + 1),
        note,
    }));
    results.extend(deleted.into_iter().enumerate().map(|(i, note)| DisplayNote {
        index: DisplayIndex::Deleted(i + 1),
        note,
    }));
    results
}

pub fn find_by_index(indexed: &[DisplayNote], index: DisplayIndex) -> Option<&DisplayNote> {
    indexed.iter().find(|dn| dn.index == index)
}

/// The index a note is addressed by in plain listings: regular for active notes,
/// deleted for deleted ones.
pub fn primary_index(indexed: &[DisplayNote], key: &NoteKey) -> Option<DisplayIndex> {
    indexed
        .iter()
        .filter(|dn| dn.note.key == *key)
        .map(|dn| dn.index)
        .find(|idx| !matches!(idx, DisplayIndex::Pinned(_)))
}

/// Entries whose key starts with `prefix`, without the duplicate pinned entries.
pub fn match_prefix<'a>(indexed: &'a [DisplayNote], prefix: &str) -> Vec<&'a DisplayNote> {
    indexed
        .iter()
        .filter(|dn| !matches!(dn.index, DisplayIndex::Pinned(_)))
        .filter(|dn| dn.note.key.matches_prefix(prefix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoteState;
    use chrono::{Duration, Utc};

    fn note_at(title: &str, minutes_ago: i64) -> Note {
        Note::new(
            Scope::Global,
            title.to_string(),
            b"",
            Utc::now() - Duration::minutes(minutes_ago),
        )
    }

    #[test]
    fn parses_plain_forms() {
        assert_eq!(
            Identifier::parse("3").unwrap(),
            Identifier::Index(DisplayIndex::Regular(3))
        );
        assert_eq!(
            Identifier::parse("p2").unwrap(),
            Identifier::Index(DisplayIndex::Pinned(2))
        );
        assert_eq!(
            Identifier::parse("d10").unwrap(),
            Identifier::Index(DisplayIndex::Deleted(10))
        );
    }

    #[test]
    fn rejects_out_of_range_indexes() {
        for bad in ["0", "p0", "d0", "p6", ""] {
            assert!(
                matches!(Identifier::parse(bad), Err(PadError::InvalidFormat(_))),
                "{} should be invalid",
                bad
            );
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            Identifier::parse("hello!"),
            Err(PadError::InvalidFormat(_))
        ));
        assert!(matches!(
            Identifier::parse("proj-0"),
            Err(PadError::InvalidFormat(_))
        ));
    }

    #[test]
    fn parses_scope_qualified_on_last_dash() {
        assert_eq!(
            Identifier::parse("my-proj-p1").unwrap(),
            Identifier::Scoped {
                scope: Scope::Project("my-proj".to_string()),
                index: DisplayIndex::Pinned(1),
                prefix: None,
            }
        );
        assert_eq!(
            Identifier::parse("global-2").unwrap(),
            Identifier::Scoped {
                scope: Scope::Global,
                index: DisplayIndex::Regular(2),
                prefix: None,
            }
        );
    }

    #[test]
    fn hex_input_is_key_prefix() {
        assert_eq!(
            Identifier::parse("3F2A9b").unwrap(),
            Identifier::KeyPrefix("3f2a9b".to_string())
        );
        // A full key ending in digits is also scope-shaped; the prefix is kept for fallback.
        match Identifier::parse("3f2a9b1c-4d5e-4f60-8a7b-123456789012").unwrap() {
            Identifier::Scoped { prefix, .. } => {
                assert_eq!(prefix.as_deref(), Some("3f2a9b1c-4d5e-4f60-8a7b-123456789012"))
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            Identifier::parse("abc-0").unwrap(),
            Identifier::KeyPrefix("abc-0".to_string())
        );
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for idx in [
            DisplayIndex::Regular(4),
            DisplayIndex::Pinned(1),
            DisplayIndex::Deleted(7),
        ] {
            assert_eq!(idx.to_string().parse::<DisplayIndex>().unwrap(), idx);
        }
    }

    #[test]
    fn regular_indexes_follow_creation_order() {
        let indexed = index_notes(vec![note_at("old", 30), note_at("new", 1), note_at("mid", 10)]);
        let titles: Vec<(&str, DisplayIndex)> = indexed
            .iter()
            .map(|dn| (dn.note.title.as_str(), dn.index))
            .collect();
        assert_eq!(
            titles,
            vec![
                ("new", DisplayIndex::Regular(1)),
                ("mid", DisplayIndex::Regular(2)),
                ("old", DisplayIndex::Regular(3)),
            ]
        );
    }

    #[test]
    fn pinned_notes_are_indexed_twice_by_pin_time() {
        let mut a = note_at("a", 30);
        let mut b = note_at("b", 20);
        let c = note_at("c", 10);
        let now = Utc::now();
        a.state = NoteState::Active {
            pinned_at: Some(now),
        };
        b.state = NoteState::Active {
            pinned_at: Some(now - Duration::minutes(5)),
        };

        let indexed = index_notes(vec![a.clone(), b.clone(), c.clone()]);
        assert_eq!(find_by_index(&indexed, DisplayIndex::Pinned(1)).unwrap().note.key, a.key);
        assert_eq!(find_by_index(&indexed, DisplayIndex::Pinned(2)).unwrap().note.key, b.key);
        assert_eq!(find_by_index(&indexed, DisplayIndex::Regular(1)).unwrap().note.key, c.key);
        assert_eq!(find_by_index(&indexed, DisplayIndex::Regular(3)).unwrap().note.key, a.key);
        assert_eq!(primary_index(&indexed, &a.key), Some(DisplayIndex::Regular(3)));
        assert_eq!(indexed.len(), 5);
    }

    #[test]
    fn deleted_notes_ordered_by_deletion_time() {
        let mut first = note_at("first", 30);
        let mut second = note_at("second", 20);
        let now = Utc::now();
        first.state = NoteState::Deleted {
            deleted_at: now - Duration::minutes(1),
        };
        second.state = NoteState::Deleted {
            deleted_at: now - Duration::minutes(2),
        };

        let indexed = index_notes(vec![second.clone(), first.clone()]);
        assert_eq!(find_by_index(&indexed, DisplayIndex::Deleted(1)).unwrap().note.key, first.key);
        assert_eq!(find_by_index(&indexed, DisplayIndex::Deleted(2)).unwrap().note.key, second.key);
        assert!(find_by_index(&indexed, DisplayIndex::Regular(1)).is_none());
    }

    #[test]
    fn prefix_matching_skips_pinned_duplicates() {
        let mut a = note_at("a", 1);
        a.state = NoteState::Active {
            pinned_at: Some(Utc::now()),
        };
        let key = a.key.to_string();
        let indexed = index_notes(vec![a]);
        assert_eq!(match_prefix(&indexed, &key[..8]).len(), 1);
    }
}
