//! # Search Ranking
//!
//! A query is a literal substring or a regular expression, both case-insensitive.
//! Matching notes are ranked by:
//!
//! 1. exact full-title match
//! 2. partial title match
//! 3. content-only match
//! 4. shorter matched span (first match start to last match end) within the tier's field
//! 5. listing order (the sort is stable)
//!
//! Each hit keeps the display index it has in plain listings, plus per-line match
//! segments for highlighting (line 0 is the title).

use crate::error::{PadError, Result};
use crate::index::{DisplayIndex, DisplayNote};
use crate::model::Note;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct Query {
    raw: String,
    find: Regex,
    whole: Regex,
}

impl Query {
    pub fn literal(text: &str) -> Result<Self> {
        Self::build(text, &regex::escape(text))
    }

    pub fn regex(pattern: &str) -> Result<Self> {
        Self::build(pattern, pattern)
    }

    fn build(raw: &str, pattern: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(PadError::InvalidFormat("empty search query".to_string()));
        }
        let compile = |p: &str| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|e| PadError::InvalidFormat(format!("bad pattern {:?}: {}", raw, e)))
        };
        Ok(Self {
            raw: raw.to_string(),
            find: compile(pattern)?,
            whole: compile(&format!("^(?:{})$", pattern))?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Non-empty match ranges in `text`.
    fn ranges(&self, text: &str) -> Vec<(usize, usize)> {
        self.find
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| (m.start(), m.end()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    ExactTitle,
    PartialTitle,
    Content,
}

/// A segment of text in a search match, either plain text or a matched term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum MatchSegment {
    Plain(String),
    Match(String),
}

/// A line containing a search match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    pub line_number: usize, // 0 for title, 1+ for content lines
    pub segments: Vec<MatchSegment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub index: DisplayIndex,
    pub note: Note,
    pub tier: MatchTier,
    pub span: usize,
    pub matches: Vec<SearchMatch>,
}

fn span(ranges: &[(usize, usize)]) -> usize {
    match (ranges.first(), ranges.last()) {
        (Some(first), Some(last)) => last.1 - first.0,
        _ => 0,
    }
}

fn segments(line: &str, ranges: &[(usize, usize)]) -> Vec<MatchSegment> {
    let mut out = Vec::new();
    let mut cursor = 0;
    for &(start, end) in ranges {
        if start > cursor {
            out.push(MatchSegment::Plain(line[cursor..start].to_string()));
        }
        out.push(MatchSegment::Match(line[start..end].to_string()));
        cursor = end;
    }
    if cursor < line.len() {
        out.push(MatchSegment::Plain(line[cursor..].to_string()));
    }
    out
}

fn line_matches(query: &Query, title: &str, content: &str) -> Vec<SearchMatch> {
    let title_line = std::iter::once((0, title));
    let content_lines = content.lines().enumerate().map(|(i, l)| (i + 1, l));

    title_line
        .chain(content_lines)
        .filter_map(|(line_number, line)| {
            let ranges = query.ranges(line);
            (!ranges.is_empty()).then(|| SearchMatch {
                line_number,
                segments: segments(line, &ranges),
            })
        })
        .collect()
}

/// Ranks `candidates` (in listing order, each with its content) against `query`.
/// Non-matching notes are dropped.
pub fn rank(candidates: Vec<(DisplayNote, Vec<u8>)>, query: &Query) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = candidates
        .into_iter()
        .filter_map(|(dn, content)| {
            let content = String::from_utf8_lossy(&content);
            let title = dn.note.title.as_str();
            let title_ranges = query.ranges(title);

            let (tier, span) = if query.whole.is_match(title) {
                (MatchTier::ExactTitle, title.len())
            } else if !title_ranges.is_empty() {
                (MatchTier::PartialTitle, span(&title_ranges))
            } else {
                let content_ranges = query.ranges(&content);
                if content_ranges.is_empty() {
                    return None;
                }
                (MatchTier::Content, span(&content_ranges))
            };

            let matches = line_matches(query, title, &content);
            Some(SearchHit {
                index: dn.index,
                note: dn.note,
                tier,
                span,
                matches,
            })
        })
        .collect();

    hits.sort_by_key(|h| (h.tier, h.span));
    hits
}
