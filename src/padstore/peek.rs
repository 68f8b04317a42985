//! Opening/closing-lines preview of note content.
//!
//! Blank lines are dropped. Content with at most `2 * lines + 3` remaining lines is
//! shown whole; longer content keeps `lines` lines at each end and reports how many
//! were hidden in between.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Peek {
    pub head: String,
    pub hidden: Option<usize>,
    pub tail: Option<String>,
}

pub fn peek(content: &[u8], lines: usize) -> Peek {
    let text = String::from_utf8_lossy(content);
    let kept: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();

    if kept.len() <= lines.saturating_mul(2).saturating_add(3) {
        return Peek {
            head: kept.join("\n"),
            hidden: None,
            tail: None,
        };
    }

    Peek {
        head: kept[..lines].join("\n"),
        hidden: Some(kept.len() - lines * 2),
        tail: Some(kept[kept.len() - lines..].join("\n")),
    }
}
