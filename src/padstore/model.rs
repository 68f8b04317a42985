use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{PadError, Result};

/// Longest title (in chars) derived from content before it gets truncated.
pub const MAX_TITLE_CHARS: usize = 100;

pub const GLOBAL_SCOPE_NAME: &str = "global";

/// Stable internal identifier of a note. Never derived from display position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteKey(Uuid);

impl NoteKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Case-insensitive prefix test. Prefixes without dashes are compared against
    /// the 32-char simple form so they may span the dash positions.
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        let prefix = prefix.to_ascii_lowercase();
        if prefix.contains('-') {
            self.0.hyphenated().to_string().starts_with(&prefix)
        } else {
            self.0.simple().to_string().starts_with(&prefix)
        }
    }
}

impl Default for NoteKey {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for NoteKey {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for NoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for NoteKey {
    type Err = PadError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(NoteKey)
            .map_err(|_| PadError::InvalidFormat(format!("not a note key: {}", s)))
    }
}

/// A storage namespace: the global area or a named project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Scope {
    Global,
    Project(String),
}

impl Scope {
    pub fn project(name: &str) -> Result<Self> {
        name.parse()
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Scope::Global)
    }

    /// Directory name of this scope under the data dir.
    pub fn dir_name(&self) -> &str {
        match self {
            Scope::Global => GLOBAL_SCOPE_NAME,
            Scope::Project(name) => name,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Scope {
    type Err = PadError;

    fn from_str(s: &str) -> Result<Self> {
        if s == GLOBAL_SCOPE_NAME {
            return Ok(Scope::Global);
        }
        if s.is_empty() || s.starts_with('.') || s.contains(['/', '\\']) {
            return Err(PadError::InvalidFormat(format!("invalid scope name: {:?}", s)));
        }
        Ok(Scope::Project(s.to_string()))
    }
}

impl TryFrom<String> for Scope {
    type Error = PadError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.dir_name().to_string()
    }
}

/// Lifecycle state of a note. Pinned is a flag of Active, so a pinned deleted
/// note cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum NoteState {
    Active {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pinned_at: Option<DateTime<Utc>>,
    },
    Deleted {
        deleted_at: DateTime<Utc>,
    },
}

impl NoteState {
    pub fn active() -> Self {
        NoteState::Active { pinned_at: None }
    }

    pub fn is_pinned(&self) -> bool {
        matches!(self, NoteState::Active { pinned_at: Some(_) })
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, NoteState::Deleted { .. })
    }

    pub fn pinned_at(&self) -> Option<DateTime<Utc>> {
        match self {
            NoteState::Active { pinned_at } => *pinned_at,
            NoteState::Deleted { .. } => None,
        }
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            NoteState::Deleted { deleted_at } => Some(*deleted_at),
            NoteState::Active { .. } => None,
        }
    }
}

/// Metadata record of one note. Content lives in its own blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub key: NoteKey,
    pub scope: Scope,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub size: u64,
    pub checksum: String,
    pub state: NoteState,
}

impl Note {
    pub fn new(scope: Scope, title: String, content: &[u8], now: DateTime<Utc>) -> Self {
        Self {
            key: NoteKey::new(),
            scope,
            title,
            created_at: now,
            updated_at: now,
            size: content.len() as u64,
            checksum: checksum(content),
            state: NoteState::active(),
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.state.is_pinned()
    }

    pub fn is_deleted(&self) -> bool {
        self.state.is_deleted()
    }

    pub fn pinned_at(&self) -> Option<DateTime<Utc>> {
        self.state.pinned_at()
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.state.deleted_at()
    }

    /// Recompute size and checksum after the content changed.
    pub fn set_content_stats(&mut self, content: &[u8]) {
        self.size = content.len() as u64;
        self.checksum = checksum(content);
    }
}

/// Lowercase hex SHA-256 of the exact content bytes.
pub fn checksum(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// First non-blank line of the content, trimmed and cut to [`MAX_TITLE_CHARS`].
pub fn title_from_content(content: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(content);
    let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;

    if line.chars().count() > MAX_TITLE_CHARS {
        let head: String = line.chars().take(MAX_TITLE_CHARS - 3).collect();
        Some(format!("{}...", head))
    } else {
        Some(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_sha256_hex() {
        assert_eq!(
            checksum(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn title_skips_blank_lines_and_trims() {
        assert_eq!(
            title_from_content(b"\n   \n  Buy milk  \nand eggs"),
            Some("Buy milk".to_string())
        );
        assert_eq!(title_from_content(b" \n\t\n"), None);
        assert_eq!(title_from_content(b""), None);
    }

    #[test]
    fn long_titles_are_truncated_with_ellipsis() {
        let line = "x".repeat(150);
        let title = title_from_content(line.as_bytes()).unwrap();
        assert_eq!(title.chars().count(), MAX_TITLE_CHARS);
        assert!(title.ends_with("..."));

        let exact = "y".repeat(MAX_TITLE_CHARS);
        assert_eq!(title_from_content(exact.as_bytes()), Some(exact));
    }

    #[test]
    fn scope_names_round_trip() {
        assert_eq!("global".parse::<Scope>().unwrap(), Scope::Global);
        assert_eq!(
            "my-proj".parse::<Scope>().unwrap(),
            Scope::Project("my-proj".to_string())
        );
        assert!("".parse::<Scope>().is_err());
        assert!(".hidden".parse::<Scope>().is_err());
        assert!("a/b".parse::<Scope>().is_err());
    }

    #[test]
    fn key_prefix_matching_ignores_case_and_dashes() {
        let key: NoteKey = "3f2a9b1c-4d5e-4f60-8a7b-9c0d1e2f3a4b".parse().unwrap();
        assert!(key.matches_prefix("3F2A"));
        assert!(key.matches_prefix("3f2a9b1c4d"));
        assert!(key.matches_prefix("3f2a9b1c-4d"));
        assert!(!key.matches_prefix("3f2b"));
    }

    #[test]
    fn state_serializes_tagged() {
        let json = serde_json::to_string(&NoteState::active()).unwrap();
        assert_eq!(json, r#"{"status":"active"}"#);
        let back: NoteState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, NoteState::active());
    }
}
