//! Input document records.
//!
//! Documents are immutable inputs supplied by the literature-acquisition
//! collaborator; the engine never mutates them. Optional fields use
//! "absent means unknown" semantics: a missing or zero `year` is unknown,
//! a missing `abstract_text` means only the title is usable as text.

use serde::{Deserialize, Serialize};

/// A scored literature record handed to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable external identifier. When absent, the node id falls back to
    /// a truncated title.
    #[serde(default)]
    pub id: Option<String>,
    /// Document title
    pub title: String,
    /// Ordered author names
    #[serde(default)]
    pub authors: Vec<String>,
    /// Publication year; `None` or `Some(0)` means unknown
    #[serde(default)]
    pub year: Option<i32>,
    /// Abstract text, if available
    #[serde(default)]
    pub abstract_text: Option<String>,
    /// Citation count reported by the source (≥ 0)
    #[serde(default)]
    pub citation_count: u32,
    /// Precomputed quality score in [0, 100]
    pub quality_score: f64,
    /// Tag identifying the acquisition source
    #[serde(default)]
    pub source: String,
    /// Node ids of documents this one cites (citing → cited)
    #[serde(default)]
    pub references: Vec<String>,
}

impl Document {
    /// Max length of the title-derived fallback id.
    const ID_TITLE_PREFIX: usize = 50;

    /// Graph identity for this document: the external id when present,
    /// otherwise the title truncated to 50 chars.
    pub fn node_id(&self) -> String {
        match &self.id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => self.title.chars().take(Self::ID_TITLE_PREFIX).collect(),
        }
    }

    /// Publication year with the zero sentinel normalized away.
    pub fn known_year(&self) -> Option<i32> {
        match self.year {
            Some(y) if y > 0 => Some(y),
            _ => None,
        }
    }

    /// Text used for similarity estimation: title plus abstract when present.
    pub fn text(&self) -> String {
        match &self.abstract_text {
            Some(a) if !a.is_empty() => format!("{} {}", self.title, a),
            _ => self.title.clone(),
        }
    }
}
