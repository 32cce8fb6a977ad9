use serde::{Deserialize, Serialize};

// ── Markup dialect of a source document ────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Fixed layout: figures separated by blank lines / bold names between
    /// two `key.gif` images.
    Legacy,
    /// Expand/collapse layout: one `<span class="char">` name line per
    /// figure, list closed by `</span></p>` or similar.
    Expandable,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Expandable => "expandable",
        }
    }
}

// ── Corpus partition ───────────────────────────────────────────────

/// One source document and the continuity it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    /// Document stem, e.g. "a" or "ultimate".
    pub document: String,
    pub dialect: Dialect,
    /// Dimension label stored on every figure from this document.
    pub dimension: String,
}

impl Partition {
    pub fn new(document: &str, dialect: Dialect, dimension: &str) -> Self {
        Self {
            document: document.to_string(),
            dialect,
            dimension: dimension.to_string(),
        }
    }
}

// ── Figures with a page of their own ───────────────────────────────

/// A figure whose chronology lives on a separate page. When a block's name
/// line contains `marker`, the block is replaced by that page's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubDocument {
    pub marker: String,
    pub document: String,
}

impl SubDocument {
    pub fn new(marker: &str, document: &str) -> Self {
        Self {
            marker: marker.to_string(),
            document: document.to_string(),
        }
    }
}
