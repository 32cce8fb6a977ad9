use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Figure ───────────────────────────────────────────────────────────────

/// A character with a reading-order chronology list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Figure {
    pub id: usize,
    pub name: String,
    /// Bracketed qualifier from the name, e.g. "Skrull" in "KL'RT [Skrull]".
    #[serde(default)]
    pub race: String,
    /// Comma-joined redirect phrases ("See X", "From Y") collected from the list.
    #[serde(default)]
    pub search: String,
    pub link: String,
    /// Corpus partition, e.g. "standard" or "Ultimate Universe".
    pub dimension: String,
    /// Raw chronology block, markup included.
    pub chronolist: String,
}

// ── Chronology entries ───────────────────────────────────────────────────

/// One comic reference inside a chronology entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComicRef {
    pub comicstr: String,
    pub comicid: usize,
    pub appendix: String,
}

/// A single line of a figure's chronology: the cleaned text plus every
/// comic referenced on it. The empty value is the "no entry" placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySnapshot {
    pub rawstr: String,
    pub comics: Vec<ComicRef>,
}

impl EntrySnapshot {
    pub fn is_placeholder(&self) -> bool {
        self.rawstr.is_empty() && self.comics.is_empty()
    }
}

/// One appearance of a comic in one figure's chronology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Position of the entry in the figure's chronology.
    pub index: usize,
    pub previous: EntrySnapshot,
    pub current: EntrySnapshot,
    pub next: EntrySnapshot,
}

// ── Comic record ─────────────────────────────────────────────────────────

/// appendix → figure id → occurrences (ascending entry index)
pub type Appendixes = BTreeMap<String, BTreeMap<usize, Vec<Occurrence>>>;

/// A deduplicated publication, keyed by its exact abbreviated reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComicRecord {
    pub id: usize,
    pub abbreviation: String,
    pub full_name: String,
    pub appendixes: Appendixes,
}

impl ComicRecord {
    /// Iterate every occurrence as (appendix, figure id, occurrence).
    pub fn occurrences(&self) -> impl Iterator<Item = (&str, usize, &Occurrence)> {
        self.appendixes.iter().flat_map(|(appendix, figs)| {
            figs.iter().flat_map(move |(fig, occs)| {
                occs.iter().map(move |o| (appendix.as_str(), *fig, o))
            })
        })
    }
}

// ── Anomalies ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnomalyReason {
    UnexpectedCharacter,
    UnknownAbbreviation,
}

impl AnomalyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnexpectedCharacter => "Unexpected character",
            Self::UnknownAbbreviation => "Unknown abbreviation",
        }
    }
}

impl std::fmt::Display for AnomalyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
