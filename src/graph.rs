//! The comic index: every comic seen in any chronology, with each
//! appearance linked to the entries before and after it.
//!
//! Entries and occurrences live in flat arenas owned by [`ComicIndex`]. An
//! occurrence refers to its previous/current/next entries by [`EntryId`], so
//! filling in `next` once the following entry is known is a single index
//! update, and every occurrence created on one entry shares that entry's
//! full comic list.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use mcp_types::{ComicRecord, ComicRef, EntrySnapshot, Occurrence};
use regex::Regex;

use crate::anomaly::Anomalies;
use crate::normalize::{clean_entry, clean_text};
use crate::resolve::TitleKey;
use crate::token::ComicToken;

static RE_BR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br>").unwrap());

pub type ComicId = usize;
pub type FigureId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct OccurrenceId(usize);

#[derive(Debug, Clone)]
struct EntryNode {
    rawstr: String,
    comics: Vec<ComicRef>,
}

#[derive(Debug, Clone)]
struct OccurrenceNode {
    index: usize,
    /// None = placeholder (first entry of a list)
    previous: Option<EntryId>,
    current: EntryId,
    /// None until the following entry has been processed
    next: Option<EntryId>,
}

#[derive(Debug, Clone)]
struct ComicNode {
    abbreviation: String,
    full_name: String,
    appendixes: BTreeMap<String, BTreeMap<FigureId, Vec<OccurrenceId>>>,
}

/// All comics across all figures. Created empty, only ever grows.
#[derive(Debug, Clone, Default)]
pub struct ComicIndex {
    comics: Vec<ComicNode>,
    by_abbreviation: HashMap<String, ComicId>,
    entries: Vec<EntryNode>,
    occurrences: Vec<OccurrenceNode>,
}

impl ComicIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct comics.
    pub fn len(&self) -> usize {
        self.comics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comics.is_empty()
    }

    pub fn occurrence_count(&self) -> usize {
        self.occurrences.len()
    }

    pub fn comic_id(&self, abbreviation: &str) -> Option<ComicId> {
        self.by_abbreviation.get(abbreviation).copied()
    }

    /// Abbreviations in first-seen (id) order.
    pub fn abbreviations(&self) -> impl Iterator<Item = &str> {
        self.comics.iter().map(|c| c.abbreviation.as_str())
    }

    /// Id of the comic, creating it on first sight. The full name of an
    /// existing comic is never replaced.
    fn intern(&mut self, abbreviation: &str, full_name: String) -> ComicId {
        if let Some(&id) = self.by_abbreviation.get(abbreviation) {
            return id;
        }
        let id = self.comics.len();
        self.comics.push(ComicNode {
            abbreviation: abbreviation.to_string(),
            full_name,
            appendixes: BTreeMap::new(),
        });
        self.by_abbreviation.insert(abbreviation.to_string(), id);
        id
    }

    fn push_entry(&mut self, rawstr: String) -> EntryId {
        let id = EntryId(self.entries.len());
        self.entries.push(EntryNode {
            rawstr,
            comics: Vec::new(),
        });
        id
    }

    fn append_occurrence(
        &mut self,
        comic: ComicId,
        appendix: &str,
        figure: FigureId,
        index: usize,
        previous: Option<EntryId>,
        current: EntryId,
    ) {
        let id = OccurrenceId(self.occurrences.len());
        self.occurrences.push(OccurrenceNode {
            index,
            previous,
            current,
            next: None,
        });
        self.comics[comic]
            .appendixes
            .entry(appendix.to_string())
            .or_default()
            .entry(figure)
            .or_default()
            .push(id);
    }

    /// Point the outstanding occurrence of (comic, appendix, figure) at
    /// `next`. Normally that is the last one appended; if the last one was
    /// created by the entry at `current_index` itself (the same comic on two
    /// consecutive entries), the one before it is updated instead.
    fn set_next(
        &mut self,
        comic: ComicId,
        appendix: &str,
        figure: FigureId,
        next: EntryId,
        current_index: usize,
    ) {
        let Some(list) = self.comics[comic]
            .appendixes
            .get(appendix)
            .and_then(|figs| figs.get(&figure))
        else {
            return;
        };
        let Some(&last) = list.last() else {
            return;
        };
        let target = if self.occurrences[last.0].index == current_index {
            match list.len().checked_sub(2) {
                Some(i) => list[i],
                None => return,
            }
        } else {
            last
        };
        self.occurrences[target.0].next = Some(next);
    }

    fn snapshot(&self, entry: Option<EntryId>) -> EntrySnapshot {
        match entry {
            Some(EntryId(i)) => EntrySnapshot {
                rawstr: self.entries[i].rawstr.clone(),
                comics: self.entries[i].comics.clone(),
            },
            None => EntrySnapshot::default(),
        }
    }

    fn materialize(&self, id: OccurrenceId) -> Occurrence {
        let node = &self.occurrences[id.0];
        Occurrence {
            index: node.index,
            previous: self.snapshot(node.previous),
            current: self.snapshot(Some(node.current)),
            next: self.snapshot(node.next),
        }
    }

    /// Occurrences of one comic for one appendix and figure, in entry order.
    pub fn occurrences(&self, abbreviation: &str, appendix: &str, figure: FigureId) -> Vec<Occurrence> {
        self.comic_id(abbreviation)
            .and_then(|id| self.comics[id].appendixes.get(appendix))
            .and_then(|figs| figs.get(&figure))
            .map(|list| list.iter().map(|&o| self.materialize(o)).collect())
            .unwrap_or_default()
    }

    pub fn record(&self, id: ComicId) -> Option<ComicRecord> {
        let node = self.comics.get(id)?;
        let appendixes = node
            .appendixes
            .iter()
            .map(|(appendix, figs)| {
                let figs: BTreeMap<FigureId, Vec<Occurrence>> = figs
                    .iter()
                    .map(|(&fig, list)| {
                        let occs: Vec<Occurrence> =
                            list.iter().map(|&o| self.materialize(o)).collect();
                        (fig, occs)
                    })
                    .collect();
                (appendix.clone(), figs)
            })
            .collect();
        Some(ComicRecord {
            id,
            abbreviation: node.abbreviation.clone(),
            full_name: node.full_name.clone(),
            appendixes,
        })
    }

    pub fn get(&self, abbreviation: &str) -> Option<ComicRecord> {
        self.record(self.comic_id(abbreviation)?)
    }

    /// Every comic record keyed by abbreviation.
    pub fn to_records(&self) -> BTreeMap<String, ComicRecord> {
        (0..self.comics.len())
            .filter_map(|id| self.record(id))
            .map(|r| (r.abbreviation.clone(), r))
            .collect()
    }
}

/// Split a raw chronology block into `<br>`-terminated entries.
///
/// The text after the last `<br>` is normally closing markup; it only
/// counts as an entry when something is left after cleaning.
pub fn split_entries(chronolist: &str) -> Vec<&str> {
    let mut entries: Vec<&str> = RE_BR.split(chronolist).collect();
    if entries
        .last()
        .is_some_and(|tail| clean_text(tail).is_empty())
    {
        entries.pop();
    }
    entries
}

/// Feeds figure chronologies into a shared [`ComicIndex`].
pub struct GraphBuilder<'a> {
    index: &'a mut ComicIndex,
    anomalies: &'a mut Anomalies,
    key: &'a TitleKey,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(index: &'a mut ComicIndex, anomalies: &'a mut Anomalies, key: &'a TitleKey) -> Self {
        Self {
            index,
            anomalies,
            key,
        }
    }

    /// Add one figure's chronology. Entries must be fed in document order.
    ///
    /// Returns the figure's search aliases: every redirect phrase found in
    /// the list, comma-joined.
    pub fn add_figure(&mut self, figure: FigureId, figure_name: &str, chronolist: &str) -> String {
        let mut aliases: Vec<String> = Vec::new();
        let mut previous: Option<EntryId> = None;

        for (i, raw) in split_entries(chronolist).into_iter().enumerate() {
            let entry = clean_entry(raw.trim());
            if !entry.redirect.is_empty() {
                aliases.push(entry.redirect);
            }

            let current = self.index.push_entry(entry.text);
            for token in entry.comics.iter().filter(|t| !t.is_empty()) {
                let comic = ComicToken::parse(token);
                let full_name =
                    self.key
                        .full_name(&comic.identifier, comic.issue.as_deref(), comic.is_annual);
                self.anomalies
                    .check(&comic.base, &comic.identifier, figure_name, self.key);

                let comic_id = self.index.intern(&comic.base, full_name);
                self.index.entries[current.0].comics.push(ComicRef {
                    comicstr: comic.base.clone(),
                    comicid: comic_id,
                    appendix: comic.appendix.clone(),
                });
                self.index
                    .append_occurrence(comic_id, &comic.appendix, figure, i, previous, current);
            }

            if let Some(prev) = previous {
                let touched = self.index.entries[prev.0].comics.clone();
                for c in &touched {
                    self.index
                        .set_next(c.comicid, &c.appendix, figure, current, i);
                }
            }
            previous = Some(current);
        }

        aliases.join(", ")
    }
}
