//! Flags comic references the parser may have misread.
//!
//! Nothing here stops extraction. Every flagged reference is grouped by
//! identifier and text so an operator can fix the source page or extend the
//! parser, and the report lists which figures carry the same problem.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;

use mcp_types::AnomalyReason;
use regex::Regex;
use serde::Serialize;

use crate::resolve::TitleKey;

// Identifier characters: A-Z @ space - : & / ? .
// Issue characters: digits / ' - .
static RE_UNEXPECTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Z@ \-:&/?.\d/'\-.]").unwrap());

const GROUP_RULE: &str = "==============";
const ENTRY_RULE: &str = "--------------";

/// Reasons and contributing figures for one offending reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnomalyEntry {
    pub reasons: BTreeSet<AnomalyReason>,
    /// Figure names in the order they were first flagged.
    pub figures: Vec<String>,
}

/// identifier → offending reference text → entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Anomalies {
    groups: BTreeMap<String, BTreeMap<String, AnomalyEntry>>,
}

impl Anomalies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one anomaly; a figure is listed once per (identifier, text).
    pub fn add(&mut self, identifier: &str, figure: &str, comicstr: &str, reason: AnomalyReason) {
        let entry = self
            .groups
            .entry(identifier.to_string())
            .or_default()
            .entry(comicstr.to_string())
            .or_default();
        entry.reasons.insert(reason);
        if !entry.figures.iter().any(|f| f == figure) {
            entry.figures.push(figure.to_string());
        }
    }

    /// Run both checks on one parsed reference.
    pub fn check(&mut self, comicstr: &str, identifier: &str, figure: &str, key: &TitleKey) {
        if RE_UNEXPECTED.is_match(comicstr) {
            self.add(identifier, figure, comicstr, AnomalyReason::UnexpectedCharacter);
        }
        if !key.contains(identifier) {
            self.add(identifier, figure, comicstr, AnomalyReason::UnknownAbbreviation);
        }
    }

    pub fn get(&self, identifier: &str, comicstr: &str) -> Option<&AnomalyEntry> {
        self.groups.get(identifier)?.get(comicstr)
    }

    /// Number of distinct offending references.
    pub fn len(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn count_by_reason(&self, reason: AnomalyReason) -> usize {
        self.groups
            .values()
            .flat_map(BTreeMap::values)
            .filter(|e| e.reasons.contains(&reason))
            .count()
    }
}

impl fmt::Display for Anomalies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (identifier, entries) in &self.groups {
            writeln!(f, "{identifier}")?;
            writeln!(f, "{GROUP_RULE}")?;
            for (comicstr, entry) in entries {
                writeln!(f, "{comicstr}")?;
                for reason in &entry.reasons {
                    writeln!(f, "{reason}")?;
                }
                writeln!(f, "{}", entry.figures.join("\n"))?;
                writeln!(f, "{ENTRY_RULE}")?;
            }
            writeln!(f, "{GROUP_RULE}")?;
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> TitleKey {
        TitleKey::from_pairs([("A", "AVENGERS"), ("KP&W", "KITTY PRYDE & WOLVERINE")])
    }

    #[test]
    fn test_unexpected_character() {
        let mut a = Anomalies::new();
        a.check("A#1", "A#1", "HAWKEYE", &key());
        let entry = a.get("A#1", "A#1").expect("flagged");
        assert!(entry.reasons.contains(&AnomalyReason::UnexpectedCharacter));
    }

    #[test]
    fn test_unknown_abbreviation() {
        let mut a = Anomalies::new();
        a.check("ZZZ 1", "ZZZ", "HAWKEYE", &key());
        let entry = a.get("ZZZ", "ZZZ 1").expect("flagged");
        assert_eq!(
            entry.reasons.iter().collect::<Vec<_>>(),
            vec![&AnomalyReason::UnknownAbbreviation]
        );
    }

    #[test]
    fn test_both_checks_fire() {
        let mut a = Anomalies::new();
        a.check("zz 1", "zz", "HAWKEYE", &key());
        let entry = a.get("zz", "zz 1").expect("flagged");
        assert_eq!(entry.reasons.len(), 2);
    }

    #[test]
    fn test_clean_reference_not_flagged() {
        let mut a = Anomalies::new();
        a.check("A 1", "A", "HAWKEYE", &key());
        a.check("KP&W 6", "KP&W", "HAWKEYE", &key());
        a.check("A '98", "A", "HAWKEYE", &key());
        assert!(a.is_empty());
    }

    #[test]
    fn test_figures_deduplicated() {
        let mut a = Anomalies::new();
        a.check("ZZZ 1", "ZZZ", "HAWKEYE", &key());
        a.check("ZZZ 1", "ZZZ", "HAWKEYE", &key());
        a.check("ZZZ 1", "ZZZ", "MOCKINGBIRD", &key());
        a.check("ZZZ 2", "ZZZ", "HAWKEYE", &key());
        assert_eq!(a.len(), 2);
        assert_eq!(
            a.get("ZZZ", "ZZZ 1").expect("flagged").figures,
            vec!["HAWKEYE", "MOCKINGBIRD"]
        );
        assert_eq!(a.count_by_reason(AnomalyReason::UnknownAbbreviation), 2);
    }

    #[test]
    fn test_display_grouped() {
        let mut a = Anomalies::new();
        a.check("ZZZ 1", "ZZZ", "HAWKEYE", &key());
        a.check("ZZZ 1", "ZZZ", "MOCKINGBIRD", &key());
        a.check("B 2", "B", "THOR", &key());
        let expected = "B\n==============\nB 2\nUnknown abbreviation\nTHOR\n--------------\n==============\n\n\
                        ZZZ\n==============\nZZZ 1\nUnknown abbreviation\nHAWKEYE\nMOCKINGBIRD\n--------------\n==============\n\n";
        assert_eq!(a.to_string(), expected);
    }
}
