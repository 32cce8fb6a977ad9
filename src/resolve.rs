use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::error::{ExtractError, Result};
use crate::normalize::clean_text;

// The key document lists titles twice; the first table is sorted by key.
static RE_KEY_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?si)TITLE KEY By KEY(?P<body>.*?)TITLE KEY By TITLE").unwrap()
});

// <tr><td>ASM</td><td>AMAZING SPIDER-MAN</td>
// (one row in the live page closes its first cell with "</t>")
static RE_KEY_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<tr><td>(?P<abbr>[^>]*)</td?><td>(?P<title>[^>]*)<").unwrap()
});

/// Table cells that are footnote markers, not abbreviations.
const IGNORED_KEYS: &[&str] = &["@", "'"];

/// Abbreviation → full title lookup.
#[derive(Debug, Clone, Default)]
pub struct TitleKey {
    titles: HashMap<String, String>,
}

impl TitleKey {
    /// Build from the key document plus fixed overrides. Entries found in
    /// the document take precedence over the overrides.
    pub fn from_key_document(
        document: &str,
        text: &str,
        overrides: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let body = RE_KEY_SECTION
            .captures(text)
            .and_then(|c| c.name("body"))
            .ok_or_else(|| ExtractError::missing_section(document, "title key table"))?
            .as_str();

        let mut titles: HashMap<String, String> = overrides
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let mut rows = 0usize;
        for caps in RE_KEY_ROW.captures_iter(body) {
            let abbr = clean_text(&caps["abbr"]);
            if IGNORED_KEYS.contains(&abbr.as_str()) {
                continue;
            }
            titles.insert(abbr, clean_text(&caps["title"]));
            rows += 1;
        }
        info!(document, rows, total = titles.len(), "title key loaded");

        Ok(Self { titles })
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            titles: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.titles.contains_key(identifier)
    }

    /// Full title, or the identifier itself when it is not in the key.
    pub fn resolve<'a>(&'a self, identifier: &'a str) -> &'a str {
        self.titles
            .get(identifier)
            .map(String::as_str)
            .unwrap_or(identifier)
    }

    /// `A2 1` → `AVENGERS VOL. 2 1`, `A@ 3` → `AVENGERS ANNUAL 3`.
    pub fn full_name(&self, identifier: &str, issue: Option<&str>, is_annual: bool) -> String {
        let mut name = self.resolve(identifier).to_string();
        if is_annual {
            name.push_str(" ANNUAL");
        }
        if let Some(issue) = issue {
            name.push(' ');
            name.push_str(issue);
        }
        name
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}
