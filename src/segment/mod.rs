//! Splitting source documents into per-figure chronology blocks.
//!
//! The two markup dialects share nothing but the output shape, so each has
//! its own strategy module; [`segment`] picks one from the partition's
//! [`Dialect`].

mod expand;
mod legacy;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::config::CorpusConfig;
use crate::error::{ExtractError, Result};
use crate::scanner::Corpus;
use crate::types::{Dialect, Partition};

// A figure in the old layout and on single-figure pages: starts after a
// blank line or at a bold tag, ends at the next paragraph/rule/break line.
static RE_FIND_FIGURES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?si)\n(\n|<b>)(?P<figure>.*?)(\n<p>|\n</span></p>|\n<hr>|\n<br>)").unwrap()
});

// Single-figure pages: list sits between the header table and the key image
static RE_SUB_DOCUMENT_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)</table>(?P<body>.*?)key\.gif").unwrap());

/// One figure's raw chronology block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    /// Figure name when the layout carries it outside the list; otherwise
    /// the name is the list's first line.
    pub name: Option<String>,
    pub chronolist: String,
    pub link: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// List never reached a closing line; text up to the next figure kept.
    UnterminatedList,
    /// The line after a closing line should be blank.
    TrailingText,
    /// Line between figures matching no figure pattern.
    UnrecognizedLine,
}

/// A recoverable segmentation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentWarning {
    pub document: String,
    /// 1-based line number
    pub line: usize,
    pub kind: WarningKind,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct Segmentation {
    pub blocks: Vec<RawBlock>,
    pub warnings: Vec<SegmentWarning>,
}

/// What a strategy needs besides the document text.
pub struct SegmentContext<'a> {
    pub corpus: &'a Corpus,
    pub config: &'a CorpusConfig,
}

impl SegmentContext<'_> {
    /// If `name_line` names a figure with a page of its own, return that
    /// page's list and link.
    fn sub_document(&self, name_line: &str) -> Result<Option<(String, String)>> {
        let Some(sub) = self
            .config
            .sub_documents
            .iter()
            .find(|s| name_line.contains(s.marker.as_str()))
        else {
            return Ok(None);
        };
        debug!(document = %sub.document, "using single-figure page");

        let text = self.corpus.document(&sub.document)?;
        let file = self.config.file_name(&sub.document);
        let body = RE_SUB_DOCUMENT_BODY
            .captures(text)
            .and_then(|c| c.name("body"))
            .ok_or_else(|| ExtractError::missing_section(&file, "chronology section"))?
            .as_str();
        let list = RE_FIND_FIGURES
            .captures(body)
            .and_then(|c| c.name("figure"))
            .ok_or_else(|| ExtractError::missing_section(&file, "chronology list"))?
            .as_str();

        Ok(Some((list.to_string(), self.config.document_link(&sub.document))))
    }
}

/// Split one partition document into figure blocks.
pub fn segment(partition: &Partition, text: &str, ctx: &SegmentContext) -> Result<Segmentation> {
    debug!(
        document = %partition.document,
        dialect = partition.dialect.as_str(),
        "segmenting"
    );
    match partition.dialect {
        Dialect::Legacy => legacy::segment(&partition.document, text, ctx),
        Dialect::Expandable => expand::segment(&partition.document, text, ctx),
    }
}

/// Byte offset of the first case-insensitive `<br>`.
fn find_br(s: &str) -> Option<usize> {
    s.to_ascii_lowercase().find("<br>")
}

fn starts_with_ci(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(prefix))
}
