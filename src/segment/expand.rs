//! The expand/collapse layout used by the per-letter pages.
//!
//! ```text
//! <p id="ANGEL_III"><span class="char">ANGEL III</span><br>
//! <span class="chron">
//! X 1<br>
//! X 2-FB<br>
//! </span></p>
//!
//! <p id="ANT"><b>ANT</b><br>
//! ...
//! ```
//!
//! The page is read line by line: a name line opens a figure, the list runs
//! until one of the closing lines, and a blank line is expected after it. A
//! `<hr>` after the first figure ends the page.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use super::{RawBlock, SegmentContext, SegmentWarning, Segmentation, WarningKind, starts_with_ci};
use crate::error::{ExtractError, Result};
use crate::normalize::clean_text;

// <p id="X"><span class="char">NAME</span><br>
static RE_FIGURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<(p id=|a name=)"(?P<id>[^"]+)"><span class="char">(?P<name>.+)</span><br>"#)
        .unwrap()
});

// Name lines without the expandable span, or glued to the previous close
static RE_FIGURE_PLAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(<p( id="(?P<id>[^"]+)"|)>(<span class="char">|)<b>|</span></p>|<p></p>|<span></p><b>)(?P<name>.+)(<br>|</p>|</a></b>)"#,
    )
    .unwrap()
});

const METADATA_LINE: &str = "<span class=\"chron\">";

const CLOSING_LINES: &[&str] = &[
    "</span></p>",
    "</p>",
    "<p></p>",
    "</font></span></p><font>",
];

const PAGE_END: &str = "<hr>";

fn is_closing(line: &str) -> bool {
    CLOSING_LINES.iter().any(|c| line.starts_with(c))
}

fn is_name_line(line: &str) -> bool {
    RE_FIGURE.is_match(line) || RE_FIGURE_PLAIN.is_match(line)
}

/// Closing line with the next figure's name on the same line, e.g.
/// `</span></p><b>CYCLOPS</b><br>`.
fn carries_name(line: &str) -> bool {
    CLOSING_LINES
        .iter()
        .find_map(|c| line.strip_prefix(c))
        .is_some_and(|rest| !rest.trim().is_empty())
        && RE_FIGURE_PLAIN.is_match(line)
}

pub(super) fn segment(document: &str, text: &str, ctx: &SegmentContext) -> Result<Segmentation> {
    let file = ctx.config.file_name(document);
    let doc_link = ctx.config.document_link(document);
    let lines: Vec<&str> = text.split('\n').collect();

    let mut out = Segmentation::default();
    let warn_at = |out: &mut Segmentation, line: usize, kind: WarningKind| {
        let text = lines.get(line).copied().unwrap_or("").to_string();
        warn!(document = %file, line = line + 1, ?kind, %text, "layout problem");
        out.warnings.push(SegmentWarning {
            document: file.clone(),
            line: line + 1,
            kind,
            text,
        });
    };

    let mut first_found = false;
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if first_found && starts_with_ci(line, PAGE_END) {
            break;
        }

        let caps = RE_FIGURE
            .captures(line)
            .or_else(|| RE_FIGURE_PLAIN.captures(line));
        let Some(caps) = caps else {
            if first_found {
                warn_at(&mut out, i, WarningKind::UnrecognizedLine);
            }
            i += 1;
            i = skip_blank(&lines, i);
            continue;
        };

        first_found = true;
        let name_i = i;
        let name = caps.name("name").map(|m| clean_text(m.as_str())).unwrap_or_default();
        let link = match caps.name("id") {
            Some(id) => format!("{doc_link}#{}", id.as_str()),
            None => doc_link.clone(),
        };

        i += 1;
        if i < lines.len() && starts_with_ci(lines[i], METADATA_LINE) {
            i += 1;
        }

        // Scan for the closing line; a new name line or the page end
        // before it means the list was never closed
        let mut closed = false;
        while i < lines.len() {
            let l = lines[i];
            if is_closing(l) {
                closed = true;
                break;
            }
            if starts_with_ci(l, PAGE_END) || is_name_line(l) {
                break;
            }
            i += 1;
        }
        let end = i;

        let (chronolist, link, name) = match ctx.sub_document(lines[name_i])? {
            Some((list, sub_link)) => (list, sub_link, None),
            None => (lines[name_i + 1..end].join("\n"), link, Some(name)),
        };
        out.blocks.push(RawBlock {
            name,
            chronolist,
            link,
        });

        if !closed {
            warn_at(&mut out, name_i, WarningKind::UnterminatedList);
            i = skip_blank(&lines, i);
            continue;
        }

        if carries_name(lines[i]) {
            continue;
        }

        // Past the closing line a blank line is expected; anything else is
        // kept for the next round instead of being skipped
        i += 1;
        if i < lines.len() {
            let after = lines[i];
            if starts_with_ci(after, PAGE_END) {
                break;
            }
            if after.trim().is_empty() {
                i += 1;
            } else {
                warn_at(&mut out, i, WarningKind::TrailingText);
            }
        }
        i = skip_blank(&lines, i);
    }

    if !first_found {
        return Err(ExtractError::missing_section(&file, "chronology section"));
    }

    info!(
        document = %file,
        figures = out.blocks.len(),
        warnings = out.warnings.len(),
        "expandable layout parsed"
    );
    Ok(out)
}

fn skip_blank(lines: &[&str], mut i: usize) -> usize {
    while i < lines.len() && lines[i].trim().is_empty() {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Corpus;
    use crate::segment::tests::{SPIDEY_PAGE, context_with};

    const PAGE_A: &str = "<html>\n\
        <h1>A</h1>\n\
        \n\
        <p id=\"ANGEL_III\"><span class=\"char\">ANGEL III</span><br>\n\
        <span class=\"chron\">\n\
        X 1<br>\n\
        X 2-FB<br>\n\
        </span></p>\n\
        \n\
        <p id=\"ANT\"><b>ANT &amp; WASP</b><br>\n\
        TTA 27<br>\n\
        </p>\n\
        \n\
        <p><b>SPIDER-MAN Chronology Page</b><br>\n\
        </p>\n\
        \n\
        <hr>\n\
        <p id=\"IGNORED\"><b>AFTER THE END</b><br>\n";

    fn run(text: &str) -> Result<Segmentation> {
        let corpus = Corpus::from_documents([("spidey", SPIDEY_PAGE)]);
        let ctx = context_with(&corpus);
        segment("a", text, &ctx)
    }

    #[test]
    fn test_blocks_found() {
        let out = run(PAGE_A).expect("segment");
        assert_eq!(out.blocks.len(), 3);
        assert!(out.warnings.is_empty(), "{:?}", out.warnings);

        let angel = &out.blocks[0];
        assert_eq!(angel.name.as_deref(), Some("ANGEL III"));
        assert_eq!(angel.link, "http://www.chronologyproject.com/a.php#ANGEL_III");
        assert!(angel.chronolist.contains("X 2-FB<br>"));
        assert!(!angel.chronolist.contains("</span></p>"));

        assert_eq!(out.blocks[1].name.as_deref(), Some("ANT & WASP"));
    }

    #[test]
    fn test_sub_document_swap() {
        let out = run(PAGE_A).expect("segment");
        let spidey = &out.blocks[2];
        assert!(spidey.name.is_none());
        assert!(spidey.chronolist.contains("ASM 1<br>"));
        assert_eq!(spidey.link, "http://www.chronologyproject.com/spidey.php");
    }

    #[test]
    fn test_unterminated_list_keeps_text() {
        let text = "<p id=\"B\"><span class=\"char\">BEAST</span><br>\n\
            UX 1<br>\n\
            UX 2<br>\n\
            <p id=\"C\"><span class=\"char\">CYCLOPS</span><br>\n\
            UX 1<br>\n\
            </span></p>\n";
        let out = run(text).expect("segment");
        assert_eq!(out.blocks.len(), 2);
        assert_eq!(out.blocks[0].chronolist, "UX 1<br>\nUX 2<br>");
        assert_eq!(out.blocks[1].name.as_deref(), Some("CYCLOPS"));
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].kind, WarningKind::UnterminatedList);
        assert_eq!(out.warnings[0].line, 1);
    }

    #[test]
    fn test_unterminated_list_before_bold_name() {
        let text = "<p id=\"B\"><span class=\"char\">BEAST</span><br>\n\
            UX 1<br>\n\
            UX 2<br>\n\
            <p id=\"C\"><b>CYCLOPS</b><br>\n\
            UX 9<br>\n\
            </p>\n";
        let out = run(text).expect("segment");
        assert_eq!(out.blocks.len(), 2);
        assert_eq!(out.blocks[0].chronolist, "UX 1<br>\nUX 2<br>");
        assert_eq!(out.blocks[1].name.as_deref(), Some("CYCLOPS"));
        assert_eq!(out.blocks[1].chronolist, "UX 9<br>");
        assert_eq!(out.blocks[1].link, "http://www.chronologyproject.com/a.php#C");
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].kind, WarningKind::UnterminatedList);
    }

    #[test]
    fn test_name_glued_to_closing_line() {
        let text = "<p id=\"B\"><span class=\"char\">BEAST</span><br>\n\
            UX 1<br>\n\
            </span></p><b>CYCLOPS</b><br>\n\
            UX 9<br>\n\
            </p>\n";
        let out = run(text).expect("segment");
        assert_eq!(out.blocks.len(), 2);
        assert_eq!(out.blocks[0].chronolist, "UX 1<br>");
        assert_eq!(out.blocks[1].name.as_deref(), Some("CYCLOPS"));
        assert_eq!(out.blocks[1].chronolist, "UX 9<br>");
        assert!(out.warnings.is_empty(), "{:?}", out.warnings);
    }

    #[test]
    fn test_text_after_close_is_warned_not_lost() {
        let text = "<p id=\"B\"><span class=\"char\">BEAST</span><br>\n\
            UX 1<br>\n\
            </span></p>\n\
            <p id=\"C\"><span class=\"char\">CYCLOPS</span><br>\n\
            UX 1<br>\n\
            </span></p>\n";
        let out = run(text).expect("segment");
        assert_eq!(out.blocks.len(), 2);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].kind, WarningKind::TrailingText);
    }

    #[test]
    fn test_stray_line_between_figures() {
        let text = "<p id=\"B\"><span class=\"char\">BEAST</span><br>\n\
            UX 1<br>\n\
            </span></p>\n\
            \n\
            stray text\n\
            <p id=\"C\"><span class=\"char\">CYCLOPS</span><br>\n\
            UX 1<br>\n\
            </span></p>\n";
        let out = run(text).expect("segment");
        assert_eq!(out.blocks.len(), 2);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].kind, WarningKind::UnrecognizedLine);
        assert_eq!(out.warnings[0].text, "stray text");
    }

    #[test]
    fn test_list_closed_by_page_end_is_kept() {
        let text = "<p id=\"B\"><span class=\"char\">BEAST</span><br>\n\
            UX 1<br>\n\
            </span></p>\n\
            <hr>\n";
        let out = run(text).expect("segment");
        assert_eq!(out.blocks.len(), 1);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_no_figures_is_fatal() {
        let err = run("<html>\n<h1>A</h1>\n</html>\n").unwrap_err();
        assert!(matches!(err, ExtractError::MissingSection { .. }));
    }
}
