//! The old fixed layout, still used by the alternate-continuity pages.
//!
//! ```text
//! <img src="key.gif">
//!
//! <b><a name="CAPTAIN_BRITAIN">CAPTAIN BRITAIN</a></b><br>
//! UXM 1<br>
//! UXM 2-FB<br>
//! <p>
//! ```
//!
//! Figures sit between two `key.gif` images (or after the `</h1>` heading
//! on the Killraven page), each starting after a blank line or a `<b>` and
//! ending at the next paragraph, rule or break line.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use super::{RE_FIND_FIGURES, RawBlock, SegmentContext, Segmentation, find_br};
use crate::error::{ExtractError, Result};

static RE_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)key\.gif(?P<body>.*?)key\.gif").unwrap());

static RE_BODY_FALLBACK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)</h1>(?P<body>.*?)<font").unwrap());

static RE_LINK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a[^>]*?name="(?P<link_name>.*?)""#).unwrap());

pub(super) fn segment(document: &str, text: &str, ctx: &SegmentContext) -> Result<Segmentation> {
    let file = ctx.config.file_name(document);
    let body = RE_BODY
        .captures(text)
        .or_else(|| RE_BODY_FALLBACK.captures(text))
        .and_then(|c| c.name("body"))
        .ok_or_else(|| ExtractError::missing_section(&file, "chronology section"))?
        .as_str();

    // A bold name right after <p> has no blank line in front of it
    let body = body.replace("<p><b>", "<p>\n\n<b>");

    let doc_link = ctx.config.document_link(document);
    let mut out = Segmentation::default();

    for caps in RE_FIND_FIGURES.captures_iter(&body) {
        let Some(found) = caps.name("figure") else {
            continue;
        };
        let mut list = found.as_str().to_string();

        // Decorative markup (e.g. "\n\n\n<hr>") matches too but has no list
        let Some(br) = find_br(&list) else {
            debug!(document = %file, "skipping block without line breaks");
            continue;
        };
        let first_row = list[..br].to_string();
        let first_row_lower = first_row.to_ascii_lowercase();

        let sub = ctx.sub_document(&first_row)?;
        if let Some((sub_list, _)) = &sub {
            list = sub_list.clone();
        }

        // Name row must be bold for downstream display
        if !first_row_lower.contains("<b>") {
            list.insert_str(0, "<b>");
        }
        if !first_row_lower.contains("</b>")
            && let Some(br) = find_br(&list)
        {
            list.insert_str(br, "</b>");
        }
        let list = list.replace("<a href=\"#", &format!("<a href=\"{doc_link}#"));

        let link = match sub {
            Some((_, sub_link)) => sub_link,
            None => match RE_LINK_NAME.captures(&first_row) {
                Some(m) => {
                    debug!(link_name = &m["link_name"], "figure anchor");
                    format!("{doc_link}#{}", &m["link_name"])
                }
                None => doc_link.clone(),
            },
        };

        out.blocks.push(RawBlock {
            name: None,
            chronolist: list,
            link,
        });
    }

    info!(document = %file, figures = out.blocks.len(), "legacy layout parsed");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Corpus;
    use crate::segment::tests::{SPIDEY_PAGE, context_with};

    const ULTIMATE: &str = "<html><img src=\"key.gif\">\n\
        \n\
        <b><a name=\"CAPTAIN_BRITAIN\">CAPTAIN BRITAIN</a></b><br>\n\
        UXM 1<br>\n\
        UXM 2-FB<br>\n\
        <p><b>COLOSSUS</b><br>\n\
        UXM 1<br>\n\
        <p>\n\
        \n\
        \n\
        <hr>\n\
        \n\
        MAGIK<br>\n\
        <a href=\"#COLOSSUS\">UXM 3</a><br>\n\
        <hr>\n\
        <img src=\"key.gif\"></html>";

    fn run(text: &str) -> Result<Segmentation> {
        let corpus = Corpus::from_documents([("spidey", SPIDEY_PAGE)]);
        let ctx = context_with(&corpus);
        segment("ultimate", text, &ctx)
    }

    #[test]
    fn test_blocks_found() {
        let out = run(ULTIMATE).expect("segment");
        assert_eq!(out.blocks.len(), 3);
        assert!(out.warnings.is_empty());
        assert!(out.blocks[0].chronolist.contains("UXM 2-FB<br>"));
        assert!(out.blocks[0].name.is_none());
    }

    #[test]
    fn test_anchor_link() {
        let out = run(ULTIMATE).expect("segment");
        assert_eq!(
            out.blocks[0].link,
            "http://www.chronologyproject.com/ultimate.php#CAPTAIN_BRITAIN"
        );
        assert_eq!(
            out.blocks[1].link,
            "http://www.chronologyproject.com/ultimate.php"
        );
    }

    #[test]
    fn test_bold_name_without_blank_line() {
        let out = run(ULTIMATE).expect("segment");
        assert!(out.blocks[1].chronolist.starts_with("<b>COLOSSUS</b><br>"));
    }

    #[test]
    fn test_name_made_bold() {
        let out = run(ULTIMATE).expect("segment");
        assert!(out.blocks[2].chronolist.starts_with("<b>MAGIK</b><br>"));
    }

    #[test]
    fn test_local_anchor_made_absolute() {
        let out = run(ULTIMATE).expect("segment");
        assert!(out.blocks[2].chronolist.contains(
            "<a href=\"http://www.chronologyproject.com/ultimate.php#COLOSSUS\">UXM 3</a>"
        ));
    }

    #[test]
    fn test_fallback_body_markers() {
        let text = "<h1>KILLRAVEN</h1>\n\nKILLRAVEN<br>\nAMZ 18<br>\n<p>\n<font>";
        let out = run(text).expect("segment");
        assert_eq!(out.blocks.len(), 1);
        assert!(out.blocks[0].chronolist.contains("AMZ 18"));
    }

    #[test]
    fn test_sub_document_swap() {
        let text = "key.gif\n\n<b>SPIDER-MAN Chronology Page</b><br>\nsee page<br>\n<p>key.gif";
        let out = run(text).expect("segment");
        assert_eq!(out.blocks.len(), 1);
        assert!(out.blocks[0].chronolist.contains("ASM 1<br>"));
        assert_eq!(
            out.blocks[0].link,
            "http://www.chronologyproject.com/spidey.php"
        );
    }

    #[test]
    fn test_missing_body_is_fatal() {
        let err = run("<html>no figures</html>").unwrap_err();
        assert!(matches!(err, ExtractError::MissingSection { .. }));
    }
}
