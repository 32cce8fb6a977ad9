//! Markup cleanup for chronology entries and figure names.
//!
//! A chronology entry such as
//!
//! ```text
//! <a href="#X">ASM 101</a> | AVF 4-FB See HULK
//! ```
//!
//! cleans to the display text `ASM 101 | AVF 4-FB See HULK`, the comic tokens
//! `["ASM 101", "AVF 4-FB"]` and the redirect phrase `See HULK`.

use std::sync::LazyLock;

use regex::Regex;

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*?>").unwrap());

static RE_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

// "| cf XYZ |" cross-reference clause, up to the next pipe or end of entry
static RE_CF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\|\s*cf[^|]+(\||$)").unwrap());

static RE_STRAY_BRACKETS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\[{}\]]").unwrap());

/// `&amp;` goes last so that `&amp;lt;` stays a literal `&lt;`.
const ENTITIES: &[(&str, &str)] = &[
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&and;", "&"),
    ("&Ntilde;", "Ñ"),
    ("&hearts;", "HEART"),
    ("\n", ""),
    ("&amp;", "&"),
];

/// Separators between comic references on one entry, mapped to [`SEPARATOR`].
const TOKEN_SEPARATORS: &[&str] = &[" | ", " & ", "="];

const SEPARATOR: &str = " ~ ";

/// Phrases that start a redirect to another figure. Everything from the
/// marker to the end of the entry is a search alias, not a comic.
pub const REDIRECT_MARKERS: &[&str] = &[
    "(~",
    "(See",
    "See",
    "(From",
    "From",
    "Note",
    "Caution",
    "(may continue",
    "may continue",
    "between",
];

/// A cleaned chronology entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanEntry {
    /// Display text: tags removed, entities resolved, spaces collapsed.
    pub text: String,
    /// Comic reference tokens in entry order (may contain empty strings).
    pub comics: Vec<String>,
    /// Redirect phrases cut from the entry, empty when there were none.
    pub redirect: String,
}

/// Tags removed, entities resolved, whitespace collapsed.
pub fn clean_text(raw: &str) -> String {
    let stripped = strip_markup(raw);
    collapse_spaces(stripped.trim())
}

/// Clean one chronology entry and split it into comic tokens.
pub fn clean_entry(raw: &str) -> CleanEntry {
    // Separators are matched with single spaces around them
    let stripped = collapse_spaces(&strip_markup(raw));
    let text = stripped.trim().to_string();

    // A clause closed by a pipe still separates its neighbours
    let mut comics = RE_CF
        .replace_all(&stripped, |caps: &regex::Captures| {
            if &caps[1] == "|" { " | " } else { "" }
        })
        .into_owned();
    for sep in TOKEN_SEPARATORS {
        comics = comics.replace(sep, SEPARATOR);
    }
    let mut comics = RE_STRAY_BRACKETS.replace_all(&comics, "").into_owned();

    // Markers are cut in table order; each cut phrase goes in front of the
    // ones cut before it, so the result reads in source order.
    let mut redirect = String::new();
    for marker in REDIRECT_MARKERS {
        if let Some(pos) = comics.find(marker) {
            redirect = format!("{}{}", &comics[pos..], redirect);
            comics.truncate(pos);
        }
    }

    let comics = collapse_spaces(comics.trim());
    let comics = comics.split(SEPARATOR).map(str::to_string).collect();

    CleanEntry {
        text,
        comics,
        redirect,
    }
}

fn strip_markup(raw: &str) -> String {
    let mut s = RE_TAG.replace_all(raw, "").into_owned();
    for (entity, repl) in ENTITIES {
        s = s.replace(entity, repl);
    }
    s
}

fn collapse_spaces(s: &str) -> String {
    RE_SPACES.replace_all(s, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_strips_tags_and_entities() {
        assert_eq!(
            clean_text("<b>KL&amp;RT  [Skrull]</b>\n"),
            "KL&RT [Skrull]"
        );
        assert_eq!(clean_text("&lt;tag&gt; &Ntilde;"), "<tag> Ñ");
        assert_eq!(clean_text("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_clean_entry_single_comic() {
        let e = clean_entry("<a href=\"x\">A 1</a>");
        assert_eq!(e.text, "A 1");
        assert_eq!(e.comics, vec!["A 1"]);
        assert_eq!(e.redirect, "");
    }

    #[test]
    fn test_clean_entry_separators() {
        let e = clean_entry("ASM 101 | AVF 4-FB & FF 12=TTA 3");
        assert_eq!(e.comics, vec!["ASM 101", "AVF 4-FB", "FF 12", "TTA 3"]);
        // Ampersand inside an abbreviation is not a separator
        let e = clean_entry("KP&W 6");
        assert_eq!(e.comics, vec!["KP&W 6"]);
    }

    #[test]
    fn test_clean_entry_tabs_are_spaces() {
        let e = clean_entry("ASM\t5 |\tA 6");
        assert_eq!(e.text, "ASM 5 | A 6");
        assert_eq!(e.comics, vec!["ASM 5", "A 6"]);
        assert_eq!(clean_text("SPIDER-MAN\t\t[Human]"), "SPIDER-MAN [Human]");
    }

    #[test]
    fn test_clean_entry_drops_cf_clause() {
        let e = clean_entry("A 5 | cf UX 3 | A 6");
        assert_eq!(e.comics, vec!["A 5", "A 6"]);
        assert_eq!(e.text, "A 5 | cf UX 3 | A 6");
    }

    #[test]
    fn test_clean_entry_strips_brackets() {
        let e = clean_entry("[A 5] {FF 2}");
        assert_eq!(e.comics, vec!["A 5 FF 2"]);
    }

    #[test]
    fn test_clean_entry_redirect() {
        let e = clean_entry("ASM 50 See SPIDER-MAN");
        assert_eq!(e.comics, vec!["ASM 50"]);
        assert_eq!(e.redirect, "See SPIDER-MAN");
    }

    #[test]
    fn test_clean_entry_redirect_only() {
        let e = clean_entry("From HULK");
        assert_eq!(e.comics, vec![""]);
        assert_eq!(e.redirect, "From HULK");
        assert_eq!(e.text, "From HULK");
    }

    #[test]
    fn test_clean_entry_multiple_redirects_keep_source_order() {
        let e = clean_entry("A 1 From X Note Y");
        assert_eq!(e.comics, vec!["A 1"]);
        assert_eq!(e.redirect, "From X Note Y");
    }
}
