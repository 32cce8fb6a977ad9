//! Splitting a comic reference into identifier, issue number and appendix.
//!
//! Real data examples:
//!   `A 256-FB`     → base `A 256`, appendix `-FB`
//!   `W2 1(2)`      → base `W2 1`, appendix `(2)`
//!   `A '98`        → identifier `A`, issue `'98`
//!   `IM@ 3`        → identifier `IM`, issue `3`, annual
//!   `W:DOOMBRINGER`→ identifier `W:DOOMBRINGER`, no issue

use std::sync::LazyLock;

use regex::Regex;

/// Markers that start the appendix of a reference, in priority order.
pub const APPENDIX_MARKERS: &[&str] = &["-FB", "-BTS", "-OP", "-VO", "(", "pg", "Pg"];

// {identifier} {issue}: issue may carry a sign/apostrophe, a fraction, a
// letter variant (A/B) and a slash part, e.g. "'98", "-1", "1.5", "12A", "1/2"
static RE_IDENT_ISSUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<ident>.+?) (?P<issue>['-]?[.\d]*[A-B]?/?\d+[A-B]?)$").unwrap()
});

// Annual marker glued to the identifier: "A@", "A@2"
static RE_ANNUAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@2?$").unwrap());

/// One reference missing the space between identifier and issue.
const MALFORMED_REFERENCES: &[(&str, &str)] = &[("CA152", "CA 152")];

/// A fully split comic reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComicToken {
    /// Reference without appendix; the comic record key.
    pub base: String,
    pub appendix: String,
    /// Identifier with any annual marker removed.
    pub identifier: String,
    pub issue: Option<String>,
    pub is_annual: bool,
}

impl ComicToken {
    pub fn parse(token: &str) -> Self {
        let (base, appendix) = split_appendix(token);
        let base = fix_malformed(base).to_string();
        let (identifier, issue) = split_identifier_and_number(&base);
        let (identifier, is_annual) = split_annual(identifier);
        ComicToken {
            identifier: identifier.to_string(),
            issue: issue.map(str::to_string),
            is_annual,
            base,
            appendix: appendix.to_string(),
        }
    }
}

/// Split off the appendix starting at the leftmost marker; on equal
/// positions the marker listed first wins. The base is trimmed.
pub fn split_appendix(token: &str) -> (&str, &str) {
    let earliest = APPENDIX_MARKERS
        .iter()
        .filter_map(|m| token.find(m))
        .min();
    match earliest {
        Some(pos) => (token[..pos].trim(), &token[pos..]),
        None => (token, ""),
    }
}

/// Split a base reference into identifier and issue number. Without a
/// trailing issue the whole string is the identifier.
pub fn split_identifier_and_number(base: &str) -> (&str, Option<&str>) {
    match RE_IDENT_ISSUE.captures(base) {
        Some(caps) => match (caps.name("ident"), caps.name("issue")) {
            (Some(ident), Some(issue)) => (ident.as_str(), Some(issue.as_str())),
            _ => (base, None),
        },
        None => (base, None),
    }
}

/// Strip a trailing annual marker from an identifier.
pub fn split_annual(identifier: &str) -> (&str, bool) {
    match RE_ANNUAL.find(identifier) {
        Some(m) => (&identifier[..m.start()], true),
        None => (identifier, false),
    }
}

fn fix_malformed(base: &str) -> &str {
    MALFORMED_REFERENCES
        .iter()
        .find(|(bad, _)| *bad == base)
        .map(|(_, good)| *good)
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_appendix() {
        assert_eq!(split_appendix("A 256-FB"), ("A 256", "-FB"));
        assert_eq!(split_appendix("A 1"), ("A 1", ""));
        assert_eq!(split_appendix("W2 1-BTS-FB"), ("W2 1", "-BTS-FB"));
        assert_eq!(split_appendix("ASM 5 (2)"), ("ASM 5", "(2)"));
        assert_eq!(split_appendix("FF 3 pg 4-FB"), ("FF 3", "pg 4-FB"));
    }

    #[test]
    fn test_split_appendix_leftmost_wins() {
        // "-FB" appears after "(" here
        assert_eq!(split_appendix("A 1(2)-FB"), ("A 1", "(2)-FB"));
    }

    #[test]
    fn test_split_identifier_and_number() {
        assert_eq!(split_identifier_and_number("A 1"), ("A", Some("1")));
        assert_eq!(split_identifier_and_number("A 1.5"), ("A", Some("1.5")));
        assert_eq!(split_identifier_and_number("A:DV"), ("A:DV", None));
        assert_eq!(split_identifier_and_number("A@ 1"), ("A@", Some("1")));
        assert_eq!(split_identifier_and_number("A '98"), ("A", Some("'98")));
        assert_eq!(split_identifier_and_number("X -1"), ("X", Some("-1")));
        assert_eq!(split_identifier_and_number("UX 12A"), ("UX", Some("12A")));
    }

    #[test]
    fn test_split_identifier_multiword() {
        assert_eq!(
            split_identifier_and_number("MARVEL MYSTERY COMICS 9"),
            ("MARVEL MYSTERY COMICS", Some("9"))
        );
        assert_eq!(
            split_identifier_and_number("CIVIL WAR"),
            ("CIVIL WAR", None)
        );
    }

    #[test]
    fn test_split_annual() {
        assert_eq!(split_annual("A@"), ("A", true));
        assert_eq!(split_annual("A@2"), ("A", true));
        assert_eq!(split_annual("A"), ("A", false));
        assert_eq!(split_annual("A@B"), ("A@B", false));
    }

    #[test]
    fn test_parse_annual_token() {
        let t = ComicToken::parse("A@ 1-FB");
        assert_eq!(t.base, "A@ 1");
        assert_eq!(t.appendix, "-FB");
        assert_eq!(t.identifier, "A");
        assert_eq!(t.issue.as_deref(), Some("1"));
        assert!(t.is_annual);
    }

    #[test]
    fn test_parse_fixes_known_malformed_reference() {
        let t = ComicToken::parse("CA152");
        assert_eq!(t.base, "CA 152");
        assert_eq!(t.identifier, "CA");
        assert_eq!(t.issue.as_deref(), Some("152"));
    }
}
