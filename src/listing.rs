//! Ordering for the plain-text comic list.

use crate::token::split_identifier_and_number;

const ISSUE_WIDTH: usize = 4;

/// Sort key: identifier, a space, then the issue with its leading digit run
/// zero-padded to four places so "X 2" sorts before "X 10".
pub fn sort_key(comicstr: &str) -> String {
    match split_identifier_and_number(comicstr) {
        (identifier, Some(issue)) => {
            let digits = issue.chars().take_while(char::is_ascii_digit).count();
            let pad = "0".repeat(ISSUE_WIDTH.saturating_sub(digits));
            format!("{identifier} {pad}{issue}")
        }
        (_, None) => comicstr.to_string(),
    }
}

/// Sort comic references for listing.
pub fn sort_comics<S: AsRef<str>>(comics: &mut [S]) {
    comics.sort_by_cached_key(|c| (sort_key(c.as_ref()), c.as_ref().to_string()));
}
