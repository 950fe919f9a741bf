//! Text normalization ahead of polarity scoring.
//!
//! Deterministic, pure and idempotent: feeding the output back in yields the
//! same string. Never fails; empty or all-whitespace input normalizes to the
//! empty string.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Normalize one raw snippet: decode HTML entities, lowercase, collapse
/// markdown links to their label, strip styling markers and bare URLs,
/// collapse whitespace, trim.
pub fn normalize(raw: &str) -> String {
    // 1) HTML entity decode (source APIs ship entity-encoded bodies)
    let mut out = html_escape::decode_html_entities(raw).to_string();

    // 2) Lowercase early; lexicon terms are all lowercase
    out = out.to_lowercase();

    // 3) Markdown links: keep the label, drop the target
    static RE_LINK: OnceCell<Regex> = OnceCell::new();
    let re_link = RE_LINK.get_or_init(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());
    out = re_link.replace_all(&out, "$1").to_string();

    // 4) Styling markers
    static RE_STYLE: OnceCell<Regex> = OnceCell::new();
    let re_style = RE_STYLE.get_or_init(|| Regex::new(r"[*_~`]").unwrap());
    out = re_style.replace_all(&out, "").to_string();

    // 5) Bare URLs carry no sentiment
    static RE_URL: OnceCell<Regex> = OnceCell::new();
    let re_url = RE_URL.get_or_init(|| Regex::new(r"https?://\S+|www\.\S+").unwrap());
    out = re_url.replace_all(&out, "").to_string();

    // 6) Collapse whitespace runs, trim
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_normalize_to_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t\n  "), "");
    }

    #[test]
    fn lowercases_and_collapses_whitespace() {
        assert_eq!(normalize("  BitCoin   IS\n\nGREAT  "), "bitcoin is great");
    }

    #[test]
    fn markdown_link_keeps_label() {
        assert_eq!(
            normalize("read [this analysis](https://example.com/a) now"),
            "read this analysis now"
        );
    }

    #[test]
    fn styling_markers_are_stripped() {
        assert_eq!(normalize("*very* _bullish_ ~maybe~ `code`"), "very bullish maybe code");
    }

    #[test]
    fn urls_are_removed_entirely() {
        assert_eq!(normalize("see https://example.com/x?y=1 and www.example.org ok"), "see and ok");
    }

    #[test]
    fn html_entities_are_decoded() {
        assert_eq!(normalize("pump &amp; dump"), "pump & dump");
    }

    #[test]
    fn normalization_is_a_fixed_point() {
        let samples = [
            "  *HODL* [to](http://x.y) the MOON!!  ",
            "plain text",
            "www.example.com",
            "",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }
}
