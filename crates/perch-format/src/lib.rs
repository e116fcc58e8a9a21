// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rich text formatting for Perch messages.
//!
//! Converts the constrained markup subset (`**bold**`, `*italic*`,
//! `~~strikethrough~~`, `==highlight==`) into sanitized HTML. Matching is
//! simple greedy regex replacement, deliberately non-nested: overlapping or
//! pathological delimiters are left literal rather than erroring.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("static regex"));
// Italic requires non-empty, asterisk-free content so an unpaired `**`
// degrades to literal text instead of an empty <em>.
static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("static regex"));
static STRIKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~~(.*?)~~").expect("static regex"));
static HIGHLIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"==(.*?)==").expect("static regex"));

/// The outcome of formatting one raw message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formatted {
    /// The raw input, untouched. This is what gets persisted as the plain
    /// body.
    pub text: String,
    /// Rendered HTML, present only when it differs from the plain-escaped
    /// rendering of `text`. Plain messages carry no markup payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

/// Escape the HTML metacharacters. Applied unconditionally before any
/// markup transform so user input can never inject tags.
fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Format a raw message body.
///
/// Transform order matters: bold runs before italic so a `**` pair is never
/// consumed as two single-asterisk delimiters.
pub fn format(raw: &str) -> Formatted {
    let escaped = escape(raw);

    let html = BOLD_RE.replace_all(&escaped, "<strong>$1</strong>");
    let html = ITALIC_RE.replace_all(&html, "<em>$1</em>");
    let html = STRIKE_RE.replace_all(&html, "<del>$1</del>");
    let html = HIGHLIGHT_RE.replace_all(&html, "<mark>$1</mark>");
    let html = html.replace('\n', "<br>");

    let plain = escaped.replace('\n', "<br>");

    Formatted {
        text: raw.to_string(),
        html: (html != plain).then_some(html),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_has_no_html() {
        let out = format("just a plain message");
        assert_eq!(out.text, "just a plain message");
        assert_eq!(out.html, None);
    }

    #[test]
    fn newlines_alone_are_not_markup() {
        // A line break renders identically in the plain form, so no html
        // payload is stored for it.
        let out = format("first line\nsecond line");
        assert_eq!(out.html, None);
    }

    #[test]
    fn bold_round_trip() {
        let out = format("**bold**");
        assert_eq!(out.text, "**bold**");
        assert_eq!(out.html.as_deref(), Some("<strong>bold</strong>"));
    }

    #[test]
    fn italic_strike_and_highlight() {
        assert_eq!(format("*lean*").html.as_deref(), Some("<em>lean</em>"));
        assert_eq!(format("~~gone~~").html.as_deref(), Some("<del>gone</del>"));
        assert_eq!(format("==note==").html.as_deref(), Some("<mark>note</mark>"));
    }

    #[test]
    fn combined_transforms_in_one_message() {
        let out = format("**bold** and *italic* and ~~old~~ and ==new==\ndone");
        assert_eq!(
            out.html.as_deref(),
            Some(
                "<strong>bold</strong> and <em>italic</em> and <del>old</del> \
                 and <mark>new</mark><br>done"
            )
        );
    }

    #[test]
    fn metacharacters_are_escaped_before_transforms() {
        let out = format("<script>alert(\"x\")</script> & **bold**");
        let html = out.html.expect("bold produces html");
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&quot;x&quot;"));
        assert!(html.contains("&amp;"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn unmatched_delimiters_stay_literal() {
        assert_eq!(format("a ** b").html, None);
        assert_eq!(format("half ~~done").html, None);
        assert_eq!(format("lone * star").html, None);
    }

    #[test]
    fn bold_is_not_eaten_by_italic() {
        // `**x**` must never come out as `<em><em>x</em></em>` or a
        // half-italic mess.
        let out = format("**x** *y*");
        assert_eq!(
            out.html.as_deref(),
            Some("<strong>x</strong> <em>y</em>")
        );
    }

    #[test]
    fn nested_delimiters_degrade_without_error() {
        // Nested markup has no guaranteed shape; the requirement is that
        // formatting returns something sane rather than erroring.
        let out = format("**outer *inner* outer**");
        assert_eq!(out.text, "**outer *inner* outer**");
        // Delimiters are consumed pairwise left to right.
        assert!(out.html.is_some());
    }

    #[test]
    fn escaping_applies_to_plain_comparison_too() {
        // A message that is only metacharacters escapes identically in both
        // forms, so it still counts as plain.
        assert_eq!(format("a < b & c").html, None);
    }
}
