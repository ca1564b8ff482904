//! `*Highlighted*` headline markup.

use once_cell::sync::Lazy;
use regex::Regex;

static MARKED_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*[^*]+\*").unwrap());

/// One run's worth of headline text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub highlighted: bool,
}

/// Split `headline` into plain and highlighted segments. A highlighted
/// segment is a `*…*` span with the asterisks removed. Empty segments are
/// dropped; a lone unmatched `*` stays in the plain text.
pub fn split_headline<'a>(headline: &'a str) -> Vec<Segment<'a>> {
    let mut segments = Vec::new();
    let mut last = 0;
    let mut push = |text: &'a str, highlighted: bool| {
        if !text.is_empty() {
            segments.push(Segment { text, highlighted });
        }
    };
    for m in MARKED_SPAN.find_iter(headline) {
        push(&headline[last..m.start()], false);
        push(&headline[m.start() + 1..m.end() - 1], true);
        last = m.end();
    }
    push(&headline[last..], false);
    segments
}

/// The headline with its markup removed, for templates that do not
/// highlight.
pub fn strip_markup(headline: &str) -> String {
    split_headline(headline).iter().map(|s| s.text).collect()
}
