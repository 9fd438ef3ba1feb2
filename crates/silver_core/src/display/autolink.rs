//! URL auto-linking for plain bullet content.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s<>"]+"#).expect("valid url regex")
});

const WWW_PREFIX: &str = "www.";
const SCHEME_SEPARATOR: &str = "://";
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\'', ']'];

/// One display fragment of bullet content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Span {
    /// Plain text, rendered as-is.
    Text { text: String },
    /// Recognized URL; `text` is the original substring.
    Link { text: String, href: String },
}

impl Span {
    /// Original content substring covered by this span.
    pub fn text(&self) -> &str {
        match self {
            Self::Text { text } | Self::Link { text, .. } => text,
        }
    }
}

/// Splits `content` into text and link spans.
///
/// Rules:
/// - `http://` and `https://` URLs link to themselves.
/// - `www.` hosts link to `https://` + host.
/// - Trailing sentence punctuation stays outside the link; a closing `)`
///   is kept only while it balances an opening `(` inside the link.
pub fn autolink(content: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    for found in URL_RE.find_iter(content) {
        let matched = trim_trailing(found.as_str());
        let host_start = matched
            .find(SCHEME_SEPARATOR)
            .map(|index| index + SCHEME_SEPARATOR.len())
            .unwrap_or(WWW_PREFIX.len());
        if matched.len() <= host_start {
            continue;
        }
        let start = found.start();
        let end = start + matched.len();

        if start > cursor {
            spans.push(Span::Text {
                text: content[cursor..start].to_string(),
            });
        }
        spans.push(Span::Link {
            text: matched.to_string(),
            href: link_target(matched),
        });
        cursor = end;
    }

    if cursor < content.len() {
        spans.push(Span::Text {
            text: content[cursor..].to_string(),
        });
    }
    spans
}

fn trim_trailing(matched: &str) -> &str {
    let mut trimmed = matched;
    loop {
        let stripped = trimmed.trim_end_matches(TRAILING_PUNCTUATION);
        let Some(inner) = stripped.strip_suffix(')') else {
            return stripped;
        };
        if stripped.matches('(').count() >= stripped.matches(')').count() {
            return stripped;
        }
        trimmed = inner;
    }
}

fn link_target(matched: &str) -> String {
    let prefix = matched.get(..WWW_PREFIX.len()).unwrap_or_default();
    if prefix.eq_ignore_ascii_case(WWW_PREFIX) {
        format!("https://{matched}")
    } else {
        matched.to_string()
    }
}
