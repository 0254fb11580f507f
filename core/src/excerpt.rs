//! Excerpt windows with highlighted matches.
//!
//! Highlights are byte ranges into `Excerpt::text`. Windows are cut on
//! character boundaries and then pulled inward so that no word straddles an
//! edge, which means a highlighted token is always whole.

use crate::tokenizer::{tokenize, Token};
use serde::Serialize;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExcerptSource {
    Text,
    Title,
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Excerpt {
    pub text: String,
    pub highlights: Vec<Range<usize>>,
    pub source: ExcerptSource,
    pub truncated_start: bool,
    pub truncated_end: bool,
}

impl Excerpt {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Highlighted substrings, in order.
    pub fn marked(&self) -> impl Iterator<Item = &str> {
        self.highlights.iter().map(move |r| &self.text[r.clone()])
    }

    /// HTML-escaped text with highlights wrapped in `open`/`close` and an
    /// ellipsis on truncated edges.
    pub fn render(&self, open: &str, close: &str) -> String {
        let mut out = String::with_capacity(self.text.len() + self.highlights.len() * (open.len() + close.len()) + 8);
        if self.truncated_start {
            out.push('…');
        }
        let mut cursor = 0;
        for r in &self.highlights {
            push_escaped(&mut out, &self.text[cursor..r.start]);
            out.push_str(open);
            push_escaped(&mut out, &self.text[r.clone()]);
            out.push_str(close);
            cursor = r.end;
        }
        push_escaped(&mut out, &self.text[cursor..]);
        if self.truncated_end {
            out.push('…');
        }
        out
    }

    pub fn to_html(&self) -> String {
        self.render("<em>", "</em>")
    }
}

fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// Window of at most `max_chars` characters of `text` around the first token
/// accepted by `is_match`. `None` if nothing in `text` matches.
///
/// A single matched token longer than `max_chars` is returned whole.
pub fn text_excerpt(text: &str, is_match: impl Fn(&str) -> bool, max_chars: usize) -> Option<Excerpt> {
    anchored_excerpt(text, &is_match, &is_match, max_chars)
}

/// Like [`text_excerpt`], but the window is centred on the first token
/// accepted by `anchor` when there is one. Every `is_match` token inside the
/// window is highlighted.
pub fn anchored_excerpt(
    text: &str,
    anchor: impl Fn(&str) -> bool,
    is_match: impl Fn(&str) -> bool,
    max_chars: usize,
) -> Option<Excerpt> {
    let tokens = tokenize(text);
    let matched: Vec<&Token> = tokens.iter().filter(|t| is_match(&t.term)).collect();
    let fallback = *matched.first()?;
    let first = matched.iter().copied().find(|t| anchor(&t.term)).unwrap_or(fallback);

    // byte offset of every char start, plus the end
    let bounds: Vec<usize> = text.char_indices().map(|(b, _)| b).chain(std::iter::once(text.len())).collect();
    let n_chars = bounds.len() - 1;
    let char_of = |byte: usize| bounds.partition_point(|&b| b < byte);

    let (mut start, mut end) = if n_chars <= max_chars {
        (0, text.len())
    } else {
        let cs = char_of(first.span.start);
        let ce = char_of(first.span.end);
        let len = ce - cs;
        if len >= max_chars {
            (first.span.start, first.span.end)
        } else {
            let slack = max_chars - len;
            let mut ws = cs.saturating_sub(slack / 2);
            let mut we = ws + max_chars;
            if we > n_chars {
                we = n_chars;
                ws = n_chars - max_chars;
            }
            (bounds[ws], bounds[we])
        }
    };

    // Pull edges inward off any word they cut through. Short words are not
    // tokens, so scan alphanumeric runs directly.
    let is_word = |c: char| c.is_alphanumeric();
    if start > 0 && start < end {
        let before = text[..start].chars().next_back().is_some_and(is_word);
        let after = text[start..].chars().next().is_some_and(is_word);
        if before && after {
            start += text[start..end].find(|c: char| !is_word(c)).unwrap_or(end - start);
        }
    }
    if end < text.len() && end > start {
        let before = text[..end].chars().next_back().is_some_and(is_word);
        let after = text[end..].chars().next().is_some_and(is_word);
        if before && after {
            end = text[start..end].rfind(|c: char| !is_word(c)).map_or(start, |i| start + i);
        }
    }
    // Edge-snapping can only discard neighbours; the first match was centred.
    if start > first.span.start || end < first.span.end {
        start = first.span.start;
        end = first.span.end;
    }

    let slice = &text[start..end];
    let trimmed_start = start + (slice.len() - slice.trim_start().len());
    let trimmed_end = end - (slice.len() - slice.trim_end().len());

    let highlights = matched
        .iter()
        .filter(|t| t.span.start >= trimmed_start && t.span.end <= trimmed_end)
        .map(|t| (t.span.start - trimmed_start)..(t.span.end - trimmed_start))
        .collect();

    Some(Excerpt {
        text: text[trimmed_start..trimmed_end].to_string(),
        highlights,
        source: ExcerptSource::Text,
        truncated_start: !text[..trimmed_start].trim().is_empty(),
        truncated_end: !text[trimmed_end..].trim().is_empty(),
    })
}

/// The whole title with matching tokens highlighted.
pub fn title_excerpt(title: &str, is_match: impl Fn(&str) -> bool) -> Excerpt {
    let highlights = tokenize(title).into_iter().filter(|t| is_match(&t.term)).map(|t| t.span).collect();
    Excerpt {
        text: title.to_string(),
        highlights,
        source: ExcerptSource::Title,
        truncated_start: false,
        truncated_end: false,
    }
}
