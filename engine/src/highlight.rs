use std::collections::HashSet;

use crate::tokenizer::{tokenize_with_offsets, Token};

pub const PRE_TAG: &str = "<em>";
pub const POST_TAG: &str = "</em>";

/// Fragment of `text` around the first token whose normalized form is in
/// `matched`, with every matched token inside the fragment wrapped in tags.
///
/// The fragment is the whole value when it is short enough, else the sentence
/// holding the first match, else a `fragment_size`-character window starting
/// near it. If even that window cannot hold the first match, the whole value
/// is used. `None` when nothing in `text` matched.
pub fn highlight(text: &str, matched: &HashSet<String>, fragment_size: usize) -> Option<String> {
    if matched.is_empty() {
        return None;
    }
    let hits: Vec<Token> = tokenize_with_offsets(text)
        .into_iter()
        .filter(|t| matched.contains(&t.term))
        .collect();
    let first = hits.first()?;
    let (start, end) = fragment_window(text, first, fragment_size);
    Some(mark(text, &hits, start, end))
}

fn fragment_window(text: &str, first: &Token, fragment_size: usize) -> (usize, usize) {
    if text.chars().count() <= fragment_size {
        return (0, text.len());
    }
    let (s_start, s_end) = sentence_bounds(text, first.start);
    if text[s_start..s_end].chars().count() <= fragment_size {
        return (s_start, s_end);
    }

    let start = if text[s_start..first.end].chars().count() <= fragment_size { s_start } else { first.start };
    let mut end = advance_chars(text, start, fragment_size);
    if end < text.len() {
        // avoid cutting a word in half
        if let Some(ws) = text[start..end].rfind(char::is_whitespace) {
            if start + ws >= first.end {
                end = start + ws;
            }
        }
    }
    if first.end > end {
        return (0, text.len());
    }
    (start, end)
}

fn sentence_bounds(text: &str, pos: usize) -> (usize, usize) {
    let is_break = |after: usize| after == text.len() || text[after..].starts_with(char::is_whitespace);

    let mut start = 0;
    for (i, c) in text[..pos].char_indices() {
        if matches!(c, '.' | '!' | '?') && is_break(i + 1) {
            start = i + 1;
        }
    }
    start += text[start..].len() - text[start..].trim_start().len();

    let mut end = text.len();
    for (i, c) in text[pos..].char_indices() {
        let after = pos + i + 1;
        if matches!(c, '.' | '!' | '?') && is_break(after) {
            end = after;
            break;
        }
    }
    (start, end)
}

fn advance_chars(text: &str, start: usize, n: usize) -> usize {
    text[start..]
        .char_indices()
        .nth(n)
        .map(|(i, _)| start + i)
        .unwrap_or(text.len())
}

fn mark(text: &str, hits: &[Token], start: usize, end: usize) -> String {
    let mut out = String::with_capacity(end - start + hits.len() * (PRE_TAG.len() + POST_TAG.len()));
    let mut cursor = start;
    for t in hits.iter().filter(|t| t.start >= start && t.end <= end) {
        out.push_str(&text[cursor..t.start]);
        out.push_str(PRE_TAG);
        out.push_str(&text[t.start..t.end]);
        out.push_str(POST_TAG);
        cursor = t.end;
    }
    out.push_str(&text[cursor..end]);
    out
}
