// src/providers/chunk.rs
// Splits oversized HTML payloads at safe boundaries before provider calls.
//
// Strategy: split on closing paragraph tags first and greedily repack;
// pieces still above the limit are re-split on whitespace runs. A split
// never lands inside a word, so concatenating the translated chunks in
// order reproduces a well-formed document.

use regex::Regex;
use std::sync::OnceLock;

/// Payloads at or below this many characters go out in a single request.
pub const CHUNK_LIMIT: usize = 4500;

#[allow(clippy::expect_used)]
fn close_p_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</p\s*>").expect("static pattern"))
}

#[allow(clippy::expect_used)]
fn ws_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static pattern"))
}

/// Split `input` into chunks of at most `limit` characters.
///
/// Inputs within the limit come back as a single chunk. Chunk boundaries
/// fall after `</p>` tags where possible, otherwise on whitespace. A single
/// unbreakable token longer than the limit becomes its own oversized chunk
/// rather than being cut mid-word.
pub fn chunk_html(input: &str, limit: usize) -> Vec<String> {
    if input.chars().count() <= limit {
        return vec![input.to_string()];
    }

    let mut chunks = Vec::new();
    let mut buffer = String::new();

    for piece in split_keeping(close_p_re(), input) {
        if char_len(&buffer) + char_len(&piece) <= limit {
            buffer.push_str(&piece);
            continue;
        }
        flush(&mut chunks, &mut buffer);
        if char_len(&piece) <= limit {
            buffer.push_str(&piece);
        } else {
            // Paragraph itself is too large: fall back to whitespace splits.
            for token in split_keeping(ws_re(), &piece) {
                if char_len(&buffer) + char_len(&token) > limit {
                    flush(&mut chunks, &mut buffer);
                }
                buffer.push_str(&token);
            }
        }
    }
    flush(&mut chunks, &mut buffer);
    chunks
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn flush(chunks: &mut Vec<String>, buffer: &mut String) {
    if !buffer.is_empty() {
        chunks.push(std::mem::take(buffer));
    }
}

/// Split on a pattern, keeping each delimiter attached to the text before it.
fn split_keeping(re: &Regex, input: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut last = 0;
    for m in re.find_iter(input) {
        out.push(input[last..m.end()].to_string());
        last = m.end();
    }
    if last < input.len() {
        out.push(input[last..].to_string());
    }
    out
}
