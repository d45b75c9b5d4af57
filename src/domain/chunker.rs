//! Line-preserving splitter for texts that exceed the transport's message size.
//!
//! Lengths are counted in `char`s, never bytes, so hard splits never land inside a
//! multi-byte character.

/// Operative ceiling for a single outgoing chat message.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Split `text` into chunks of at most `max_len` characters.
///
/// Lines are accumulated while `current + line + 1 <= max_len`. On overflow the current
/// chunk is flushed (trimmed) and the line starts the next chunk. A line that alone is
/// longer than `max_len` is hard-split at the boundary; its remainder starts the next
/// chunk. Content is never dropped or reordered; whitespace-only chunks are not emitted.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in text.split('\n') {
        let line_len = line.chars().count();

        if current_len + line_len + 1 > max_len {
            if !current.is_empty() {
                push_trimmed(&mut chunks, &current);
                current.clear();
            }

            let mut rest = line;
            while rest.chars().count() > max_len {
                let cut = byte_offset(rest, max_len);
                chunks.push(rest[..cut].to_string());
                rest = &rest[cut..];
            }
            current.push_str(rest);
            current_len = rest.chars().count();
        } else {
            if !current.is_empty() {
                current.push('\n');
                current_len += 1;
            }
            current.push_str(line);
            current_len += line_len;
        }
    }

    push_trimmed(&mut chunks, &current);
    chunks
}

fn push_trimmed(chunks: &mut Vec<String>, chunk: &str) {
    let trimmed = chunk.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Byte offset of the `n`-th char boundary in `s` (or `s.len()` if shorter).
fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}
