use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Terminal punctuation followed by the whitespace run that separates two sentences
static SENTENCE_BOUNDARY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("sentence pattern is valid"));

/// Collapse every whitespace run (spaces, tabs, newlines) into a single space and trim both ends
pub fn optimize_text(text: &str) -> String {
    WHITESPACE_PATTERN.replace_all(text, " ").trim().to_string()
}

/// Split text into chunks of at most `max_chunk_size` characters.
///
/// Text that already fits is returned as a single chunk (empty text included). Longer text is
/// cut at sentence boundaries and sentences are packed greedily, joined by a single space. A
/// sentence longer than the bound is hard-split into slices of exactly `max_chunk_size`
/// characters and its remainder goes back to normal packing.
///
/// Lengths are counted in characters, so multi-byte text is never cut inside a code point.
pub fn split_text_into_chunks(text: &str, max_chunk_size: usize) -> Vec<String> {
    let max_chunk_size = max_chunk_size.max(1);

    if char_len(text) <= max_chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current_chunk = String::new();

    for sentence in split_sentences(text) {
        let mut sentence = sentence;

        // TODO: split oversized sentences on word boundaries instead of a hard cut
        while char_len(sentence) > max_chunk_size {
            if !current_chunk.is_empty() {
                chunks.push(std::mem::take(&mut current_chunk));
            }
            let (head, tail) = split_at_char(sentence, max_chunk_size);
            chunks.push(head.to_string());
            sentence = tail;
        }

        let potential_chunk = format!("{} {}", current_chunk, sentence);
        let potential_chunk = potential_chunk.trim();
        if char_len(potential_chunk) <= max_chunk_size {
            current_chunk = potential_chunk.to_string();
        } else {
            chunks.push(std::mem::replace(&mut current_chunk, sentence.to_string()));
        }
    }

    if !current_chunk.is_empty() {
        chunks.push(current_chunk);
    }

    tracing::debug!(
        text_length = char_len(text),
        max_chunk_size,
        chunk_count = chunks.len(),
        "Text split into chunks"
    );

    chunks
}

/// Sentence units: punctuation stays attached, the separating whitespace is dropped
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut last_end = 0;

    for boundary in SENTENCE_BOUNDARY_PATTERN.find_iter(text) {
        // Terminal punctuation is a single ASCII byte
        let sentence_end = boundary.start() + 1;
        sentences.push(&text[last_end..sentence_end]);
        last_end = boundary.end();
    }
    sentences.push(&text[last_end..]);

    sentences
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn split_at_char(text: &str, index: usize) -> (&str, &str) {
    let byte_index = text
        .char_indices()
        .nth(index)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    text.split_at(byte_index)
}
