//! Sentence-aware overlapping chunker.
//!
//! Splits text into sentence-like units on terminal punctuation, greedily
//! packs them up to a target character size, and seeds each new chunk with
//! the word-aligned tail of the previous one so passage boundaries keep
//! local context. Sentences are never broken, even when a single sentence
//! exceeds the target size.

/// Chunks whose trimmed length does not exceed this are dropped as noise
/// (stray headings, page numbers, whitespace fragments).
pub const MIN_CHUNK_CHARS: usize = 30;

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Target chunk size in characters. Chunks may exceed this by up to one
    /// sentence worth of slack.
    pub chunk_size: usize,
    /// Characters of trailing context carried into the next chunk,
    /// word-boundary aligned.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 900, overlap: 150 }
    }
}

/// Splits `text` into ordered, overlapping chunks.
///
/// Empty or whitespace-only input yields an empty vec.
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_len = 0usize;

    for sentence in split_sentences(text) {
        if current_len + sentence.len() > config.chunk_size && !current.is_empty() {
            let closed = current.join(" ");
            let seed = trailing_words(&closed, config.overlap);
            chunks.push(closed);
            current = if seed.is_empty() {
                vec![sentence.to_string()]
            } else {
                vec![seed, sentence.to_string()]
            };
            current_len = current.iter().map(String::len).sum::<usize>();
        } else {
            current_len += sentence.len();
            current.push(sentence.to_string());
        }
    }
    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    chunks
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| c.len() > MIN_CHUNK_CHARS)
        .collect()
}

/// Splits on terminal punctuation (`.`, `!`, `?`) followed by whitespace.
/// The trailing fragment without terminal punctuation is kept as a sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut iter = text.char_indices().peekable();

    while let Some((i, ch)) = iter.next() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        let Some(&(_, next)) = iter.peek() else { continue };
        if !next.is_whitespace() {
            continue;
        }
        let end = i + ch.len_utf8();
        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        while let Some(&(_, c)) = iter.peek() {
            if c.is_whitespace() {
                iter.next();
            } else {
                break;
            }
        }
        start = iter.peek().map_or(text.len(), |&(j, _)| j);
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Takes whole words from the end of `closed` until roughly `budget`
/// characters are covered. A single word longer than the budget is still
/// taken whole; word boundaries are never split.
fn trailing_words(closed: &str, budget: usize) -> String {
    if budget == 0 {
        return String::new();
    }
    let words: Vec<&str> = closed.split_whitespace().collect();
    let mut taken: Vec<&str> = Vec::new();
    let mut len = 0usize;
    for word in words.iter().rev() {
        let added = if taken.is_empty() { word.len() } else { word.len() + 1 };
        if !taken.is_empty() && len + added > budget {
            break;
        }
        taken.push(word);
        len += added;
        if len >= budget {
            break;
        }
    }
    taken.reverse();
    taken.join(" ")
}
