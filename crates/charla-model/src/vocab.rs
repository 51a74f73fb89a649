use std::collections::HashMap;

/// Index reserved for out-of-vocabulary tokens. Never a real word.
pub const UNKNOWN_INDEX: usize = 0;
/// Placeholder occupying the reserved slot.
pub const UNKNOWN_TOKEN: &str = "<unk>";

/// Lowercase whitespace tokenization, shared by trainer and decoder.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect()
}

/// Bidirectional word/index mapping. Slot 0 is the reserved unknown
/// index; real words occupy 1..len.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocab {
    words: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocab {
    /// Build from raw text: sorted unique tokens, indices assigned from 1.
    pub fn build(text: &str) -> Self {
        let mut unique: Vec<String> = tokenize(text);
        unique.sort();
        unique.dedup();

        let mut words = Vec::with_capacity(unique.len() + 1);
        words.push(UNKNOWN_TOKEN.to_string());
        words.extend(unique);
        Self::from_words(words)
    }

    /// Rebuild from an already-indexed word list. `words[0]` is treated as
    /// the unknown slot regardless of its spelling.
    pub fn from_words(words: Vec<String>) -> Self {
        let index = words
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, w)| (w.clone(), i))
            .collect();
        Self { words, index }
    }

    /// Map a token to its index; unknown tokens map to the reserved 0.
    pub fn id(&self, word: &str) -> usize {
        self.index.get(word).copied().unwrap_or(UNKNOWN_INDEX)
    }

    /// Map an index back to its word. The unknown slot and out-of-range
    /// indices have no word.
    pub fn word(&self, id: usize) -> Option<&str> {
        if id == UNKNOWN_INDEX {
            return None;
        }
        self.words.get(id).map(String::as_str)
    }

    /// Total number of slots, including the reserved unknown slot.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.len() <= 1
    }

    /// (word, index) pairs for every real word.
    pub fn entries(&self) -> impl Iterator<Item = (&str, usize)> {
        self.words
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, w)| (w.as_str(), i))
    }
}
