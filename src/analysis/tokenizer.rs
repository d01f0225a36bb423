//! Tokenizers turn raw text into counted index terms.
//!
//! A tokenizer is shared by the write path and the query path, so a term
//! produced while indexing is always reproducible from query text.
//!
//! # Examples
//!
//! ```
//! use microsearch::analysis::tokenizer::Tokenizer;
//! use microsearch::analysis::tokenizer::ngram::NgramTokenizer;
//!
//! let tokenizer = NgramTokenizer::new(3, 5).unwrap();
//! let counts = tokenizer.tokenize("Hi there");
//! assert_eq!(counts.get("hi"), 1);
//! assert_eq!(counts.get("ther"), 1);
//! ```

pub mod ngram;

use ahash::AHashMap;

/// Occurrence counts of terms within one piece of text.
///
/// Counts from several calls to [`Tokenizer::tokenize_into`] accumulate, which
/// is how the fields of one document combine into a single mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermCounts {
    counts: AHashMap<String, u32>,
}

impl TermCounts {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `term`.
    pub fn add(&mut self, term: &str) {
        match self.counts.get_mut(term) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(term.to_string(), 1);
            }
        }
    }

    /// Occurrences of `term`, zero when absent.
    pub fn get(&self, term: &str) -> u32 {
        self.counts.get(term).copied().unwrap_or(0)
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all occurrence counts.
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| c as u64).sum()
    }

    /// Iterate `(term, count)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(term, &count)| (term.as_str(), count))
    }

    /// Distinct terms, sorted.
    pub fn terms(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self.counts.keys().map(String::as_str).collect();
        terms.sort_unstable();
        terms
    }
}

/// Trait for tokenizers that convert text into counted terms.
pub trait Tokenizer: Send + Sync + std::fmt::Debug {
    /// Add the terms of `text` to `counts`.
    fn tokenize_into(&self, text: &str, counts: &mut TermCounts);

    /// Tokenize a single piece of text.
    fn tokenize(&self, text: &str) -> TermCounts {
        let mut counts = TermCounts::new();
        self.tokenize_into(text, &mut counts);
        counts
    }

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}
