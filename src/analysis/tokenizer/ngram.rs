//! N-gram tokenizer implementation.

use ahash::AHashSet;

use crate::analysis::tokenizer::{TermCounts, Tokenizer};
use crate::error::{MicrosearchError, Result};

/// Default minimum gram length.
pub const DEFAULT_MIN_GRAM: usize = 3;

/// Default maximum gram length.
pub const DEFAULT_MAX_GRAM: usize = 5;

/// A tokenizer that emits every character n-gram of every word.
///
/// Text is split on whitespace. Each word loses its leading and trailing
/// non-alphanumeric characters and is lowercased. A word of at most
/// `min_gram` characters becomes one term; a longer word contributes every
/// contiguous substring whose length lies in `min_gram..=max_gram`.
///
/// The overlapping grams give substring matching without a stemmer, so
/// `report` matches a document containing `reports`.
///
/// # Examples
///
/// ```
/// use microsearch::analysis::tokenizer::Tokenizer;
/// use microsearch::analysis::tokenizer::ngram::NgramTokenizer;
///
/// let tokenizer = NgramTokenizer::new(3, 4).unwrap();
/// let counts = tokenizer.tokenize("Hello!");
/// assert_eq!(
///     counts.terms(),
///     vec!["ell", "ello", "hel", "hell", "llo"]
/// );
/// ```
#[derive(Clone, Debug)]
pub struct NgramTokenizer {
    /// Minimum n-gram size
    min_gram: usize,
    /// Maximum n-gram size
    max_gram: usize,
    /// Cleaned words that produce no terms
    stop_words: AHashSet<String>,
}

impl NgramTokenizer {
    /// Create a new n-gram tokenizer.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `min_gram` is 0 or `max_gram` is less
    /// than `min_gram`.
    pub fn new(min_gram: usize, max_gram: usize) -> Result<Self> {
        if min_gram == 0 {
            return Err(MicrosearchError::invalid_config(
                "min_gram must be at least 1",
            ));
        }
        if max_gram < min_gram {
            return Err(MicrosearchError::invalid_config(format!(
                "max_gram ({max_gram}) must be >= min_gram ({min_gram})"
            )));
        }
        Ok(Self {
            min_gram,
            max_gram,
            stop_words: AHashSet::new(),
        })
    }

    /// Skip the given words. They are compared after cleaning, so supply them
    /// lowercased.
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn min_gram(&self) -> usize {
        self.min_gram
    }

    pub fn max_gram(&self) -> usize {
        self.max_gram
    }

    /// Strip surrounding punctuation and lowercase.
    fn clean_word(word: &str) -> String {
        word.trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase()
    }

    fn add_grams(&self, word: &str, counts: &mut TermCounts) {
        let chars: Vec<char> = word.chars().collect();

        if chars.len() <= self.min_gram {
            counts.add(word);
            return;
        }

        let mut gram = String::with_capacity(self.max_gram * 4);
        for start in 0..chars.len() {
            for gram_size in self.min_gram..=self.max_gram {
                let end = start + gram_size;
                if end > chars.len() {
                    break;
                }

                gram.clear();
                gram.extend(&chars[start..end]);
                counts.add(&gram);
            }
        }
    }
}

impl Default for NgramTokenizer {
    fn default() -> Self {
        Self {
            min_gram: DEFAULT_MIN_GRAM,
            max_gram: DEFAULT_MAX_GRAM,
            stop_words: AHashSet::new(),
        }
    }
}

impl Tokenizer for NgramTokenizer {
    fn tokenize_into(&self, text: &str, counts: &mut TermCounts) {
        for raw in text.split_whitespace() {
            let word = Self::clean_word(raw);
            if word.is_empty() || self.stop_words.contains(&word) {
                continue;
            }
            self.add_grams(&word, counts);
        }
    }

    fn name(&self) -> &'static str {
        "ngram"
    }
}
