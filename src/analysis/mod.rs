//! Text analysis: turning field text and query text into index terms.

pub mod tokenizer;

pub use tokenizer::ngram::NgramTokenizer;
pub use tokenizer::{TermCounts, Tokenizer};
