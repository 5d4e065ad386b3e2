use std::collections::HashSet;
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

use crate::error::{IndexError, Result};

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9 ]").expect("valid regex");
}

/// A surviving token from the document pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub stem: String,
    /// 0-based offset in the whole-document token stream.
    pub offset: u32,
    /// 1-based source line number.
    pub line: u32,
}

/// Lowercases, strips non-alphanumerics, removes stopwords and stems.
///
/// Owns the stopword set, loaded once from a newline-delimited file.
pub struct Analyzer {
    stopwords: HashSet<String>,
    stemmer: Stemmer,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("stopwords", &self.stopwords)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    pub fn new(stopwords: HashSet<String>) -> Self {
        Self {
            stopwords,
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    pub fn from_stopwords_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read(path).map_err(|e| {
            IndexError::config(format!("cannot read stopword file {}: {e}", path.display()))
        })?;
        let stopwords = String::from_utf8_lossy(&raw)
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        Ok(Self::new(stopwords))
    }

    /// Normalize a stream of text into ordered stems: lowercase, replace
    /// every character outside `[a-z0-9 ]` with a space, split on
    /// whitespace, drop stopwords, stem.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let stripped = NON_ALNUM.replace_all(&lowered, " ");
        stripped
            .split_whitespace()
            .filter(|word| !self.stopwords.contains(*word))
            .map(|word| self.stemmer.stem(word).to_string())
            .collect()
    }

    /// Single tokenization pass over a whole document, emitting both the
    /// global token offset and the 1-based line number per occurrence, so
    /// the main and line indexes cannot diverge. Newlines normalize to
    /// spaces, so this stream equals a whole-document `normalize`.
    pub fn tokenize_document(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut offset = 0u32;
        for (i, line) in text.lines().enumerate() {
            let line_no = (i + 1) as u32;
            for stem in self.normalize(line) {
                tokens.push(Token {
                    stem,
                    offset,
                    line: line_no,
                });
                offset += 1;
            }
        }
        tokens
    }
}
