use std::collections::BTreeMap;

pub type DocId = u32;

/// A term's occurrences in one document.
///
/// Positions are 0-based token offsets in the main index and 1-based line
/// numbers in the line index; either way the sequence is strictly
/// increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub doc_id: DocId,
    pub positions: Vec<u32>,
}

/// Postings, tf weights, and frequency statistics for one term.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermEntry {
    /// Postings ordered by ascending doc_id.
    pub postings: Vec<Posting>,
    /// tf weights positionally aligned with `postings`.
    pub weights: Vec<f32>,
    /// Number of documents containing the term; always `postings.len()`.
    pub df: u32,
    /// Linear inverse document frequency: num_documents / df.
    pub idf: f32,
}

/// The in-memory index, read-only once built.
///
/// Term and title tables are ordered so that re-serializing an unchanged
/// corpus is byte-identical run to run.
#[derive(Debug, Default)]
pub struct Index {
    pub num_documents: u32,
    pub terms: BTreeMap<String, TermEntry>,
    /// term -> line-number postings, used only for snippet lookup.
    pub lines: BTreeMap<String, Vec<Posting>>,
    pub titles: BTreeMap<DocId, String>,
}

impl Index {
    pub fn term(&self, term: &str) -> Option<&TermEntry> {
        self.terms.get(term)
    }

    /// Line numbers where `term` occurs in `doc_id`, if any.
    pub fn line_numbers(&self, term: &str, doc_id: DocId) -> Option<&[u32]> {
        self.lines
            .get(term)?
            .iter()
            .find(|p| p.doc_id == doc_id)
            .map(|p| p.positions.as_slice())
    }
}
