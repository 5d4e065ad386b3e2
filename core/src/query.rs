use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::index::{DocId, Index};
use crate::phrase;
use crate::tokenizer::Analyzer;

/// Fixed result-list cutoff.
const TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    OneWord,
    FreeText,
    Phrase,
}

/// Classify the raw, untokenized query string. This must run before
/// normalization: stopword removal and stemming can collapse a multi-word
/// query into zero or one surviving stems, which would misclassify it.
pub fn classify(raw: &str) -> QueryKind {
    if raw.contains('"') {
        QueryKind::Phrase
    } else if raw.split_whitespace().count() > 1 {
        QueryKind::FreeText
    } else {
        QueryKind::OneWord
    }
}

/// Line numbers where one query term occurs in a matched document, for
/// snippet display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineMatch {
    pub term: String,
    pub lines: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub title: String,
    pub score: f32,
    pub matches: Vec<LineMatch>,
}

/// Answers queries against an immutable, fully loaded index. Constructed
/// explicitly by the host; holds no global state.
pub struct QueryEngine {
    index: Index,
    analyzer: Analyzer,
}

impl QueryEngine {
    pub fn new(index: Index, analyzer: Analyzer) -> Self {
        Self { index, analyzer }
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Classify and dispatch a raw query, returning ranked hits.
    pub fn query(&self, raw: &str) -> Vec<SearchHit> {
        match classify(raw) {
            QueryKind::OneWord => self.one_word(raw),
            QueryKind::FreeText => self.free_text(raw),
            QueryKind::Phrase => self.phrase(raw),
        }
    }

    fn one_word(&self, raw: &str) -> Vec<SearchHit> {
        let terms = self.analyzer.normalize(raw);
        match terms.len() {
            0 => Vec::new(),
            1 => match self.index.term(&terms[0]) {
                None => Vec::new(),
                Some(entry) => {
                    let docs: HashSet<DocId> =
                        entry.postings.iter().map(|p| p.doc_id).collect();
                    self.rank(&terms, &docs)
                }
            },
            // normalization split a single raw word into several stems
            _ => self.free_text(raw),
        }
    }

    fn free_text(&self, raw: &str) -> Vec<SearchHit> {
        let terms = self.analyzer.normalize(raw);
        if terms.is_empty() {
            return Vec::new();
        }
        // union of the document sets of every present term
        let mut docs: HashSet<DocId> = HashSet::new();
        for term in &terms {
            if let Some(entry) = self.index.term(term) {
                docs.extend(entry.postings.iter().map(|p| p.doc_id));
            }
        }
        self.rank(&terms, &docs)
    }

    fn phrase(&self, raw: &str) -> Vec<SearchHit> {
        let terms = self.analyzer.normalize(raw);
        match terms.len() {
            0 => Vec::new(),
            1 => self.one_word(raw),
            _ => {
                let docs = phrase::matching_documents(&self.index, &terms);
                if docs.is_empty() {
                    return Vec::new();
                }
                self.rank(&terms, &docs)
            }
        }
    }

    /// Vector-space ranking, term at a time. The query vector holds idf per
    /// query-term position (duplicate terms occupy separate positions), the
    /// document vectors hold the aligned tf weights, and the score is their
    /// dot product. The sort is stable, so tied documents keep first-seen
    /// order; results are cut to the fixed top 10.
    fn rank(&self, terms: &[String], docs: &HashSet<DocId>) -> Vec<SearchHit> {
        if docs.is_empty() {
            return Vec::new();
        }
        let mut query_vec = vec![0.0f32; terms.len()];
        let mut slots: HashMap<DocId, usize> = HashMap::new();
        let mut doc_vecs: Vec<(DocId, Vec<f32>)> = Vec::new();

        for (i, term) in terms.iter().enumerate() {
            let Some(entry) = self.index.term(term) else {
                continue;
            };
            query_vec[i] = entry.idf;
            for (k, posting) in entry.postings.iter().enumerate() {
                if !docs.contains(&posting.doc_id) {
                    continue;
                }
                let slot = *slots.entry(posting.doc_id).or_insert_with(|| {
                    doc_vecs.push((posting.doc_id, vec![0.0; terms.len()]));
                    doc_vecs.len() - 1
                });
                doc_vecs[slot].1[i] = entry.weights[k];
            }
        }

        let mut scored: Vec<(DocId, f32)> = doc_vecs
            .into_iter()
            .map(|(doc_id, vec)| (doc_id, dot(&vec, &query_vec)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(TOP_N);

        scored
            .into_iter()
            .map(|(doc_id, score)| SearchHit {
                doc_id,
                title: self.index.titles.get(&doc_id).cloned().unwrap_or_default(),
                score,
                matches: self.line_matches(terms, doc_id),
            })
            .collect()
    }

    fn line_matches(&self, terms: &[String], doc_id: DocId) -> Vec<LineMatch> {
        let mut matches: Vec<LineMatch> = Vec::new();
        for term in terms {
            if matches.iter().any(|m| &m.term == term) {
                continue;
            }
            if let Some(lines) = self.index.line_numbers(term, doc_id) {
                matches.push(LineMatch {
                    term: term.clone(),
                    lines: lines.to_vec(),
                });
            }
        }
        matches
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
