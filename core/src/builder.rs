use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{IndexError, Result};
use crate::index::{DocId, Index, Posting};
use crate::tokenizer::Analyzer;

/// Accumulates per-term postings, line postings, and tf/df statistics as
/// documents are fed in. One-shot: `finish` consumes the builder.
pub struct IndexBuilder<'a> {
    analyzer: &'a Analyzer,
    index: Index,
    next_doc_id: DocId,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(analyzer: &'a Analyzer) -> Self {
        Self {
            analyzer,
            index: Index::default(),
            next_doc_id: 0,
        }
    }

    /// Index one document. Documents must be added in docID order, which
    /// keeps every posting list sorted by ascending doc_id without a sort.
    pub fn add_document(&mut self, title: &str, text: &str) {
        let doc_id = self.next_doc_id;
        self.next_doc_id += 1;
        self.index.titles.insert(doc_id, title.to_string());
        self.index.num_documents += 1;

        let mut offsets: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        let mut line_hits: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        for token in self.analyzer.tokenize_document(text) {
            let lines = line_hits.entry(token.stem.clone()).or_default();
            if lines.last() != Some(&token.line) {
                lines.push(token.line);
            }
            offsets.entry(token.stem).or_default().push(token.offset);
        }
        if offsets.is_empty() {
            tracing::debug!(doc_id, title, "document has no indexable terms");
            return;
        }

        // L2 norm of the whole raw term-count vector, computed once over
        // the document's complete term set.
        let norm = offsets
            .values()
            .map(|positions| {
                let count = positions.len() as f32;
                count * count
            })
            .sum::<f32>()
            .sqrt();

        for (stem, positions) in offsets {
            let tf = positions.len() as f32 / norm;
            let entry = self.index.terms.entry(stem).or_default();
            entry.postings.push(Posting { doc_id, positions });
            entry.weights.push(tf);
            entry.df += 1;
        }
        for (stem, lines) in line_hits {
            self.index
                .lines
                .entry(stem)
                .or_default()
                .push(Posting { doc_id, positions: lines });
        }
        tracing::debug!(doc_id, title, "indexed document");
    }

    /// Derive idf for every term and hand back the finished index.
    pub fn finish(mut self) -> Index {
        let num_docs = self.index.num_documents as f32;
        for entry in self.index.terms.values_mut() {
            entry.idf = num_docs / entry.df as f32;
        }
        self.index
    }
}

/// Build an index from every `.txt` file directly inside `corpus_dir`.
///
/// Files are enumerated in sorted filename order so docID assignment is
/// deterministic across runs and platforms. Undecodable bytes are dropped,
/// never fatal; a missing corpus directory is a configuration error.
pub fn build_corpus<P: AsRef<Path>>(corpus_dir: P, analyzer: &Analyzer) -> Result<Index> {
    let corpus_dir = corpus_dir.as_ref();
    if !corpus_dir.is_dir() {
        return Err(IndexError::config(format!(
            "corpus directory {} does not exist",
            corpus_dir.display()
        )));
    }

    let mut builder = IndexBuilder::new(analyzer);
    for entry in WalkDir::new(corpus_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("txt") {
            continue;
        }
        let title = entry.file_name().to_string_lossy().into_owned();
        let raw = fs::read(entry.path())?;
        let text = String::from_utf8_lossy(&raw);
        builder.add_document(&title, &text);
    }

    let index = builder.finish();
    tracing::info!(
        num_docs = index.num_documents,
        num_terms = index.terms.len(),
        "corpus indexed"
    );
    Ok(index)
}
