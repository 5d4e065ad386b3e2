use std::collections::HashSet;

use crate::index::{DocId, Index, Posting};

/// Documents in which `terms` occur as a literal contiguous phrase.
///
/// Candidates are the intersection of the per-term document sets; a
/// candidate is confirmed when, after shifting term i's positions by -i,
/// all terms share at least one shifted position. Runs in
/// O(num_terms x postings_per_doc) per candidate.
pub fn matching_documents(index: &Index, terms: &[String]) -> HashSet<DocId> {
    let mut entries = Vec::with_capacity(terms.len());
    for term in terms {
        match index.term(term) {
            Some(entry) => entries.push(entry),
            // a phrase cannot match if any of its terms is unknown
            None => return HashSet::new(),
        }
    }

    let mut candidates: HashSet<DocId> =
        entries[0].postings.iter().map(|p| p.doc_id).collect();
    for entry in &entries[1..] {
        let docs: HashSet<DocId> = entry.postings.iter().map(|p| p.doc_id).collect();
        candidates.retain(|doc| docs.contains(doc));
        if candidates.is_empty() {
            return candidates;
        }
    }

    // Restrict each term's postings to the candidates. Posting lists are
    // sorted by doc_id, so row k of every term refers to the same document.
    let rows: Vec<Vec<&Posting>> = entries
        .iter()
        .map(|entry| {
            entry
                .postings
                .iter()
                .filter(|p| candidates.contains(&p.doc_id))
                .collect()
        })
        .collect();

    let mut confirmed = HashSet::new();
    for k in 0..rows[0].len() {
        let mut common: HashSet<i64> =
            rows[0][k].positions.iter().map(|&p| p as i64).collect();
        for (i, row) in rows.iter().enumerate().skip(1) {
            let shifted: HashSet<i64> = row[k]
                .positions
                .iter()
                .map(|&p| p as i64 - i as i64)
                .collect();
            common.retain(|p| shifted.contains(p));
            if common.is_empty() {
                break;
            }
        }
        if !common.is_empty() {
            confirmed.insert(rows[0][k].doc_id);
        }
    }
    confirmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IndexBuilder;
    use crate::tokenizer::Analyzer;

    fn index_of(docs: &[&str]) -> Index {
        let analyzer = Analyzer::new(["the"].iter().map(|s| s.to_string()).collect());
        let mut builder = IndexBuilder::new(&analyzer);
        for (i, text) in docs.iter().enumerate() {
            builder.add_document(&format!("{i}.txt"), text);
        }
        builder.finish()
    }

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn adjacency_distinguishes_word_order() {
        let index = index_of(&["the quick brown fox", "quick fox brown"]);
        let docs = matching_documents(&index, &terms(&["quick", "brown"]));
        assert_eq!(docs, [0].into_iter().collect());
    }

    #[test]
    fn stopword_gap_counts_as_adjacent() {
        // "the" is removed before positions are assigned, so the surviving
        // stems sit next to each other in the token stream
        let index = index_of(&["quick the brown"]);
        let docs = matching_documents(&index, &terms(&["quick", "brown"]));
        assert_eq!(docs, [0].into_iter().collect());
    }

    #[test]
    fn unknown_term_means_no_match() {
        let index = index_of(&["quick brown fox"]);
        let docs = matching_documents(&index, &terms(&["quick", "zebra"]));
        assert!(docs.is_empty());
    }

    #[test]
    fn disjoint_document_sets_mean_no_match() {
        let index = index_of(&["quick dog", "brown cat"]);
        let docs = matching_documents(&index, &terms(&["quick", "brown"]));
        assert!(docs.is_empty());
    }

    #[test]
    fn three_term_phrase_matches_across_lines_only_when_contiguous() {
        let index = index_of(&[
            "quick brown fox jumps",
            "quick brown dog\nbrown fox",
            "fox brown quick",
        ]);
        let docs = matching_documents(&index, &terms(&["quick", "brown", "fox"]));
        assert_eq!(docs, [0].into_iter().collect());
    }

    #[test]
    fn repeated_occurrences_still_match() {
        let index = index_of(&["brown brown quick brown"]);
        let docs = matching_documents(&index, &terms(&["quick", "brown"]));
        assert_eq!(docs, [0].into_iter().collect());
    }
}
