use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use findex_core::query::SearchHit;

/// Renders ranked hits for the terminal, resolving matched line numbers
/// back to source lines by re-reading the corpus files.
pub struct Renderer {
    corpus_dir: PathBuf,
}

impl Renderer {
    pub fn new<P: AsRef<Path>>(corpus_dir: P) -> Self {
        Self {
            corpus_dir: corpus_dir.as_ref().to_path_buf(),
        }
    }

    pub fn render<W: Write>(&self, out: &mut W, hits: &[SearchHit]) -> io::Result<()> {
        if hits.is_empty() {
            writeln!(out, "no matches")?;
            return Ok(());
        }
        for hit in hits {
            writeln!(out, "{}  (doc {}, score {:.4})", hit.title, hit.doc_id, hit.score)?;
            let source = self.read_lines(&hit.title);
            for line_no in merged_lines(hit) {
                match source
                    .as_ref()
                    .and_then(|lines| lines.get(line_no as usize - 1))
                {
                    Some(text) => writeln!(out, "  [{line_no}] {}", text.trim_end())?,
                    // source file changed or vanished since indexing
                    None => writeln!(out, "  [{line_no}]")?,
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }

    fn read_lines(&self, title: &str) -> Option<Vec<String>> {
        let raw = fs::read(self.corpus_dir.join(title)).ok()?;
        Some(
            String::from_utf8_lossy(&raw)
                .lines()
                .map(str::to_owned)
                .collect(),
        )
    }
}

/// All matched line numbers of a hit, deduplicated across query terms.
fn merged_lines(hit: &SearchHit) -> Vec<u32> {
    let mut lines: Vec<u32> = hit
        .matches
        .iter()
        .flat_map(|m| m.lines.iter().copied())
        .collect();
    lines.sort_unstable();
    lines.dedup();
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use findex_core::query::LineMatch;
    use std::fs;

    fn hit(title: &str, lines: Vec<u32>) -> SearchHit {
        SearchHit {
            doc_id: 0,
            title: title.to_string(),
            score: 0.5,
            matches: vec![LineMatch {
                term: "fox".to_string(),
                lines,
            }],
        }
    }

    #[test]
    fn resolves_line_numbers_to_source_lines() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "first line\nthe quick fox\nlast\n").unwrap();

        let renderer = Renderer::new(dir.path());
        let mut out = Vec::new();
        renderer.render(&mut out, &[hit("a.txt", vec![2])]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("a.txt"));
        assert!(text.contains("[2] the quick fox"));
    }

    #[test]
    fn merges_and_dedups_lines_across_terms() {
        let mut h = hit("a.txt", vec![3, 1]);
        h.matches.push(LineMatch {
            term: "dog".to_string(),
            lines: vec![1, 2],
        });
        assert_eq!(merged_lines(&h), vec![1, 2, 3]);
    }

    #[test]
    fn missing_source_file_still_lists_line_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = Renderer::new(dir.path());
        let mut out = Vec::new();
        renderer.render(&mut out, &[hit("gone.txt", vec![4])]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[4]"));
    }

    #[test]
    fn empty_hit_list_prints_no_matches() {
        let renderer = Renderer::new(".");
        let mut out = Vec::new();
        renderer.render(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "no matches\n");
    }
}
