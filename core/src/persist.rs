use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{IndexError, Result};
use crate::index::{Index, Posting, TermEntry};

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
    fn main_index(&self) -> PathBuf {
        self.root.join("testIndex.dat")
    }
    fn line_index(&self) -> PathBuf {
        self.root.join("lines.dat")
    }
    fn title_index(&self) -> PathBuf {
        self.root.join("titleIndex.dat")
    }
}

/// Write the three index tables.
///
/// Main index: first line is the document count, then one line per term,
/// `term|doc:pos,pos;doc:pos|tf,tf|idf` with tf/idf at 4 decimal digits.
/// Line index: `term|doc:line,line;doc:line;` with a trailing separator
/// per posting. Title index: `docID title` per document.
pub fn save_index(paths: &IndexPaths, index: &Index) -> Result<()> {
    create_dir_all(&paths.root)?;

    let mut out = BufWriter::new(File::create(paths.main_index())?);
    writeln!(out, "{}", index.num_documents)?;
    for (term, entry) in &index.terms {
        let postings = entry
            .postings
            .iter()
            .map(format_posting)
            .collect::<Vec<_>>()
            .join(";");
        let weights = entry
            .weights
            .iter()
            .map(|tf| format!("{tf:.4}"))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(out, "{term}|{postings}|{weights}|{:.4}", entry.idf)?;
    }
    out.flush()?;

    let mut out = BufWriter::new(File::create(paths.line_index())?);
    for (term, postings) in &index.lines {
        write!(out, "{term}|")?;
        for posting in postings {
            write!(out, "{};", format_posting(posting))?;
        }
        writeln!(out)?;
    }
    out.flush()?;

    let mut out = BufWriter::new(File::create(paths.title_index())?);
    for (doc_id, title) in &index.titles {
        writeln!(out, "{doc_id} {title}")?;
    }
    out.flush()?;

    tracing::debug!(root = %paths.root.display(), "index persisted");
    Ok(())
}

/// Load the three index tables, restoring the build invariants. Any
/// malformed line is fatal: the engine refuses to serve queries from an
/// inconsistent index.
pub fn load_index(paths: &IndexPaths) -> Result<Index> {
    let mut index = Index::default();

    let mut reader = BufReader::new(File::open(paths.main_index())?);
    let mut first = String::new();
    reader.read_line(&mut first)?;
    index.num_documents = first.trim().parse().map_err(|_| {
        IndexError::corruption(format!("invalid document count {:?}", first.trim()))
    })?;
    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let (term, entry) = parse_term_line(&line)?;
        index.terms.insert(term, entry);
    }

    let reader = BufReader::new(File::open(paths.line_index())?);
    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let (term, rest) = line
            .split_once('|')
            .ok_or_else(|| IndexError::corruption(format!("line entry missing '|': {line:?}")))?;
        index.lines.insert(term.to_string(), parse_postings(rest)?);
    }

    let reader = BufReader::new(File::open(paths.title_index())?);
    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let (doc_id, title) = line
            .split_once(' ')
            .ok_or_else(|| IndexError::corruption(format!("title entry missing docID: {line:?}")))?;
        let doc_id = doc_id
            .parse()
            .map_err(|_| IndexError::corruption(format!("non-numeric docID {doc_id:?}")))?;
        index.titles.insert(doc_id, title.to_string());
    }

    tracing::debug!(
        num_docs = index.num_documents,
        num_terms = index.terms.len(),
        "index loaded"
    );
    Ok(index)
}

fn format_posting(posting: &Posting) -> String {
    let positions = posting
        .positions
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("{}:{}", posting.doc_id, positions)
}

fn parse_term_line(line: &str) -> Result<(String, TermEntry)> {
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() != 4 {
        return Err(IndexError::corruption(format!(
            "expected 4 fields, found {}: {line:?}",
            fields.len()
        )));
    }
    let term = fields[0].to_string();
    let postings = parse_postings(fields[1])?;
    let weights = fields[2]
        .split(',')
        .map(|tf| {
            tf.parse::<f32>()
                .map_err(|_| IndexError::corruption(format!("non-numeric tf {tf:?}")))
        })
        .collect::<Result<Vec<f32>>>()?;
    let idf = fields[3]
        .parse::<f32>()
        .map_err(|_| IndexError::corruption(format!("non-numeric idf {:?}", fields[3])))?;

    if postings.len() != weights.len() {
        return Err(IndexError::corruption(format!(
            "term {term:?} has {} postings but {} weights",
            postings.len(),
            weights.len()
        )));
    }
    let df = postings.len() as u32;
    Ok((term, TermEntry { postings, weights, df, idf }))
}

fn parse_postings(field: &str) -> Result<Vec<Posting>> {
    let mut postings: Vec<Posting> = Vec::new();
    for part in field.split(';') {
        // the line table writes a trailing separator per posting
        if part.is_empty() {
            continue;
        }
        let (doc_id, positions) = part
            .split_once(':')
            .ok_or_else(|| IndexError::corruption(format!("posting missing ':': {part:?}")))?;
        let doc_id = doc_id
            .parse()
            .map_err(|_| IndexError::corruption(format!("non-numeric docID {doc_id:?}")))?;
        let positions = positions
            .split(',')
            .map(|p| {
                p.parse::<u32>()
                    .map_err(|_| IndexError::corruption(format!("non-numeric position {p:?}")))
            })
            .collect::<Result<Vec<u32>>>()?;
        if let Some(last) = postings.last() {
            if last.doc_id >= doc_id {
                return Err(IndexError::corruption(format!(
                    "postings out of document order at docID {doc_id}"
                )));
            }
        }
        postings.push(Posting { doc_id, positions });
    }
    if postings.is_empty() {
        return Err(IndexError::corruption("empty posting list".to_string()));
    }
    Ok(postings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_tables(dir: &Path, main: &str, lines: &str, titles: &str) {
        fs::write(dir.join("testIndex.dat"), main).unwrap();
        fs::write(dir.join("lines.dat"), lines).unwrap();
        fs::write(dir.join("titleIndex.dat"), titles).unwrap();
    }

    #[test]
    fn loads_well_formed_tables() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(
            dir.path(),
            "2\nfox|0:1,4;1:2|0.5774,0.7071|1.0000\n",
            "fox|0:1,2;1:1;\n",
            "0 a.txt\n1 b and c.txt\n",
        );

        let index = load_index(&IndexPaths::new(dir.path())).unwrap();
        assert_eq!(index.num_documents, 2);
        let fox = index.term("fox").unwrap();
        assert_eq!(fox.postings.len(), 2);
        assert_eq!(fox.df, 2);
        assert_eq!(fox.postings[1].positions, vec![2]);
        assert_eq!(index.line_numbers("fox", 1).unwrap(), &[1]);
        // titles keep spaces after the first separator
        assert_eq!(index.titles.get(&1).unwrap(), "b and c.txt");
    }

    #[test]
    fn rejects_field_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(dir.path(), "1\nfox|0:1|0.5774\n", "", "");
        let err = load_index(&IndexPaths::new(dir.path())).unwrap_err();
        assert!(matches!(err, IndexError::Corruption(_)), "got {err:?}");
    }

    #[test]
    fn rejects_postings_weights_disagreement() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(dir.path(), "1\nfox|0:1|0.5,0.5|1.0000\n", "", "");
        let err = load_index(&IndexPaths::new(dir.path())).unwrap_err();
        assert!(matches!(err, IndexError::Corruption(_)), "got {err:?}");
    }

    #[test]
    fn rejects_non_numeric_postings() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(dir.path(), "1\nfox|0:one|0.5774|1.0000\n", "", "");
        let err = load_index(&IndexPaths::new(dir.path())).unwrap_err();
        assert!(matches!(err, IndexError::Corruption(_)), "got {err:?}");
    }

    #[test]
    fn rejects_bad_document_count() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(dir.path(), "many\n", "", "");
        let err = load_index(&IndexPaths::new(dir.path())).unwrap_err();
        assert!(matches!(err, IndexError::Corruption(_)), "got {err:?}");
    }

    #[test]
    fn rejects_out_of_order_postings() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(
            dir.path(),
            "2\nfox|1:2;0:1|0.5,0.5|1.0000\n",
            "",
            "",
        );
        let err = load_index(&IndexPaths::new(dir.path())).unwrap_err();
        assert!(matches!(err, IndexError::Corruption(_)), "got {err:?}");
    }

    #[test]
    fn empty_index_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        save_index(&paths, &Index::default()).unwrap();
        let index = load_index(&paths).unwrap();
        assert_eq!(index.num_documents, 0);
        assert!(index.terms.is_empty());
    }
}
