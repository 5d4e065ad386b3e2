use anyhow::Result;
use clap::Parser;
use findex_core::builder::build_corpus;
use findex_core::persist::{save_index, IndexPaths};
use findex_core::tokenizer::Analyzer;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "findex-indexer")]
#[command(about = "Build a positional TF-IDF index from a directory of text files", long_about = None)]
struct Cli {
    /// Corpus directory of .txt documents
    #[arg(long, default_value = "Files")]
    corpus: String,
    /// Stopword file, one word per line
    #[arg(long, default_value = "stopwords.dat")]
    stopwords: String,
    /// Directory the index tables are written to
    #[arg(long, default_value = ".")]
    output: String,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let analyzer = Analyzer::from_stopwords_file(&cli.stopwords)?;
    let index = build_corpus(&cli.corpus, &analyzer)?;
    save_index(&IndexPaths::new(&cli.output), &index)?;
    tracing::info!(
        num_docs = index.num_documents,
        num_terms = index.terms.len(),
        output = %cli.output,
        "index build complete"
    );
    Ok(())
}
