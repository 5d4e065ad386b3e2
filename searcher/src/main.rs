use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::Parser;
use findex_core::persist::{load_index, IndexPaths};
use findex_core::query::{QueryEngine, SearchHit};
use findex_core::tokenizer::Analyzer;
use findex_searcher::Renderer;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "findex-searcher")]
#[command(about = "Answer ranked queries against a persisted findex index", long_about = None)]
struct Cli {
    /// Directory holding the persisted index tables
    #[arg(long, default_value = ".")]
    index: String,
    /// Corpus directory, re-read for snippet lines
    #[arg(long, default_value = "Files")]
    corpus: String,
    /// Stopword file, one word per line
    #[arg(long, default_value = "stopwords.dat")]
    stopwords: String,
    /// Run a single query and exit instead of reading from stdin
    #[arg(long)]
    query: Option<String>,
    /// Emit hits as JSON instead of rendered snippets
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let analyzer = Analyzer::from_stopwords_file(&cli.stopwords)?;
    let index = load_index(&IndexPaths::new(&cli.index))?;
    tracing::info!(
        num_docs = index.num_documents,
        num_terms = index.terms.len(),
        "index loaded"
    );
    let engine = QueryEngine::new(index, analyzer);
    let renderer = Renderer::new(&cli.corpus);

    let mut out = io::stdout().lock();
    if let Some(query) = cli.query {
        let hits = engine.query(&query);
        return emit(&renderer, &mut out, &hits, cli.json);
    }

    let stdin = io::stdin();
    loop {
        write!(out, "query> ")?;
        out.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        let hits = engine.query(query);
        emit(&renderer, &mut out, &hits, cli.json)?;
    }
    Ok(())
}

fn emit<W: Write>(renderer: &Renderer, out: &mut W, hits: &[SearchHit], json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(hits)?)?;
    } else {
        renderer.render(out, hits)?;
    }
    Ok(())
}
