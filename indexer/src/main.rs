use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use search_core::{split_query, EngineConfig, SearchMode, SearchResults, Searcher};
use tracing_subscriber::{fmt, EnvFilter};

use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a TF-IDF inverted index over a document folder and query it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// JSON configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Corpus directory
    #[arg(long)]
    docs: Option<PathBuf>,
    /// Stop-word list, one word per line
    #[arg(long)]
    stopwords: Option<PathBuf>,
    /// Stemmer language, or "none"
    #[arg(long)]
    language: Option<String>,
    /// Use smoothed IDF = log10(1 + N/df) instead of log10(N/df)
    #[arg(long, default_value_t = false)]
    smoothed_idf: bool,
}

impl CorpusArgs {
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
            None => EngineConfig::default(),
        };
        if let Some(docs) = &self.docs { config.documents_path = docs.clone(); }
        if let Some(stopwords) = &self.stopwords { config.stopwords_path = Some(stopwords.clone()); }
        if let Some(language) = &self.language { config.language = language.clone(); }
        if self.smoothed_idf { config.smoothed_idf = true; }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Index the corpus and run one query against it
    Search {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// single, and, or, advanced
        #[arg(long, default_value_t = SearchMode::Advanced)]
        mode: SearchMode,
        /// Show at most this many results
        #[arg(long)]
        limit: Option<usize>,
        /// Query terms, separated by whitespace or commas
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Index the corpus and print its statistics
    Stats {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Print the full term -> document -> posting map as JSON
        #[arg(long, default_value_t = false)]
        dump: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { corpus, mode, limit, query } => {
            search(&corpus.engine_config()?, mode, limit, &query.join(" "))
        }
        Commands::Stats { corpus, dump } => stats(&corpus.engine_config()?, dump),
    }
}

fn search(config: &EngineConfig, mode: SearchMode, limit: Option<usize>, query: &str) -> Result<()> {
    let (_corpus, analyzer, index) = config.build().context("building index")?;
    let searcher = Searcher::new(&index, &analyzer)?;
    let mut results = searcher.search(mode, split_query(query).as_slice());
    if let Some(k) = limit {
        results.hits.truncate(k);
    }
    tracing::info!(%mode, hits = results.len(), "search finished");
    print!("{}", render_results(&results, mode));
    Ok(())
}

fn stats(config: &EngineConfig, dump: bool) -> Result<()> {
    let (_corpus, _analyzer, index) = config.build().context("building index")?;
    if dump {
        println!("{}", serde_json::to_string_pretty(&index.snapshot())?);
        return Ok(());
    }
    println!("documents: {}", index.total_documents());
    println!("terms:     {}", index.term_count());
    println!("idf:       {:?}", index.idf_variant());
    Ok(())
}

fn render_results(results: &SearchResults, mode: SearchMode) -> String {
    let mut out = String::new();
    if results.is_empty() {
        out.push_str("No results found.\n");
    } else {
        out.push_str(&format!("{:<15} {:<20} {:<10}\n", "Document ID", "Cumulative TF-IDF", "Matched Terms"));
        out.push_str(&"-".repeat(55));
        out.push('\n');
        for hit in &results.hits {
            out.push_str(&format!("{:<15} {:<20.4} {:<10}\n", hit.doc_id, hit.score, hit.matched_terms_count()));
        }
    }
    if mode == SearchMode::Advanced && !results.missing_terms.is_empty() {
        out.push_str(&format!("Terms not found: {}\n", results.missing_terms.join(", ")));
    }
    out
}
