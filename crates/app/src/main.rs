mod backends;

use anyhow::anyhow;
use backends::{AnyEmbedder, AnyStore};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use clause_radar_core::{
    collect_upload_paths, load_contracts, parse_keywords, ClauseSearch, IndexReport,
    SearchResponse, VectorStore, DEFAULT_GEMINI_MODEL,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const PREVIEW_CHARS: usize = 80;

#[derive(Parser)]
#[command(name = "clause-radar", version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Vector store backend
    #[arg(long, value_enum, env = "CLAUSE_RADAR_STORE", default_value = "memory")]
    pub(crate) store: StoreKind,

    /// Qdrant base URL
    #[arg(long, env = "QDRANT_URL", default_value = "http://localhost:6333")]
    pub(crate) qdrant_url: String,

    /// Qdrant collection
    #[arg(long, env = "QDRANT_COLLECTION", default_value = "contract_clauses")]
    pub(crate) qdrant_collection: String,

    /// Pinecone index host, e.g. https://<index>.svc.<region>.pinecone.io
    #[arg(long, env = "PINECONE_HOST")]
    pub(crate) pinecone_host: Option<String>,

    /// Pinecone API key
    #[arg(long, env = "PINECONE_API_KEY", hide_env_values = true)]
    pub(crate) pinecone_api_key: Option<String>,

    /// Pinecone namespace
    #[arg(long, env = "PINECONE_NAMESPACE")]
    pub(crate) pinecone_namespace: Option<String>,

    /// Embedding provider
    #[arg(long, value_enum, env = "CLAUSE_RADAR_EMBEDDER", default_value = "ngram")]
    pub(crate) embedder: EmbedderKind,

    /// Google Generative Language API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub(crate) gemini_api_key: Option<String>,

    /// Embedding model name
    #[arg(long, env = "EMBEDDING_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub(crate) embedding_model: String,

    /// Embedding dimensionality expected by provider and store
    #[arg(long, env = "EMBEDDING_DIMENSIONS", default_value = "768")]
    pub(crate) dimensions: usize,
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum StoreKind {
    Memory,
    Qdrant,
    Pinecone,
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum EmbedderKind {
    Ngram,
    Gemini,
}

#[derive(Subcommand)]
enum Command {
    /// Index contract PDFs against a keyword list.
    Index {
        #[command(flatten)]
        upload: UploadArgs,
    },
    /// Search indexed clauses with a free-text query.
    Search {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Index then search in one process; the memory store lives only this long.
    Run {
        #[command(flatten)]
        upload: UploadArgs,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Print the number of indexed snippets.
    Stats,
}

#[derive(clap::Args)]
struct UploadArgs {
    /// PDF files, or folders searched recursively for PDFs.
    #[arg(long, required = true, num_args = 1..)]
    paths: Vec<PathBuf>,
    /// Comma-separated keywords or phrases, e.g. "Effective Date, Payment Terms".
    #[arg(long)]
    keywords: String,
}

#[derive(clap::Args)]
struct QueryArgs {
    /// Keyword or free-text query.
    #[arg(long)]
    query: String,
    /// Number of results; every indexed snippet when omitted.
    #[arg(long)]
    top_k: Option<usize>,
    /// Print each full snippet after the table.
    #[arg(long, default_value_t = false)]
    show_full: bool,
}

type Engine = ClauseSearch<AnyEmbedder, AnyStore>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let embedder = AnyEmbedder::from_cli(&cli)?;
    let store = AnyStore::from_cli(&cli).await?;
    info!(
        version = app_version,
        store = store.name(),
        dimensions = cli.dimensions,
        started_at = %Utc::now().to_rfc3339(),
        "clause-radar boot"
    );

    let engine = ClauseSearch::new(embedder, store);

    match cli.command {
        Command::Index { upload } => {
            run_index(&engine, &upload).await?;
        }
        Command::Search { query } => {
            run_search(&engine, &query).await?;
        }
        Command::Run { upload, query } => {
            run_index(&engine, &upload).await?;
            run_search(&engine, &query).await?;
        }
        Command::Stats => {
            let total = engine
                .store()
                .count()
                .await
                .map_err(|error| anyhow!(error.to_string()))?;
            println!("{total} snippet(s) indexed in {}", engine.store().name());
        }
    }

    Ok(())
}

async fn run_index(engine: &Engine, upload: &UploadArgs) -> anyhow::Result<()> {
    let keywords = parse_keywords(&upload.keywords);
    if keywords.is_empty() {
        return Err(anyhow!("enter at least one keyword or phrase"));
    }

    let paths = collect_upload_paths(&upload.paths)?;
    let batch = load_contracts(&paths);
    for skipped in &batch.skipped_files {
        warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped upload");
    }
    if batch.documents.is_empty() {
        return Err(anyhow!("none of the {} upload(s) could be read", paths.len()));
    }

    info!(
        contracts = batch.documents.len(),
        keywords = keywords.len(),
        "indexing contracts"
    );
    let report = engine.index(&batch.documents, &keywords).await?;
    print_report(&report, batch.documents.len(), keywords.len());
    Ok(())
}

async fn run_search(engine: &Engine, args: &QueryArgs) -> anyhow::Result<()> {
    let response = engine.search(&args.query, args.top_k).await?;
    print_results(&response, args.show_full);
    Ok(())
}

fn print_report(report: &IndexReport, contracts: usize, keywords: usize) {
    println!("indexed {contracts} contract(s) against {keywords} keyword(s)");
    println!(
        "snippets={} skipped={} extraction_failures={} embedding_failures={} upsert_failures={}",
        report.indexed_count(),
        report.skipped,
        report.extraction_failures(),
        report.embedding_failures(),
        report.upsert_failures()
    );
    for failure in &report.failures {
        println!(
            "  failed [{:?}] contract={} keyword={} reason={}",
            failure.kind,
            failure.contract_id,
            failure.keyword.as_deref().unwrap_or("-"),
            failure.reason
        );
    }
    let elapsed = report.finished_at - report.started_at;
    println!("finished in {} ms", elapsed.num_milliseconds());
}

fn print_results(response: &SearchResponse, show_full: bool) {
    if response.is_empty() {
        println!("No matches found. Try a different query or index more contracts.");
        return;
    }

    println!("Top {} matches for \"{}\"", response.results.len(), response.query);
    println!("{:<5} {:<24} {:<24} {:>8}  snippet", "rank", "contract", "section", "score");
    for (index, result) in response.results.iter().enumerate() {
        println!(
            "{:<5} {:<24} {:<24} {:>6.1} %  {}",
            index + 1,
            result.contract_id,
            result.keyword,
            result.score_percent(),
            result.preview(PREVIEW_CHARS)
        );
    }

    if show_full {
        for (index, result) in response.results.iter().enumerate() {
            println!(
                "\n[{}] {} - {}\n{}",
                index + 1,
                result.contract_id,
                result.keyword,
                result.snippet_text
            );
        }
    }
}
