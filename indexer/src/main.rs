use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use docseek_core::load::load_records;
use docseek_core::{Index, IndexStats, SearchConfig, SearchHit, Searcher};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "docseek")]
#[command(about = "Inspect and query documentation search indexes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index for every record file under a path and report its size
    Inspect {
        /// Input path (search_index.js / .json file, or a directory)
        #[arg(long)]
        input: String,
    },
    /// Run a query against a record file and print one page of hits as JSON
    Query {
        /// Record file (search_index.js or .json)
        #[arg(long)]
        input: String,
        /// Query text
        #[arg(long)]
        q: String,
        /// Result page, 0-based
        #[arg(long, default_value_t = 0)]
        page: usize,
        /// Render excerpts as HTML with <em> highlights
        #[arg(long, default_value_t = false)]
        html: bool,
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// JSON file with ranking weights; missing keys take defaults
    #[arg(long, env = "DOCSEEK_CONFIG")]
    config: Option<PathBuf>,
    /// Hits per page
    #[arg(long, env = "DOCSEEK_PAGE_SIZE")]
    page_size: Option<usize>,
    /// Maximum excerpt length in characters
    #[arg(long, env = "DOCSEEK_EXCERPT_CHARS")]
    excerpt_chars: Option<usize>,
}

impl ConfigArgs {
    fn resolve(&self) -> Result<SearchConfig> {
        let mut cfg = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?
            }
            None => SearchConfig::default(),
        };
        if let Some(n) = self.page_size {
            cfg.page_size = n;
        }
        if let Some(n) = self.excerpt_chars {
            cfg.excerpt_chars = n;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Debug, Serialize)]
struct QueryOutput {
    query: String,
    page: usize,
    page_size: usize,
    total_hits: usize,
    results: Vec<HitOutput>,
}

#[derive(Debug, Serialize)]
struct HitOutput {
    #[serde(flatten)]
    hit: SearchHit,
    #[serde(skip_serializing_if = "Option::is_none")]
    excerpt_html: Option<String>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { input } => {
            for (path, stats) in inspect(Path::new(&input))? {
                println!("{}\trecords={}\tterms={}\tpostings={}", path.display(), stats.records, stats.terms, stats.postings);
            }
            Ok(())
        }
        Commands::Query { input, q, page, html, config } => {
            let out = run_query(Path::new(&input), &q, page, html, config.resolve()?)?;
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }
    }
}

fn is_record_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    name == "search_index.js" || path.extension().and_then(|s| s.to_str()) == Some("json")
}

fn collect_files(input: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && is_record_file(p) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        bail!("input path {} does not exist", input.display());
    }
    Ok(files)
}

fn inspect(input: &Path) -> Result<Vec<(PathBuf, IndexStats)>> {
    let mut out = Vec::new();
    for file in collect_files(input)? {
        let records = load_records(&file).with_context(|| format!("loading {}", file.display()))?;
        let index = Index::build(records).with_context(|| format!("indexing {}", file.display()))?;
        let stats = index.stats();
        tracing::info!(path = %file.display(), records = stats.records, terms = stats.terms, "indexed");
        out.push((file, stats));
    }
    tracing::info!(files = out.len(), "inspect complete");
    Ok(out)
}

fn run_query(input: &Path, q: &str, page: usize, html: bool, config: SearchConfig) -> Result<QueryOutput> {
    let records = load_records(input).with_context(|| format!("loading {}", input.display()))?;
    let searcher = Searcher::with_config(records, config)?;
    let ranked = searcher.ranked(q)?;
    let results = ranked
        .page(page)
        .into_iter()
        .map(|hit| {
            let excerpt_html = html.then(|| hit.excerpt.to_html());
            HitOutput { hit, excerpt_html }
        })
        .collect();
    Ok(QueryOutput { query: q.to_string(), page, page_size: ranked.page_size(), total_hits: ranked.len(), results })
}
