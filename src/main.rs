use anyhow::Context;
use clap::Parser;
use spinematch::{parse_catalog, MatchOptions, Matcher, MatcherConfig};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Match OCR book-spine text against a catalog
#[derive(Parser, Debug)]
#[command(name = "spinematch")]
#[command(about = "Fuzzy-match OCR book-spine text against a catalog", long_about = None)]
struct Args {
    /// Catalog JSON: an array of records or a search response with `docs`
    #[arg(short, long)]
    catalog: PathBuf,

    /// Query text; repeatable. Reads one query per stdin line when omitted
    #[arg(short, long)]
    query: Vec<String>,

    /// JSON config file, applied before SPINEMATCH_* environment variables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum results per query
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Confidence threshold for a match
    #[arg(short, long)]
    threshold: Option<f32>,

    /// Disable character n-gram retrieval and scoring
    #[arg(long)]
    no_char_ngrams: bool,

    /// Use the legacy matcher when the primary matcher fails
    #[arg(long)]
    legacy_fallback: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn load_config(args: &Args) -> anyhow::Result<MatcherConfig> {
    let config = match &args.config {
        Some(path) => MatcherConfig::from_json_file(path)?,
        None => MatcherConfig::default(),
    };
    let mut config = config.with_env_overrides()?;

    if let Some(top_k) = args.top_k {
        config.top_k = top_k;
    }
    if let Some(threshold) = args.threshold {
        config.confidence_threshold = threshold;
    }
    if args.no_char_ngrams {
        config.use_character_ngrams = false;
    }
    if args.legacy_fallback {
        config.enable_legacy_fallback = true;
    }
    config.validate()?;
    Ok(config)
}

fn read_queries(args: &Args) -> anyhow::Result<Vec<String>> {
    if !args.query.is_empty() {
        return Ok(args.query.clone());
    }
    let mut queries = Vec::new();
    for line in std::io::stdin().lock().lines() {
        let line = line.context("failed to read query from stdin")?;
        if !line.trim().is_empty() {
            queries.push(line);
        }
    }
    Ok(queries)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries the JSON reports
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting spinematch v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args)?;
    let raw = std::fs::read_to_string(&args.catalog)
        .with_context(|| format!("failed to read catalog {}", args.catalog.display()))?;
    let catalog = parse_catalog(&raw)
        .with_context(|| format!("failed to parse catalog {}", args.catalog.display()))?;
    info!("Catalog: {:?} ({} records)", args.catalog, catalog.len());

    let matcher = Matcher::new(config)?;
    matcher.fit(&catalog)?;

    let options = MatchOptions::new(matcher.config().top_k, matcher.config().confidence_threshold);
    let queries = read_queries(&args)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for query in &queries {
        let report = matcher.match_report(query, &options)?;
        if args.pretty {
            serde_json::to_writer_pretty(&mut out, &report)?;
        } else {
            serde_json::to_writer(&mut out, &report)?;
        }
        writeln!(out)?;
    }

    info!("Matched {} queries", queries.len());
    Ok(())
}
