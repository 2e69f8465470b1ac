use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wikigraph_core::report::{gather_stats, render_graph, render_page, render_paths, render_rank, render_stats};
use wikigraph_core::{CrawlPolicy, Database, GraphService, PageRankConfig, PathFinder, summarize_pagerank};
use wikigraph_scanner::{ClientConfig, MediaWikiClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Arguments shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub db_path: PathBuf,
    pub api_url: Option<String>,
    pub quiet: bool,
    pub format: OutputFormat,
}

impl GlobalOptions {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let db = matches
            .get_one::<String>("db")
            .map(String::as_str)
            .unwrap_or(crate::commands::DEFAULT_DB_PATH);

        Self {
            db_path: expand_db_path(db),
            api_url: matches.get_one::<String>("api-url").cloned(),
            quiet: matches.get_flag("quiet"),
            format: matches
                .get_one::<String>("format")
                .and_then(|f| OutputFormat::parse(f))
                .unwrap_or(OutputFormat::Text),
        }
    }
}

pub fn expand_db_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Log to stderr so `--format json` output stays clean.
pub fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

pub fn client_config(api_url: Option<&str>) -> ClientConfig {
    let mut config = ClientConfig::default();
    if let Some(url) = api_url {
        config.api_url = url.to_string();
    }
    config
}

/// Open the database, creating its directory and schema on first use.
pub fn open_database(path: &Path) -> Result<Database> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    debug!("Opening database {}", path.display());
    Database::new(path).with_context(|| format!("Failed to open database {}", path.display()))
}

fn build_client(global: &GlobalOptions) -> Result<MediaWikiClient> {
    MediaWikiClient::with_config(client_config(global.api_url.as_deref()))
        .context("Failed to build HTTP client")
}

fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => print!("{}", text()),
    }
    Ok(())
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

pub fn handle_init(global: &GlobalOptions, args: &ArgMatches) -> Result<()> {
    let force = args.get_flag("force");
    let db_path = global.db_path.as_path();

    if !global.quiet {
        print_divider();
        println!("{}", "  WIKIGRAPH INITIALIZATION".bright_white().bold());
        print_divider();
        println!();
    }

    if Database::exists(db_path) {
        if !force {
            println!("{}", "⚠ WARNING".yellow().bold());
            println!(
                "A database already exists at {}",
                db_path.display().to_string().bright_white()
            );
            println!("Run again with {} to replace it.", "--force".bright_cyan());
            return Ok(());
        }
        Database::drop(db_path)
            .with_context(|| format!("Failed to delete {}", db_path.display()))?;
        println!("{} Deleted existing database", "✓".green().bold());
    }

    open_database(db_path)?;
    println!(
        "{} Database: {}",
        "✓".green().bold(),
        db_path.display().to_string().bright_white()
    );
    Ok(())
}

pub async fn handle_page(global: &GlobalOptions, args: &ArgMatches) -> Result<()> {
    let db = open_database(&global.db_path)?;
    let client = build_client(global)?;
    let service = GraphService::new(&client, &db);

    let page = if let Some(&page_id) = args.get_one::<i64>("id") {
        service.get_page_by_id(page_id)?
    } else if let Some(title) = args.get_one::<String>("title") {
        service.get_or_crawl_page_by_title(title).await?
    } else {
        None
    };

    match page {
        Some(page) => emit(global.format, &page, || render_page(&page)),
        None => {
            eprintln!("{} Page not found", "✗".red().bold());
            Ok(())
        }
    }
}

pub async fn handle_graph(global: &GlobalOptions, args: &ArgMatches) -> Result<()> {
    let seed = args
        .get_one::<String>("SEED")
        .context("A seed title is required")?;
    let depth = args.get_one::<usize>("depth").copied().unwrap_or(1);
    let max_neighbors = args
        .get_one::<usize>("max-neighbors")
        .copied()
        .unwrap_or(wikigraph_core::crawl::DEFAULT_MAX_NEIGHBORS);

    let policy = if args.get_flag("include-years") {
        CrawlPolicy::allow_all()
    } else {
        CrawlPolicy::default()
    }
    .with_max_neighbors(max_neighbors);

    let db = open_database(&global.db_path)?;
    let client = build_client(global)?;

    let progress = spinner(global.quiet);
    progress.set_message(format!("Crawling from '{}'", seed));
    let bar = progress.clone();
    let service = GraphService::new(&client, &db)
        .with_policy(policy)
        .with_progress_callback(Arc::new(move |msg: String| bar.set_message(msg)));

    let view = service.build_graph(seed, depth).await;
    progress.finish_and_clear();

    match view? {
        Some(view) => emit(global.format, &view, || render_graph(seed, &view)),
        None => {
            eprintln!("{} Could not crawl '{}'", "✗".red().bold(), seed);
            Ok(())
        }
    }
}

pub fn handle_rank(global: &GlobalOptions, args: &ArgMatches) -> Result<()> {
    let defaults = PageRankConfig::default();
    let config = PageRankConfig {
        damping: args.get_one::<f64>("damping").copied().unwrap_or(defaults.damping),
        max_iterations: args
            .get_one::<usize>("max-iter")
            .copied()
            .unwrap_or(defaults.max_iterations),
        tolerance: args
            .get_one::<f64>("tolerance")
            .copied()
            .unwrap_or(defaults.tolerance),
    };
    let top = args.get_one::<usize>("top").copied().unwrap_or(10);

    let db = open_database(&global.db_path)?;
    let summary = summarize_pagerank(&db, config, top)?;

    emit(global.format, &summary, || render_rank(&summary))
}

pub fn handle_path(global: &GlobalOptions, args: &ArgMatches) -> Result<()> {
    let source = *args
        .get_one::<i64>("SOURCE_ID")
        .context("A source page id is required")?;
    let target = *args
        .get_one::<i64>("TARGET_ID")
        .context("A target page id is required")?;
    let max_depth = args
        .get_one::<usize>("max-depth")
        .copied()
        .unwrap_or(wikigraph_core::paths::DEFAULT_MAX_DEPTH);

    let db = open_database(&global.db_path)?;
    let outcome = PathFinder::new(&db).find_paths(source, target, max_depth)?;

    emit(global.format, &outcome, || render_paths(&outcome))
}

pub fn handle_stats(global: &GlobalOptions) -> Result<()> {
    let db = open_database(&global.db_path)?;
    let stats = gather_stats(&db)?;
    emit(global.format, &stats, || render_stats(&stats))
}
