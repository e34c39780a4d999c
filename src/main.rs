mod catalog;
mod config;
mod error;
mod extract;
mod fetcher;
mod harvest;
mod meeting;
mod net;
mod parser;
mod retrieve;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use catalog::Catalog;
use config::{Settings, BASE_URL, DEFAULT_CATALOG_PATH, DEFAULT_CONCURRENCY, DEFAULT_DOWNLOAD_DIR};
use error::CatalogError;
use fetcher::MeetingFetcher;
use meeting::{ordinal_to_code, MeetingRange};
use net::{HttpTransport, Transport};
use retrieve::{DownloadStatus, RetrievalStats};

#[derive(Parser)]
#[command(name = "jvet_proposals", version, about = "Searchable local catalog of JVET meeting proposals")]
struct Cli {
    /// Catalog file (CSV)
    #[arg(long, global = true, default_value = DEFAULT_CATALOG_PATH)]
    db_name: PathBuf,
    /// Default directory for downloaded archives
    #[arg(long, global = true, default_value = DEFAULT_DOWNLOAD_DIR)]
    download_dir: PathBuf,
    /// Document site root
    #[arg(long, global = true, default_value = BASE_URL)]
    base_url: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch proposals of every meeting and rebuild the catalog
    Fetch {
        /// First meeting, as ordinal (165) or code (A). Default: first tracked meeting
        #[arg(long, value_parser = meeting::parse_ordinal)]
        first: Option<u32>,
        /// Last meeting, as ordinal or code. Default: latest listed meeting
        #[arg(long, value_parser = meeting::parse_ordinal)]
        last: Option<u32>,
        /// Meetings fetched at once (0 = all at once)
        #[arg(short = 'j', long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,
    },
    /// Search the catalog by title or JVET number
    Search {
        #[arg(short, long)]
        keyword: String,
        /// Download the archives of all matches
        #[arg(short, long)]
        download: bool,
        /// Download directory (default: --download-dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Copy .docx files out of downloaded .zip archives
    Extract {
        /// Directory searched recursively for archives
        #[arg(short, long)]
        input: PathBuf,
        /// Directory receiving the documents
        #[arg(short, long)]
        output: PathBuf,
    },
    /// List JVET meetings
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings {
        catalog_path: cli.db_name,
        download_dir: cli.download_dir,
        base_url: cli.base_url,
    };

    let result = match cli.command {
        Commands::Fetch { first, last, concurrency } => run_fetch(&settings, first, last, concurrency).await,
        Commands::Search { keyword, download, output } => run_search(&settings, &keyword, download, output).await,
        Commands::Extract { input, output } => run_extract(&input, &output),
        Commands::Info => run_info(&settings).await,
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn http(settings: &Settings) -> Result<(Arc<dyn Transport>, MeetingFetcher)> {
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new()?);
    let fetcher = MeetingFetcher::new(Arc::clone(&transport), settings.base_url.clone());
    Ok((transport, fetcher))
}

async fn run_fetch(settings: &Settings, first: Option<u32>, last: Option<u32>, concurrency: usize) -> Result<()> {
    let (_, fetcher) = http(settings)?;

    let range = match (first, last) {
        (Some(first), Some(last)) => MeetingRange::new(first, last),
        _ => {
            // Without both bounds the meeting list decides; if it is unreachable there is nothing to harvest.
            let meetings = fetcher
                .fetch_meeting_list()
                .await
                .context("Failed to fetch the meeting list")?;
            MeetingRange::from_meeting_count(meetings.len())
                .and_then(|listed| MeetingRange::new(first.unwrap_or(listed.first), last.unwrap_or(listed.last)))
        }
    };
    let Some(range) = range else {
        bail!("Empty meeting range (first {:?}, last {:?})", first, last);
    };

    let report = harvest::harvest(&fetcher, range, concurrency).await?;
    let catalog = Catalog::new(&settings.catalog_path);
    catalog.save(&report.records)?;

    println!(
        "Catalogued {} proposals from {} meetings ({} ok, {} failed) in {:.2}s -> {}",
        report.records.len(),
        report.meetings,
        report.ok,
        report.failed.len(),
        report.elapsed.as_secs_f64(),
        catalog.path().display()
    );
    if !report.failed.is_empty() {
        let codes: Vec<String> = report.failed.iter().map(|&o| ordinal_to_code(o)).collect();
        println!("Failed meetings: {}", codes.join(", "));
    }
    Ok(())
}

async fn run_search(settings: &Settings, keyword: &str, download: bool, output: Option<PathBuf>) -> Result<()> {
    let catalog = Catalog::new(&settings.catalog_path);
    let matched = match catalog.query(keyword) {
        Ok(m) => m,
        Err(e @ CatalogError::NotFound(_)) => {
            error!("{}", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if matched.is_empty() {
        println!("No proposals matched \"{}\"", keyword);
        return Ok(());
    }

    for r in &matched {
        println!("{}: {} [{}]", r.jvet_number, truncate(&r.title, 100), r.category.label());
    }
    println!("\n{} proposals matched \"{}\"", matched.len(), keyword);

    if download {
        let dest = output.unwrap_or_else(|| settings.download_dir.clone());
        let (transport, _) = http(settings)?;
        info!("Downloading {} proposals to {}", matched.len(), dest.display());
        let outcomes = retrieve::retrieve(transport.as_ref(), &matched, &dest).await?;
        let stats = RetrievalStats::from_outcomes(&outcomes);
        println!(
            "Downloads: {} ok, {} already present, {} failed ({})",
            stats.succeeded,
            stats.skipped,
            stats.failed,
            dest.display()
        );
        for o in &outcomes {
            if let DownloadStatus::Failed(reason) = &o.status {
                println!("  {} ({}): {}", o.record.jvet_number, o.record.download_link, reason);
            }
        }
    }
    Ok(())
}

fn run_extract(input: &std::path::Path, output: &std::path::Path) -> Result<()> {
    match extract::extract_archives(input, output) {
        Ok(report) => {
            println!(
                "Copied {} documents from {} archives ({} unreadable) to {}",
                report.documents,
                report.archives,
                report.failed,
                output.display()
            );
        }
        Err(e) => error!("{}", e),
    }
    Ok(())
}

async fn run_info(settings: &Settings) -> Result<()> {
    let (_, fetcher) = http(settings)?;
    let meetings = fetcher
        .fetch_meeting_list()
        .await
        .context("Failed to fetch the meeting list")?;

    println!(
        "{:>6} | {:>4} | {:<24} | {:<10} | {:<10} | {}",
        "Number", "Code", "Name", "Start", "End", "USL"
    );
    println!("{}", "-".repeat(80));
    for m in &meetings {
        println!(
            "{:>6} | {:>4} | {:<24} | {:<10} | {:<10} | {}",
            m.number,
            m.code().unwrap_or_default(),
            truncate(&m.name, 24),
            m.start_date,
            m.end_date,
            m.usl
        );
    }
    println!("\n{} meetings", meetings.len());
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
