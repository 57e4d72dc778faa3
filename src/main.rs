//! statscrape CLI
//!
//! Scrapes paginated player stats tables into CSV files.

use anyhow::{bail, Context};
use clap::Parser;
use statscrape::browser::{ChromiumSessionFactory, SessionController};
use statscrape::config::{variants, ScraperConfig, TargetPlan};
use statscrape::export::CsvExporter;
use statscrape::orchestrator::{RunTally, TargetOrchestrator, TargetStatus};
use statscrape::target::parse_param_list;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Paginated player statistics scraper
#[derive(Parser, Debug)]
#[command(name = "statscrape")]
#[command(version)]
#[command(about = "Scrape paginated player stats tables into CSV")]
struct Args {
    /// TOML run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in variant to run when no config file is given
    #[arg(long, default_value = "dunkest")]
    variant: String,

    /// Weeks to scrape (dunkest), e.g. `1-43` or `1,3,5-7`
    #[arg(long, default_value = variants::DEFAULT_WEEKS)]
    weeks: String,

    /// Season directory name (dunkest)
    #[arg(long, default_value = variants::DEFAULT_SEASON)]
    season: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Maximum pages per target
    #[arg(long)]
    page_cap: Option<usize>,

    /// Run in headless mode
    #[arg(long)]
    headless: Option<bool>,

    /// Path to Chrome/Chromium executable
    #[arg(long)]
    chrome_path: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Resolve configuration and targets. Failure here stops the run; a config
/// file with some bad entries still runs the good ones.
fn prepare(args: &Args) -> anyhow::Result<(ScraperConfig, TargetPlan)> {
    let mut config = match &args.config {
        Some(path) => ScraperConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ScraperConfig::default(),
    };

    if let Some(dir) = &args.output_dir {
        config.run.output_dir = dir.clone();
    }
    if let Some(cap) = args.page_cap {
        config.run.page_cap = cap;
    }
    if let Some(headless) = args.headless {
        config.browser.headless = headless;
    }
    if let Some(path) = &args.chrome_path {
        config.browser.chrome_path = Some(path.clone());
    }

    let plan = if args.config.is_some() {
        config.targets().context("invalid target list")?
    } else {
        let timing = config.run.timing();
        let output_dir = &config.run.output_dir;
        let targets = match args.variant.to_ascii_lowercase().as_str() {
            "dunkest" => {
                let weeks = parse_param_list(&args.weeks).context("invalid --weeks")?;
                variants::dunkest_weeks(&args.season, &weeks, output_dir, timing)?
            }
            "givemestats" => vec![variants::givemestats_target(output_dir, timing)],
            other => bail!(
                "unknown variant '{}' (expected one of: {})",
                other,
                variants::VARIANTS.join(", ")
            ),
        };
        TargetPlan {
            targets,
            rejected: Vec::new(),
        }
    };

    Ok((config, plan))
}

fn print_summary(tally: &RunTally) {
    for report in &tally.reports {
        match &report.status {
            TargetStatus::Succeeded {
                records,
                pages,
                stop_reason,
                output,
            } => println!(
                "  ok    {}: {} records, {} pages ({}) -> {}",
                report.label,
                records,
                pages,
                stop_reason,
                output.display()
            ),
            TargetStatus::Failed { error, reconnected } => println!(
                "  FAIL  {}: {}{}",
                report.label,
                error,
                if *reconnected { " (session relaunched)" } else { "" }
            ),
        }
    }
    println!(
        "Successful: {}/{}  Failed: {}/{}",
        tally.succeeded,
        tally.total(),
        tally.failed,
        tally.total()
    );
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if args.verbose { "debug" } else { "info" })
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("{} v{} starting", statscrape::NAME, statscrape::VERSION);

    let (config, plan) = match prepare(&args) {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::error!("{:#}", e);
            return ExitCode::from(2);
        }
    };

    let factory = ChromiumSessionFactory::new(config.browser.clone());
    let session = match SessionController::start(factory)
        .await
        .context("failed to start browser session")
    {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("{:#}", e);
            return ExitCode::from(2);
        }
    };

    let mut orchestrator = TargetOrchestrator::new(session, CsvExporter)
        .with_inter_target_delay(config.run.inter_target_delay());
    let mut tally = orchestrator.run(&plan.targets).await;
    orchestrator.shutdown().await;

    for rejected in &plan.rejected {
        tally.record_rejected(rejected.label.as_str(), &rejected.error);
    }

    print_summary(&tally);
    tally.exit_code()
}
