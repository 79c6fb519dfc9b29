mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod scrapers;
mod storage;

use analysis::AnalysisReport;
use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands};
use config::{AnalysisConfig, Brand, BrowserConfig, ScrapeConfig};
use models::{CatalogSnapshot, Gender, RunManifest};
use scrapers::{ChromeDriver, ExtractionSession, ReviewCollector};
use storage::{load_snapshot, save_artifact, JsonFileStore, DATA_ARTIFACT};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let store = JsonFileStore::new(&cli.output_dir);

    info!("👟 Shoe Scout - RunRepeat review analysis");
    info!("Artifacts go to {}", store.dir().display());

    match cli.command {
        Commands::Collect {
            brands,
            genders,
            headed,
            chrome_path,
            analysis,
        } => {
            let brands = cli::resolve_brands(&brands);
            let genders = cli::resolve_genders(&genders);
            let browser = cli::browser_config(headed, chrome_path);

            let started_at = Utc::now();
            let snapshot = collect(&brands, &genders, &browser)?;
            if snapshot.is_empty() {
                warn!("No shoes collected, the catalog layout may have changed");
            } else {
                info!("✅ Collected {} shoes", snapshot.len());
            }

            save_artifact(&store, DATA_ARTIFACT, &snapshot)
                .await
                .context("Failed to save the catalog snapshot")?;
            let manifest = RunManifest::new(started_at, &snapshot, &genders);
            save_artifact(&store, "run_manifest", &manifest).await?;
            info!("💾 Saved snapshot and run manifest");

            analyze(&store, &snapshot, analysis.into()).await
        }
        Commands::Analyze { analysis } => {
            let snapshot = load_snapshot(&store)
                .await?
                .with_context(|| {
                    format!("No catalog snapshot at {}", store.path_for(DATA_ARTIFACT).display())
                })?;
            info!("Loaded {} shoes", snapshot.len());

            analyze(&store, &snapshot, analysis.into()).await
        }
    }
}

/// Scrape every brand and gender with one browser, closed before returning
fn collect(brands: &[Brand], genders: &[Gender], browser: &BrowserConfig) -> anyhow::Result<CatalogSnapshot> {
    let driver = ChromeDriver::launch(browser).context("Browser setup failed")?;
    let session = ExtractionSession::new(driver, ScrapeConfig::default());

    let mut collector = ReviewCollector::new(session);
    let snapshot = collector.collect(brands, genders);
    collector.finish();

    Ok(snapshot)
}

async fn analyze(
    store: &JsonFileStore,
    snapshot: &CatalogSnapshot,
    config: AnalysisConfig,
) -> anyhow::Result<()> {
    let report = AnalysisReport::build(snapshot, &config);
    report.log_summary(&config.reference_brand);
    report
        .persist(store)
        .await
        .context("Failed to save analysis artifacts")?;
    Ok(())
}
