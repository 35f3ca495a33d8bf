// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use mandor_tracker::analytics::ActivityAnalyzer;
use mandor_tracker::config::{AnalyticsConfig, AppConfig};
use mandor_tracker::data_source::{normalize_logs, JsonTrackSource, RawTrackLog, SqliteTrackSource, TrackSource};
use mandor_tracker::history::{HistoryService, HistoryView};
use mandor_tracker::logging::{AppLogger, LoggingConfig};
use mandor_tracker::models::{Geofence, SummaryRecord};
use mandor_tracker::playback::speed_label;
use mandor_tracker::report::{render_frame, render_report};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Parser)]
#[command(name = "mandor-tracker")]
#[command(about = "Daily activity analytics and route playback for field employees")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Standalone analytics parameters (target, weights, thresholds)
    #[arg(long, global = true)]
    analytics_config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Root of an exported JSON document tree
    #[arg(long, conflicts_with = "database")]
    data_dir: Option<PathBuf>,

    /// SQLite database URL, e.g. sqlite:./tracks.db
    #[arg(long)]
    database: Option<String>,
}

#[derive(Args)]
struct QueryArgs {
    /// Employee identifier
    #[arg(long)]
    employee: String,

    /// Day to analyze (YYYY-MM-DD)
    #[arg(long)]
    date: NaiveDate,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the daily summary, scores and recommendations
    Report {
        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        source: SourceArgs,

        /// Daily target in hours
        #[arg(long)]
        expected_hours: Option<f64>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Replay the day's route to completion, one line per step
    Playback {
        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        source: SourceArgs,

        /// Interval between steps in milliseconds (400, 200, 100, 50 are the presets)
        #[arg(long)]
        speed: Option<u64>,
    },
    /// Normalize a raw log file into SQLite
    Import {
        #[command(flatten)]
        query: QueryArgs,

        /// JSON array of raw location logs
        #[arg(long)]
        file: PathBuf,

        /// SQLite database URL
        #[arg(long)]
        database: String,

        /// Also store the computed daily summary
        #[arg(long)]
        save_summary: bool,

        /// JSON array of geofences to store alongside the logs
        #[arg(long)]
        geofences: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    logging.init()?;

    let mut config = AppConfig::load(cli.config)?;
    if let Some(path) = cli.analytics_config.as_deref() {
        config.analytics = AnalyticsConfig::load_from_file(path)?;
    }

    match cli.command {
        Commands::Report {
            query,
            source,
            expected_hours,
            json,
        } => run_report(&config, query, source, expected_hours, json).await,
        Commands::Playback { query, source, speed } => run_playback(&config, query, source, speed).await,
        Commands::Import {
            query,
            file,
            database,
            save_summary,
            geofences,
        } => run_import(&config, query, file, database, save_summary, geofences).await,
    }
}

async fn open_source(args: SourceArgs, config: &AppConfig) -> Result<Arc<dyn TrackSource>> {
    if let Some(dir) = args.data_dir.or_else(|| config.data_dir.clone()) {
        info!(path = %dir.display(), "Using JSON document tree");
        return Ok(Arc::new(JsonTrackSource::new(dir)));
    }

    if let Some(url) = args.database.or_else(|| config.database_url.clone()) {
        info!(url = %url, "Using SQLite database");
        let source = SqliteTrackSource::new(&url)
            .await
            .with_context(|| format!("Failed to open database {url}"))?;
        return Ok(Arc::new(source));
    }

    bail!("No data source: pass --data-dir or --database, or set DATA_DIR / DATABASE_URL")
}

async fn run_report(
    config: &AppConfig,
    query: QueryArgs,
    source: SourceArgs,
    expected_hours: Option<f64>,
    json: bool,
) -> Result<()> {
    let service = HistoryService::new(open_source(source, config).await?, config);
    let report = service
        .load_with_target(&query.employee, query.date, expected_hours)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report, config.utc_offset()));
    }

    Ok(())
}

async fn run_playback(config: &AppConfig, query: QueryArgs, source: SourceArgs, speed: Option<u64>) -> Result<()> {
    let speed_ms = speed.unwrap_or(config.playback.default_speed_ms);
    let service = HistoryService::new(open_source(source, config).await?, config);
    let mut view = HistoryView::new(service, Duration::from_millis(speed_ms));

    let point_count = view.query(&query.employee, query.date).await?.points.len();
    if point_count == 0 {
        println!("Tidak ada data lokasi untuk {} pada {}", query.employee, query.date);
        return Ok(());
    }

    println!("Memutar {} titik dengan kecepatan {}", point_count, speed_label(speed_ms));

    let offset = config.utc_offset();
    let mut updates = view.playback().subscribe();
    view.playback_mut().play().await;

    loop {
        updates.changed().await?;
        let snapshot = updates.borrow_and_update().clone();
        println!("{}", render_frame(&snapshot, offset));
        if !snapshot.is_playing {
            break;
        }
    }

    view.close().await;
    Ok(())
}

async fn run_import(
    config: &AppConfig,
    query: QueryArgs,
    file: PathBuf,
    database: String,
    save_summary: bool,
    geofences: Option<PathBuf>,
) -> Result<()> {
    let content = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let logs: Vec<RawTrackLog> =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", file.display()))?;
    let points = normalize_logs(&logs).with_context(|| format!("Invalid log in {}", file.display()))?;

    let store = SqliteTrackSource::new(&database)
        .await
        .with_context(|| format!("Failed to open database {database}"))?;

    let started = Instant::now();
    let result = store.insert_points(&query.employee, query.date, &points).await;
    AppLogger::log_database_operation(
        "insert",
        "track_points",
        result.is_ok(),
        started.elapsed().as_millis() as u64,
    );
    let stored = result?;
    println!("{} titik disimpan untuk {} pada {}", stored, query.employee, query.date);

    if save_summary {
        let analyzer = ActivityAnalyzer::with_config(config.analytics.clone(), config.utc_offset());
        let summary = analyzer.compute_summary(&query.employee, query.date, &points, None);

        let started = Instant::now();
        let result = store
            .save_summary(&query.employee, query.date, &SummaryRecord::from(&summary))
            .await;
        AppLogger::log_database_operation(
            "upsert",
            "daily_summaries",
            result.is_ok(),
            started.elapsed().as_millis() as u64,
        );
        result?;
    }

    if let Some(path) = geofences {
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let geofences: Vec<Geofence> =
            serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

        for geofence in &geofences {
            store
                .save_geofence(geofence)
                .await
                .with_context(|| format!("Failed to store geofence '{}'", geofence.name))?;
        }
        println!("{} geofence disimpan", geofences.len());
    }

    Ok(())
}
