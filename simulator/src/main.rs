use anyhow::Context;
use clap::Parser;
use doodlecore::present::summarize;
use doodlecore::session::LayerVisibility;
use doodlecore::UserPolygon;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::ServiceConfig;
use workflow::runner::Analyzer;

mod api;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Synthetic land-cover analysis backend")]
struct Args {
    /// Analyze a GeoJSON polygon feature once and print the summary
    #[arg(long)]
    offline: Option<PathBuf>,
    /// Write the offline analysis response as JSON
    #[arg(long)]
    report: Option<PathBuf>,
    /// Load a service config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 8000)]
    port: u16,
    #[arg(long, default_value_t = 50)]
    max_tiles: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,
    /// Serve the HTTP API even after an offline run
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn run_offline(
    analyzer: &Analyzer,
    polygon_path: &Path,
    report: Option<&Path>,
) -> anyhow::Result<()> {
    let contents = fs::read_to_string(polygon_path)
        .with_context(|| format!("reading zone {}", polygon_path.display()))?;
    let polygon: UserPolygon = serde_json::from_str(&contents)
        .with_context(|| format!("parsing zone {}", polygon_path.display()))?;

    let response = analyzer.execute(&polygon)?;
    let summary = summarize(&response.metadata, &LayerVisibility::default());
    println!(
        "Offline run -> {} ({}), {} categories",
        summary.total_area,
        summary.total_acres,
        response.features.len()
    );
    for row in &summary.rows {
        println!("  {} {:<14} {}", row.marker, row.label, row.percentage);
    }
    println!("{}", summary.footer);

    if let Some(report_path) = report {
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&response)?;
        fs::write(report_path, json)
            .with_context(|| format!("writing report {}", report_path.display()))?;
        log::info!("wrote analysis report to {}", report_path.display());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = if let Some(path) = &args.config {
        ServiceConfig::load(path)?
    } else {
        ServiceConfig::from_args(args.port, args.max_tiles, args.seed, args.latency_ms)
    };
    let analyzer = Arc::new(Analyzer::new(config));

    if let Some(path) = &args.offline {
        run_offline(&analyzer, path, args.report.as_deref())?;
    }

    if args.serve || args.offline.is_none() {
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating runtime for the analysis API")?;
        runtime.block_on(api::serve(analyzer, async {
            if let Err(err) = signal::ctrl_c().await {
                log::error!("awaiting Ctrl+C failed: {}", err);
            }
        }))?;
    }

    Ok(())
}
