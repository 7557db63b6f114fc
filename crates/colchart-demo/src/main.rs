//! Live column-chart demo.
//!
//! A mock engine releases play counts one artist at a time, then jitters the
//! counts for a few rounds. Every batch is pumped into a feed observed by a
//! plain, a grouped and a stacked chart, and the recomputed geometry is
//! printed after each batch.
//!
//! ```text
//! colchart-demo [--config chart.json] [--json]
//! ```

mod charts;
mod mock;
mod render;

use charts::DemoCharts;
use clap::Parser;
use colchart_feed::{BatchFeed, ChartConfig, pump};
use mock::{MockConfig, run_mock_engine};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "colchart-demo")]
#[command(about = "Stream mock play counts through live column charts")]
#[command(version)]
struct Cli {
    /// Chart configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print one JSON document per batch instead of text
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn chart_config(&self) -> Result<ChartConfig, Box<dyn std::error::Error>> {
        match &self.config {
            Some(path) => Ok(ChartConfig::from_json(&std::fs::read_to_string(path)?)?),
            None => Ok(charts::default_config()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = Cli::parse();
    let config = options.chart_config()?;
    tracing::info!(?config, "Starting colchart demo");

    let feed = BatchFeed::new();
    let mut charts = DemoCharts::new(&config)?;
    charts.observe(&feed);
    let charts = Arc::new(charts);

    // Registered after the charts, so it runs once they have recomputed
    let printer = {
        let charts = Arc::clone(&charts);
        let json = options.json;
        feed.subscribe(move |_batch| {
            if json {
                match render::json(&charts) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::error!("Failed to serialize snapshots: {}", e),
                }
            } else {
                print!("{}", render::summary(&charts));
            }
        })
    };

    let (tx, rx) = broadcast::channel(16);
    let pump_task = tokio::spawn(pump(rx, feed.clone()));
    let mut engine_task = tokio::spawn(run_mock_engine(tx, MockConfig::default()));

    tokio::select! {
        result = &mut engine_task => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
            // dropping the engine's sender closes the pump
            engine_task.abort();
        }
    }

    let forwarded = pump_task.await?;
    printer.cancel();

    tracing::info!(
        forwarded,
        published = feed.published(),
        revisions = ?charts.revisions(),
        "Demo finished"
    );
    Ok(())
}
