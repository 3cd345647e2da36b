use std::path::PathBuf;

use anyhow::Context;
use i94_star::{Pipeline, PipelineConfig};
use log::info;

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

/// Config path from the first argument, else `I94_CONFIG`
fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("I94_CONFIG").map(PathBuf::from))
}

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match config_path() {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            PipelineConfig::from_path(&path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?
        }
        None => {
            info!("No configuration given, using defaults");
            let mut config = PipelineConfig::default();
            if let Some(batch_size) = i94_star::config::get_batch_size() {
                config.batch_size = batch_size;
            }
            config
        }
    };
    config.validate().context("invalid configuration")?;

    let summary = Pipeline::new(config)
        .run()
        .context("star schema run failed")?;

    info!(
        "Ingested {} rows from {} sources; {} of {} staged rows survived cleaning",
        summary.ingest.rows,
        summary.ingest.sources,
        summary.cleaning.after_state_sentinel,
        summary.cleaning.input_rows
    );
    for (table, rows) in &summary.quality.table_rows {
        info!("{table}: {rows} rows");
    }
    Ok(())
}
