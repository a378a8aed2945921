// src/main.rs
use anyhow::Context;
use log::{debug, info};
use shadegraph::{ChartConfig, Pipeline};
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = ChartConfig::default();
    debug!("config: {}", serde_json::to_string(&config)?);
    let pipeline = Pipeline::new(config).context("invalid chart configuration")?;
    let path = pipeline
        .run()
        .with_context(|| format!("failed to build {}", pipeline.config().output_path.display()))?;
    info!("chart saved to {}", path.display());
    println!("{}", path.display());
    Ok(())
}
