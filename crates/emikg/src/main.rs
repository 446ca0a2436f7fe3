use anyhow::Context;
use emikg_core::{PipelineConfig, StreamingPipeline};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emikg=info,emikg_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PipelineConfig::from_env().context("loading configuration")?;
    config.validate().context("invalid configuration")?;

    let mut pipeline = StreamingPipeline::from_config(&config)?;
    let stats = pipeline
        .run(&config.input, &config.output)
        .with_context(|| format!("building graph from {}", config.input.display()))?;

    tracing::info!(
        "Done in {} ms: {} entities defined, {} fallback IRIs, {} unknown annotation terms",
        stats.duration_ms,
        stats.entities_defined,
        stats.fallback_resolutions,
        stats.unknown_terms
    );
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}
