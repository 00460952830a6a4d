use anyhow::Context;
use largedoc::generate::{write_large_document, GenerateConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
  tracing_subscriber::registry()
    .with(tracing_subscriber::fmt::layer())
    .with(tracing_subscriber::filter::LevelFilter::INFO)
    .init();

  let config = GenerateConfig::default();

  let report = write_large_document(&config)
    .with_context(|| format!("failed to write {}", config.output_path.display()))?;

  tracing::info!(
    path = %report.path.display(),
    chars = report.char_count,
    bytes = report.bytes_written,
    "done"
  );

  Ok(())
}
