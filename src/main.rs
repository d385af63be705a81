//! Runs the production pipeline and prints the total.
//!
//! Stdout carries exactly one line, the decimal total. Diagnostics go to
//! stderr and are silent below `warn` unless `RUST_LOG` says otherwise.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tristage::observability::init_metrics;
use tristage::pipeline::{Pipeline, PipelineConfig};

#[tokio::main]
async fn main() -> tristage::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_names(true),
        )
        .init();
    init_metrics();

    let total = Pipeline::standard(PipelineConfig::default())
        .run_async()
        .await?;
    println!("{total}");
    Ok(())
}
