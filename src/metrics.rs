use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::path::Path;

pub mod external;
pub mod import;
pub mod process;

pub static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder and describe the application metrics
pub fn register_metrics() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("Metrics recorder already registered"))?;

    import::register_metrics();
    external::register_metrics();
    process::register_metrics();

    Ok(())
}

/// Render the recorded metrics into a Prometheus textfile
pub fn write_to_file(path: &Path) -> anyhow::Result<()> {
    let handle = METRICS_HANDLE
        .get()
        .ok_or_else(|| anyhow::anyhow!("Metrics recorder is not registered"))?;

    std::fs::write(path, handle.render())?;
    tracing::info!("Wrote metrics to {}", path.display());

    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub enum Status {
    Success,
    Failure,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::Failure => write!(f, "failure"),
        }
    }
}
