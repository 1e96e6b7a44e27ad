use metrics::{describe_gauge, gauge};

/// Register the metrics for the application
pub(super) fn register_metrics() {
    describe_gauge!(
        "build_info",
        "Build information of the application, labeled by version"
    );

    record_build_info();
}

/// Record the build information of the application
pub fn record_build_info() {
    let version = env!("CARGO_PKG_VERSION");

    gauge!("build_info", "version" => version.to_string()).set(1.0);
}
