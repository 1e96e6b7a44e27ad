use crate::metrics::Status;
use metrics::{counter, describe_counter, describe_gauge, gauge};

/// Register the metrics for the application
pub(super) fn register_metrics() {
    // Count of processed files. Should be labeled with the status (success or failure).
    describe_counter!("import_files_total", "Total number of processed import files");

    describe_counter!("alerts_imported_total", "Total number of alerts submitted");

    // Count of dropped records. Should be labeled with the reason.
    describe_counter!(
        "alerts_skipped_total",
        "Total number of records dropped during mapping"
    );

    describe_counter!(
        "alerts_truncated_total",
        "Total number of records beyond the per-file import limit"
    );

    describe_gauge!(
        "last_successful_import_timestamp",
        "Timestamp of the last successful import"
    );
}

/// Record a processed file with the given status
pub fn record_import_file(status: Status) {
    counter!("import_files_total", "status" => status.to_string()).increment(1);
}

/// Record the number of alerts submitted for one file
pub fn record_alerts_imported(count: usize) {
    counter!("alerts_imported_total").increment(count as u64);
}

/// Record a dropped record
pub fn record_alert_skipped(reason: SkipReason) {
    counter!("alerts_skipped_total", "reason" => reason.to_string()).increment(1);
}

/// Record records left out by truncation
pub fn record_alerts_truncated(count: usize) {
    counter!("alerts_truncated_total").increment(count as u64);
}

/// Record the timestamp of the last successful import
pub fn record_successful_import() {
    let timestamp = chrono::Utc::now().timestamp() as f64;

    gauge!("last_successful_import_timestamp").set(timestamp);
}

#[derive(Debug, Clone, Copy)]
pub enum SkipReason {
    MarketNotFound,
    InvalidRecord,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MarketNotFound => write!(f, "market_not_found"),
            SkipReason::InvalidRecord => write!(f, "invalid_record"),
        }
    }
}
