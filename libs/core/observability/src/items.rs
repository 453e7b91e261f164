//! Metrics for the item store.

use metrics::{counter, histogram};

/// Item store metrics recorder
pub struct ItemMetrics;

impl ItemMetrics {
    /// Record one accessor call. `outcome` is `ok` or the error kind
    /// (`validation`, `not_found`, `conflict`, `store_unavailable`).
    pub fn record_operation(operation: &'static str, outcome: &'static str, duration_secs: f64) {
        counter!(
            "items_operations_total",
            "operation" => operation,
            "outcome" => outcome
        )
        .increment(1);

        histogram!(
            "items_operation_duration_seconds",
            "operation" => operation
        )
        .record(duration_secs);
    }

    /// Record a completed seed load
    pub fn record_seed(processed: u64, replace: bool) {
        counter!(
            "items_seeded_total",
            "mode" => if replace { "replace" } else { "merge" }
        )
        .increment(processed);

        tracing::debug!(processed, replace, "Seed load recorded");
    }
}
