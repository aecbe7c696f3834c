use std::time::Duration;

use metrics::{counter, histogram};

pub(crate) fn record_store_operation(op: &str, status: &str, duration: Duration) {
    counter!(
        "graph_store_operations_total",
        "op" => op.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "graph_store_operation_duration_seconds",
        "op" => op.to_string()
    )
    .record(duration.as_secs_f64());
}
