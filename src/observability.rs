use std::time::Duration;

use metrics::{counter, histogram};

pub(crate) fn record_publish_item(item_type: &str, status: &str, duration: Duration) {
    counter!(
        "engine_publish_items_total",
        "type" => item_type.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "engine_publish_item_duration_seconds",
        "type" => item_type.to_string()
    )
    .record(duration.as_secs_f64());
}

pub(crate) fn record_publish_batch(duration: Duration, failures: usize) {
    let status = if failures == 0 { "ok" } else { "partial" };
    counter!(
        "engine_publish_batches_total",
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("engine_publish_batch_duration_seconds").record(duration.as_secs_f64());
}

pub(crate) fn record_diff(duration: Duration, items: usize) {
    histogram!("engine_diff_duration_seconds").record(duration.as_secs_f64());
    histogram!("engine_diff_items").record(items as f64);
}

pub(crate) fn record_audit_visibility_rewrite(records: usize) {
    counter!("engine_audit_visibility_rewrites_total").increment(records as u64);
}
