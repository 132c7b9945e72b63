use std::time::Duration;

use metrics::{counter, gauge, histogram};

use crate::error::TripleStoreError;

pub(crate) fn record_backend_query_bytes_total(backend: &str, op: &str, bytes: usize) {
    counter!(
        "triple_store_backend_query_bytes_total",
        "backend" => backend.to_string(),
        "op" => op.to_string()
    )
    .increment(bytes as u64);
}

pub(crate) fn record_backend_result_bytes_total(backend: &str, op: &str, bytes: usize) {
    counter!(
        "triple_store_backend_result_bytes_total",
        "backend" => backend.to_string(),
        "op" => op.to_string()
    )
    .increment(bytes as u64);
}

pub(crate) fn record_backend_permit_wait(backend: &str, op: &str, wait: Duration) {
    histogram!(
        "triple_store_backend_permit_wait_seconds",
        "backend" => backend.to_string(),
        "op" => op.to_string()
    )
    .record(wait.as_secs_f64());
}

pub(crate) fn record_backend_permit_snapshot(backend: &str, max: usize, available: usize) {
    gauge!(
        "triple_store_backend_permits_in_use",
        "backend" => backend.to_string()
    )
    .set(max.saturating_sub(available) as f64);
    gauge!(
        "triple_store_backend_permits_max",
        "backend" => backend.to_string()
    )
    .set(max as f64);
}

pub(crate) fn record_backend_operation(
    backend: &str,
    op: &str,
    error: Option<&TripleStoreError>,
    duration: Duration,
) {
    let status = if error.is_some() { "error" } else { "ok" };
    let error_class = error.map_or("none", classify_error);

    counter!(
        "triple_store_backend_operations_total",
        "backend" => backend.to_string(),
        "op" => op.to_string(),
        "status" => status,
        "error_class" => error_class
    )
    .increment(1);
    histogram!(
        "triple_store_backend_operation_duration_seconds",
        "backend" => backend.to_string(),
        "op" => op.to_string(),
        "status" => status
    )
    .record(duration.as_secs_f64());
}

/// Whole bulk-import run: every loader step plus the wait for the import lock.
pub(crate) fn record_bulk_import(
    backend: &str,
    incremental: bool,
    error: Option<&TripleStoreError>,
    duration: Duration,
) {
    let status = if error.is_some() { "error" } else { "ok" };
    let mode = if incremental { "incremental" } else { "replace" };

    counter!(
        "triple_store_bulk_import_total",
        "backend" => backend.to_string(),
        "mode" => mode,
        "status" => status
    )
    .increment(1);
    histogram!(
        "triple_store_bulk_import_duration_seconds",
        "backend" => backend.to_string(),
        "mode" => mode,
        "status" => status
    )
    .record(duration.as_secs_f64());
}

pub(crate) fn classify_error(error: &TripleStoreError) -> &'static str {
    match error {
        TripleStoreError::SemaphoreClosed => "semaphore_closed",
        TripleStoreError::Closed => "closed",
        TripleStoreError::Http(e) if e.is_timeout() => "timeout",
        TripleStoreError::Http(_) => "http",
        TripleStoreError::Io(_) => "io",
        TripleStoreError::Backend { status, .. } if *status >= 500 => "backend_5xx",
        TripleStoreError::Backend { status, .. } if *status >= 400 => "backend_4xx",
        TripleStoreError::Backend { .. } => "backend_other",
        TripleStoreError::Sql { .. } => "sql",
        TripleStoreError::ConnectionFailed { .. } => "connection_failed",
        TripleStoreError::Authentication { .. } | TripleStoreError::MissingCredentials(_) => {
            "authentication"
        }
        TripleStoreError::ParseError { .. } => "parse_error",
        TripleStoreError::InvalidQuery { .. } => "invalid_query",
        TripleStoreError::InvalidIri { .. } | TripleStoreError::InvalidInput { .. } => {
            "invalid_input"
        }
        TripleStoreError::Unsupported { .. } => "unsupported",
        TripleStoreError::Other(_) => "other",
    }
}
