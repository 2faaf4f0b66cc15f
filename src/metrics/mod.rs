//! Metrics module for the application.
//!
//! - This module contains the global Prometheus registry.
//! - Defines the admission and reconciliation metrics.

use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

lazy_static! {
    // Global Prometheus registry.
    pub static ref REGISTRY: Registry = Registry::new();

    // Counter: admission decisions by outcome (accepted, duplicate, rejected) and reason code.
    pub static ref ADMISSIONS_TOTAL: CounterVec = {
        let opts = Opts::new("admissions_total", "Total number of admission decisions");
        let counter_vec = CounterVec::new(opts, &["outcome", "reason"]).unwrap();
        REGISTRY.register(Box::new(counter_vec.clone())).unwrap();
        counter_vec
    };

    // Counter: lifecycle transitions by target state.
    pub static ref STATUS_TRANSITIONS_TOTAL: CounterVec = {
        let opts = Opts::new("transfer_status_transitions_total", "Total number of transfer lifecycle transitions");
        let counter_vec = CounterVec::new(opts, &["status"]).unwrap();
        REGISTRY.register(Box::new(counter_vec.clone())).unwrap();
        counter_vec
    };

    // Counter: per record reconciliation errors by kind.
    pub static ref RECONCILE_ERRORS_TOTAL: CounterVec = {
        let opts = Opts::new("reconcile_errors_total", "Total number of per record reconciliation errors");
        let counter_vec = CounterVec::new(opts, &["kind"]).unwrap();
        REGISTRY.register(Box::new(counter_vec.clone())).unwrap();
        counter_vec
    };

    // Histogram for reconciliation cycle duration in seconds.
    pub static ref RECONCILE_CYCLE_DURATION: Histogram = {
        let histogram_opts = HistogramOpts::new("reconcile_cycle_duration_seconds", "Reconciliation cycle duration in seconds")
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]);
        let histogram = Histogram::with_opts(histogram_opts).unwrap();
        REGISTRY.register(Box::new(histogram.clone())).unwrap();
        histogram
    };

    // Gauge: non-terminal records seen by the last cycle.
    pub static ref NON_TERMINAL_TRANSFERS: Gauge = {
        let gauge = Gauge::new("non_terminal_transfers", "Transfers not yet finalized or failed").unwrap();
        REGISTRY.register(Box::new(gauge.clone())).unwrap();
        gauge
    };
}

/// Gather all metrics and encode them into the provided buffer.
pub fn gather_metrics() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(buffer)
}
