//! Prometheus metrics

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Completed sweeps
    SweepsCompleted,
    /// Delivered signals
    SignalsEmitted,
    /// Signals dropped on a delivery fault
    DeliveryFailures,
    /// Resolved outcomes absorbed into the learner
    OutcomesResolved,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Current dynamic acceptance threshold
    DynamicMinScore,
    /// Symbols scanned in the last sweep
    UniverseSize,
    /// Samples absorbed by the online learner
    LearnerSamples,
}

/// Start the Prometheus exporter on the given port.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;
    Ok(())
}

/// Increment a counter by one
pub fn bump_counter(metric: CounterMetric) {
    let metric_name = match metric {
        CounterMetric::SweepsCompleted => "trendscout_sweeps_completed",
        CounterMetric::SignalsEmitted => "trendscout_signals_emitted",
        CounterMetric::DeliveryFailures => "trendscout_delivery_failures",
        CounterMetric::OutcomesResolved => "trendscout_outcomes_resolved",
    };
    metrics::counter!(metric_name).increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let metric_name = match metric {
        GaugeMetric::DynamicMinScore => "trendscout_dynamic_min_score",
        GaugeMetric::UniverseSize => "trendscout_universe_size",
        GaugeMetric::LearnerSamples => "trendscout_learner_samples",
    };
    metrics::gauge!(metric_name).set(value);
}
