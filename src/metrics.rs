//! Prometheus metrics for the evidence pipeline.
//!
//! - Extraction counts by module and incident type
//! - Per-source search duration
//! - Degraded sources by reason
//! - Bundle cache hits and misses
//!
//! # Example
//! ```no_run
//! use llm_incident_context::metrics;
//!
//! metrics::init_metrics().expect("metrics registry");
//! println!("{}", metrics::gather_metrics());
//! ```

use lazy_static::lazy_static;
use prometheus::{CounterVec, Gauge, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Incident texts turned into records
    ///
    /// Labels: module, incident_type
    pub static ref EXTRACTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("extractions_total", "Total number of incident extractions")
            .namespace("llm_incident_context"),
        &["module", "incident_type"]
    ).expect("Failed to create EXTRACTIONS_TOTAL metric");

    /// Time spent in one sub-search, corpus fetch included
    ///
    /// Labels: source
    pub static ref SEARCH_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "search_duration_seconds",
            "Sub-search duration in seconds"
        )
        .namespace("llm_incident_context")
        .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
        &["source"]
    ).expect("Failed to create SEARCH_DURATION_SECONDS metric");

    /// Sources that contributed an empty or partial result
    ///
    /// Labels: source, reason (missing_corpus, timeout, failed)
    pub static ref DEGRADED_SOURCES_TOTAL: CounterVec = CounterVec::new(
        Opts::new("degraded_sources_total", "Sources degraded during aggregation")
            .namespace("llm_incident_context"),
        &["source", "reason"]
    ).expect("Failed to create DEGRADED_SOURCES_TOTAL metric");

    /// Bundle cache lookups
    ///
    /// Labels: result (hit, miss)
    pub static ref BUNDLE_CACHE_TOTAL: CounterVec = CounterVec::new(
        Opts::new("bundle_cache_total", "Bundle cache lookups")
            .namespace("llm_incident_context"),
        &["result"]
    ).expect("Failed to create BUNDLE_CACHE_TOTAL metric");

    /// Items per loaded corpus
    ///
    /// Labels: source
    pub static ref CORPUS_ITEMS: GaugeVec = GaugeVec::new(
        Opts::new("corpus_items", "Items held by each loaded corpus")
            .namespace("llm_incident_context"),
        &["source"]
    ).expect("Failed to create CORPUS_ITEMS metric");

    /// Build information
    pub static ref BUILD_INFO: Gauge = Gauge::with_opts(
        Opts::new("build_info", "Build information")
            .namespace("llm_incident_context")
            .const_label("version", env!("CARGO_PKG_VERSION"))
    ).expect("Failed to create BUILD_INFO metric");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; collectors that are already registered are
/// left in place.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    register(Box::new(EXTRACTIONS_TOTAL.clone()))?;
    register(Box::new(SEARCH_DURATION_SECONDS.clone()))?;
    register(Box::new(DEGRADED_SOURCES_TOTAL.clone()))?;
    register(Box::new(BUNDLE_CACHE_TOTAL.clone()))?;
    register(Box::new(CORPUS_ITEMS.clone()))?;
    register(Box::new(BUILD_INFO.clone()))?;

    BUILD_INFO.set(1.0);

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

fn register(collector: Box<dyn prometheus::core::Collector>) -> Result<(), prometheus::Error> {
    match PROMETHEUS_REGISTRY.register(collector) {
        Ok(()) | Err(prometheus::Error::AlreadyReg) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Generate Prometheus text format metrics
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
