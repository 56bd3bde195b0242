use anyhow::Result;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::{Arc, OnceLock};
use tracing::info;


// Declare the static OnceLock to hold the Metrics.
static METRICS_INSTANCE: OnceLock<Arc<Metrics>> = OnceLock::new();

/// Initializes on first use and returns the process-wide `Metrics`.
pub fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| {
        info!("Initializing Metrics ...");
        Metrics::new()
    })
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Issuing service metrics
    pub issuer_requests: IntCounterVec,
    pub issuer_failures: IntCounterVec,
    pub issuer_request_duration: HistogramVec,

    // Cache metrics
    pub short_link_cache_hits: IntCounter,

    // Widget metrics
    pub popups: IntCounterVec,
    pub share_events: IntCounterVec,

    // Config
    pub parse_failures: IntCounter,
    pub config_validation_errors: IntCounter,
}

impl Metrics {
    fn new() -> Arc<Self> {
        // metric names and labels are static, construction only fails on programmer error
        let registry = Registry::new_custom(Some("sharewidget".into()), None).expect("valid registry prefix");

        let metrics: Arc<Metrics> = Arc::new(Self {
            issuer_requests: IntCounterVec::new(Opts::new("issuer_requests_total", "Requests sent to the issuing service"), &["endpoint"]).expect("issuer_requests_total"),
            issuer_failures: IntCounterVec::new(Opts::new("issuer_failures_total", "Issuing service failures by reason"), &["endpoint", "reason"]).expect("issuer_failures_total"),
            issuer_request_duration: HistogramVec::new(HistogramOpts::new("issuer_request_duration_seconds", "Issuing service round trip seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["endpoint"]).expect("issuer_request_duration_seconds"),

            short_link_cache_hits: IntCounter::new("short_link_cache_hits_total", "Resolutions served from the short-link cache").expect("short_link_cache_hits_total"),

            popups: IntCounterVec::new(Opts::new("popups_total", "Popup windows opened or refocused"), &["outcome"]).expect("popups_total"),
            share_events: IntCounterVec::new(Opts::new("share_events_total", "Lifecycle and action events emitted"), &["event"]).expect("share_events_total"),

            parse_failures: IntCounter::new("config_parse_failures_total", "Settings parse failures").expect("config_parse_failures_total"),
            config_validation_errors: IntCounter::new("config_validation_errors_total", "Settings validation errors").expect("config_validation_errors_total"),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(metrics.issuer_requests.clone()),
            Box::new(metrics.issuer_failures.clone()),
            Box::new(metrics.issuer_request_duration.clone()),
            Box::new(metrics.short_link_cache_hits.clone()),
            Box::new(metrics.popups.clone()),
            Box::new(metrics.share_events.clone()),
            Box::new(metrics.parse_failures.clone()),
            Box::new(metrics.config_validation_errors.clone()),
        ];
        for collector in collectors {
            reg.register(collector).expect("unique metric name");
        }

        metrics
    }

    /// Text exposition format of every registered metric.
    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        Ok(encoder.encode_to_string(&self.registry.gather())?)
    }
}
