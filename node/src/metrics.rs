//! # Prometheus Metrics
//!
//! Exposes operational metrics for the registry node, scraped from the
//! `/metrics` endpoint on the API port.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`]
//! under the `polaris` namespace so they do not collide with any default
//! global registry consumers.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Holds all Prometheus metric handles for the node.
///
/// Clone-friendly (wraps `Arc` internally via prometheus handles) so it
/// can be shared across request handlers and background tasks.
#[derive(Clone)]
pub struct NodeMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Height of the chain tip.
    pub chain_height: IntGauge,
    /// Total number of blocks appended since startup (genesis included).
    pub blocks_appended_total: IntCounter,
    /// Total number of ownership challenges issued.
    pub challenges_issued_total: IntCounter,
    /// Total number of star claims admitted to the chain.
    pub claims_accepted_total: IntCounter,
    /// Total number of rejected claims, labeled by rejection reason.
    pub claims_rejected_total: IntCounterVec,
    /// Histogram of claim handling latency in seconds.
    pub claim_latency_seconds: Histogram,
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("polaris".into()), None)
            .expect("failed to create prometheus registry");

        let chain_height = IntGauge::new("chain_height", "Height of the chain tip")
            .expect("metric creation");
        registry
            .register(Box::new(chain_height.clone()))
            .expect("metric registration");

        let blocks_appended_total = IntCounter::new(
            "blocks_appended_total",
            "Total number of blocks appended since startup",
        )
        .expect("metric creation");
        registry
            .register(Box::new(blocks_appended_total.clone()))
            .expect("metric registration");

        let challenges_issued_total = IntCounter::new(
            "challenges_issued_total",
            "Total number of ownership challenges issued",
        )
        .expect("metric creation");
        registry
            .register(Box::new(challenges_issued_total.clone()))
            .expect("metric registration");

        let claims_accepted_total = IntCounter::new(
            "claims_accepted_total",
            "Total number of star claims admitted to the chain",
        )
        .expect("metric creation");
        registry
            .register(Box::new(claims_accepted_total.clone()))
            .expect("metric registration");

        let claims_rejected_total = IntCounterVec::new(
            Opts::new(
                "claims_rejected_total",
                "Total number of rejected star claims, by reason",
            ),
            &["reason"],
        )
        .expect("metric creation");
        registry
            .register(Box::new(claims_rejected_total.clone()))
            .expect("metric registration");

        let claim_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "claim_latency_seconds",
                "End-to-end claim handling latency in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
            ]),
        )
        .expect("metric creation");
        registry
            .register(Box::new(claim_latency_seconds.clone()))
            .expect("metric registration");

        Self {
            registry,
            chain_height,
            blocks_appended_total,
            challenges_issued_total,
            claims_accepted_total,
            claims_rejected_total,
            claim_latency_seconds,
        }
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer).expect("prometheus output is valid utf-8"))
    }
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared metrics state passed around the node.
pub type SharedMetrics = Arc<NodeMetrics>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_carry_the_polaris_namespace() {
        let metrics = NodeMetrics::new();
        metrics.chain_height.set(7);
        metrics.blocks_appended_total.inc();
        metrics.claims_rejected_total.with_label_values(&["expired"]).inc();

        let text = metrics.encode().unwrap();
        assert!(text.contains("polaris_chain_height 7"));
        assert!(text.contains("polaris_blocks_appended_total 1"));
        assert!(text.contains("polaris_claims_rejected_total{reason=\"expired\"} 1"));
    }

    #[test]
    fn latency_histogram_observes() {
        let metrics = NodeMetrics::new();
        metrics.claim_latency_seconds.observe(0.003);

        let text = metrics.encode().unwrap();
        assert!(text.contains("polaris_claim_latency_seconds_count 1"));
    }
}
