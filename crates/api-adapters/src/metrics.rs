//! Request metrics.
//!
//! A single counter family keyed by operation name, exposed on
//! `/metrics` in the prometheus text format.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OpLabels {
    pub op: &'static str,
}

pub struct Metrics {
    registry: Registry,
    requests: Family<OpLabels, Counter>,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let requests = Family::<OpLabels, Counter>::default();
        registry.register(
            "murmur_requests",
            "Handled API requests by operation",
            requests.clone(),
        );
        Self { registry, requests }
    }

    pub fn observe(&self, op: &'static str) {
        self.requests.get_or_create(&OpLabels { op }).inc();
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Err(err) = encode(&mut out, &self.registry) {
            tracing::warn!(error = %err, "metrics encoding failed");
        }
        out
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
