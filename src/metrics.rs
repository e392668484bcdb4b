use prometheus::{Encoder, IntCounter, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

#[derive(Clone)]
pub struct Metrics {
    pub autocomplete_queries: IntCounter,
    pub alternatives_queries: IntCounter,
    pub autocomplete_cache_hits: IntCounter,
    pub fallback_searches: IntCounter,
    pub refresh_success: IntCounter,
    pub refresh_failures: IntCounter,
    pub index_version: IntGauge,
    registry: Arc<Registry>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn counter(name: &str, help: &str) -> IntCounter {
    IntCounter::with_opts(Opts::new(name, help).namespace("gearfind"))
        .unwrap_or_else(|e| panic!("invalid metric definition {name}: {e}"))
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let autocomplete_queries =
            counter("autocomplete_queries", "Number of autocomplete queries served");
        let alternatives_queries =
            counter("alternatives_queries", "Number of alternative lookups served");
        let autocomplete_cache_hits = counter(
            "autocomplete_cache_hits",
            "Autocomplete queries answered from the index cache",
        );
        let fallback_searches = counter(
            "fallback_searches",
            "Autocomplete queries answered by the store before an index existed",
        );
        let refresh_success = counter("refresh_success", "Successful index refreshes");
        let refresh_failures = counter("refresh_failures", "Failed or timed out index refreshes");
        let index_version = IntGauge::with_opts(
            Opts::new("index_version", "Version of the active catalog index").namespace("gearfind"),
        )
        .unwrap_or_else(|e| panic!("invalid metric definition index_version: {e}"));

        registry.register(Box::new(autocomplete_queries.clone())).ok();
        registry.register(Box::new(alternatives_queries.clone())).ok();
        registry.register(Box::new(autocomplete_cache_hits.clone())).ok();
        registry.register(Box::new(fallback_searches.clone())).ok();
        registry.register(Box::new(refresh_success.clone())).ok();
        registry.register(Box::new(refresh_failures.clone())).ok();
        registry.register(Box::new(index_version.clone())).ok();

        Metrics {
            autocomplete_queries,
            alternatives_queries,
            autocomplete_cache_hits,
            fallback_searches,
            refresh_success,
            refresh_failures,
            index_version,
            registry: Arc::new(registry),
        }
    }

    pub fn gather(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if encoder.encode(&metric_families, &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
