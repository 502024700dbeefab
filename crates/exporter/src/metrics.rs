use metrics_derive::Metrics;

/// Self-observability of the polling loops, one instance per collector.
#[derive(Metrics, Clone)]
#[metrics(scope = "exporter")]
pub struct CollectorMetrics {
    /// Number of completed ticks
    #[metric(describe = "Number of polling passes completed by the collector")]
    pub ticks: metrics::Counter,

    /// Duration of a tick
    #[metric(describe = "Time spent in a single polling pass, in seconds")]
    pub tick_duration_seconds: metrics::Histogram,
}

impl CollectorMetrics {
    pub fn for_collector(name: &str) -> Self {
        Self::new_with_labels(&[("collector", name.to_string())])
    }

    pub fn record_tick(&self, elapsed: std::time::Duration) {
        self.ticks.increment(1);
        self.tick_duration_seconds.record(elapsed.as_secs_f64());
    }
}
