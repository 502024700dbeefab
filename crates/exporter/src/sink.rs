//! Destinations for gauge observations.
//!
//! Collectors never touch a global registry directly: they write through a
//! [`MetricsSink`] handed to them at construction. Every write is a plain
//! set, so concurrent writers simply race to the last value.

use crate::target::Target;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// Label key/value pairs of one series. Keys are unique and unordered.
pub type Labels = BTreeMap<String, String>;

pub trait MetricsSink: Send + Sync {
    fn set_gauge(&self, name: &str, labels: &Labels, value: f64);
}

/// Forwards every observation to the installed `metrics` recorder.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecorderSink;

impl MetricsSink for RecorderSink {
    fn set_gauge(&self, name: &str, labels: &Labels, value: f64) {
        let labels: Vec<metrics::Label> = labels
            .iter()
            .map(|(key, value)| metrics::Label::new(key.clone(), value.clone()))
            .collect();
        metrics::gauge!(name.to_string(), labels).set(value);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub name: String,
    pub labels: Labels,
    pub value: f64,
}

/// Keeps the latest value of every series in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    gauges: Mutex<HashMap<(String, Labels), f64>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(String, Labels), f64>> {
        self.gauges.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Value of the first series named `name` carrying all of `labels`.
    pub fn get(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        self.lock()
            .iter()
            .find(|((series, series_labels), _)| {
                series == name
                    && labels
                        .iter()
                        .all(|(k, v)| series_labels.get(*k).map(String::as_str) == Some(*v))
            })
            .map(|(_, value)| *value)
    }

    /// Number of series named `name`.
    pub fn series(&self, name: &str) -> usize {
        self.lock()
            .keys()
            .filter(|(series, _)| series == name)
            .count()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<Observation> {
        let mut observations: Vec<Observation> = self
            .lock()
            .iter()
            .map(|((name, labels), value)| Observation {
                name: name.clone(),
                labels: labels.clone(),
                value: *value,
            })
            .collect();
        observations.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.labels.cmp(&b.labels)));
        observations
    }
}

impl MetricsSink for MemorySink {
    fn set_gauge(&self, name: &str, labels: &Labels, value: f64) {
        self.lock().insert((name.to_string(), labels.clone()), value);
    }
}

/// Writes every observation to each inner sink.
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn MetricsSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl MetricsSink for FanoutSink {
    fn set_gauge(&self, name: &str, labels: &Labels, value: f64) {
        for sink in &self.sinks {
            sink.set_gauge(name, labels, value);
        }
    }
}

/// Writes the gauges of one target: prefixes names with the namespace and
/// attaches the constant labels.
#[derive(Clone)]
pub struct TargetMetrics {
    sink: Arc<dyn MetricsSink>,
    namespace: String,
    const_labels: Labels,
}

impl TargetMetrics {
    pub fn new(sink: Arc<dyn MetricsSink>, namespace: impl Into<String>, const_labels: Labels) -> Self {
        Self {
            sink,
            namespace: namespace.into(),
            const_labels,
        }
    }

    /// Constant labels `ethereum_role` and `node_name` of `target`.
    pub fn for_target(sink: Arc<dyn MetricsSink>, namespace: impl Into<String>, target: &Target) -> Self {
        let const_labels = Labels::from([
            ("ethereum_role".to_string(), target.kind.as_str().to_string()),
            ("node_name".to_string(), target.name.clone()),
        ]);
        Self::new(sink, namespace, const_labels)
    }

    pub fn metric_name(&self, name: &str) -> String {
        if self.namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}_{}", self.namespace, name)
        }
    }

    pub fn set(&self, name: &str, value: f64) {
        self.sink
            .set_gauge(&self.metric_name(name), &self.const_labels, value);
    }

    pub fn set_labeled(&self, name: &str, labels: &[(&str, &str)], value: f64) {
        let mut all = self.const_labels.clone();
        for (key, value) in labels {
            all.insert(key.to_string(), value.to_string());
        }
        self.sink.set_gauge(&self.metric_name(name), &all, value);
    }

    pub fn set_flag(&self, name: &str, flag: bool) {
        self.set(name, if flag { 1.0 } else { 0.0 });
    }
}
