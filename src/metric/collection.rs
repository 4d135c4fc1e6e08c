use super::{format_float, Metric, MetricEntry, MetricValue, Numeric, NumericEntry};
use crate::state::State;

/// All entries produced by a [`MetricList`] for one batch or one epoch.
#[derive(new, Debug, Clone)]
pub struct MetricsUpdate {
    /// Entries of non-numeric metrics.
    pub entries: Vec<MetricEntry>,
    /// Entries of numeric metrics with their running value.
    pub entries_numeric: Vec<(MetricEntry, NumericEntry)>,
}

/// Object-safe handle over metrics that also expose a numeric value.
trait NumericMetric: Metric + Numeric {}

impl<M: Metric + Numeric> NumericMetric for M {}

/// A collection of metrics sharing the training state.
///
/// Broadcasts mode switches and resets, runs every metric against the state
/// and formats the readings into entries for loggers. A failing metric is
/// logged and skipped so one missing state entry does not abort the batch.
#[derive(Default)]
pub struct MetricList {
    metrics: Vec<Box<dyn Metric>>,
    numeric: Vec<Box<dyn NumericMetric>>,
}

/// Decimal places used when formatting readings.
const PRECISION: usize = 3;

impl MetricList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a metric.
    pub fn register<M: Metric + 'static>(&mut self, metric: M) {
        self.metrics.push(Box::new(metric));
    }

    /// Register a numeric metric.
    ///
    /// Numeric metrics additionally report their running value with each
    /// entry.
    pub fn register_numeric<M: Metric + Numeric + 'static>(&mut self, metric: M) {
        self.numeric.push(Box::new(metric));
    }

    /// Number of registered metrics.
    pub fn len(&self) -> usize {
        self.metrics.len() + self.numeric.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() && self.numeric.is_empty()
    }

    /// Put every metric in training mode.
    pub fn train(&mut self) {
        self.metrics.iter_mut().for_each(|metric| metric.train());
        self.numeric.iter_mut().for_each(|metric| metric.train());
    }

    /// Put every metric in evaluation mode.
    pub fn eval(&mut self) {
        self.metrics.iter_mut().for_each(|metric| metric.eval());
        self.numeric.iter_mut().for_each(|metric| metric.eval());
    }

    /// Reset every metric at the start of an epoch.
    pub fn reset(&mut self, state: &State) {
        self.metrics.iter_mut().for_each(|metric| metric.reset(state));
        self.numeric.iter_mut().for_each(|metric| metric.reset(state));
    }

    /// Run every metric against the current batch.
    pub fn process(&mut self, state: &State) -> MetricsUpdate {
        self.collect(state, false)
    }

    /// Run every metric against the end-of-epoch state.
    pub fn process_final(&mut self, state: &State) -> MetricsUpdate {
        self.collect(state, true)
    }

    fn collect(&mut self, state: &State, last: bool) -> MetricsUpdate {
        let mut entries = Vec::with_capacity(self.metrics.len());
        let mut entries_numeric = Vec::with_capacity(self.numeric.len());

        for metric in self.metrics.iter_mut() {
            let result = match last {
                true => metric.process_final(state),
                false => metric.process(state),
            };
            match result {
                Ok(value) => entries.push(entry(metric.name(), &value)),
                Err(err) => log::error!("Metric `{}` failed: {err}", metric.name()),
            }
        }

        for metric in self.numeric.iter_mut() {
            let result = match last {
                true => metric.process_final(state),
                false => metric.process(state),
            };
            match result {
                Ok(value) => {
                    let running = metric.value();
                    // The metric reports its current reading in its own
                    // scale, so batch and epoch rows of one log share units.
                    let current = match last {
                        true => value.mean().unwrap_or(running),
                        false => metric.current(),
                    };
                    entries_numeric.push((
                        entry_numeric(metric.name(), &value, current, running),
                        NumericEntry::Value(running),
                    ));
                }
                Err(err) => log::error!("Metric `{}` failed: {err}", metric.name()),
            }
        }

        MetricsUpdate::new(entries, entries_numeric)
    }
}

/// Format a reading into an entry for loggers.
fn entry(name: &str, value: &MetricValue) -> MetricEntry {
    let current = value.mean();

    let formatted = match current {
        Some(current) => match value {
            MetricValue::Count(count) => count.to_string(),
            _ => format_float(current, PRECISION),
        },
        None => "empty batch".to_string(),
    };

    let serialize = match (value, current) {
        (MetricValue::PerSample(values), Some(current)) => {
            NumericEntry::Aggregated(current, values.len()).serialize()
        }
        (_, Some(current)) => NumericEntry::Value(current).serialize(),
        // A reading over zero samples still serializes, with a zero weight.
        (_, None) => NumericEntry::Aggregated(0.0, 0).serialize(),
    };

    MetricEntry::new(name.to_string(), formatted, serialize)
}

/// Format a numeric metric's reading into an entry for loggers.
///
/// Both values come from the metric itself in its own scale; the reading
/// only contributes the weight of per-sample entries.
fn entry_numeric(name: &str, value: &MetricValue, current: f64, running: f64) -> MetricEntry {
    let formatted = format!(
        "running {} current {}",
        format_float(running, PRECISION),
        format_float(current, PRECISION)
    );

    let serialize = match value {
        MetricValue::PerSample(values) => {
            NumericEntry::Aggregated(current, values.len()).serialize()
        }
        _ => NumericEntry::Value(current).serialize(),
    };

    MetricEntry::new(name.to_string(), formatted, serialize)
}
