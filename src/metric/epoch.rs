use super::{Metric, MetricError, MetricValue};
use crate::state::{State, EPOCH};

/// Reports the current epoch number.
///
/// The per-batch reading and the epoch summary are both the epoch number
/// published by the loop.
#[derive(Default)]
pub struct EpochMetric;

impl EpochMetric {
    /// Creates the metric.
    pub fn new() -> Self {
        Self
    }
}

impl Metric for EpochMetric {
    fn name(&self) -> &str {
        "Epoch"
    }

    fn process(&mut self, state: &State) -> Result<MetricValue, MetricError> {
        Ok(MetricValue::Count(*state.get(EPOCH)?))
    }
}
