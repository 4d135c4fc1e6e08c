use super::state::NumericMetricState;
use super::{Metric, MetricError, MetricValue, Numeric};
use crate::state::{State, LOSS};

/// The loss metric.
///
/// Passes the batch loss through unchanged and keeps a running mean for the
/// epoch summary. Training and evaluation modes behave the same.
#[derive(Default)]
pub struct LossMetric {
    state: NumericMetricState,
}

impl LossMetric {
    /// Creates the metric.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Metric for LossMetric {
    fn name(&self) -> &str {
        "Loss"
    }

    fn process(&mut self, state: &State) -> Result<MetricValue, MetricError> {
        let loss = state.get(LOSS)?;
        let mean = loss.mean().ok_or(MetricError::EmptyBatch("Loss"))?;

        self.state.update(mean, loss.len());

        Ok(MetricValue::PerSample(loss.clone()))
    }

    fn process_final(&mut self, _state: &State) -> Result<MetricValue, MetricError> {
        Ok(MetricValue::Scalar(self.state.value()))
    }

    fn reset(&mut self, _state: &State) {
        self.state.reset()
    }
}

impl Numeric for LossMetric {
    fn value(&self) -> f64 {
        self.state.value()
    }

    fn current(&self) -> f64 {
        self.state.current()
    }
}
