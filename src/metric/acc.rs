use ndarray::{Array1, ArrayView1};

use super::state::NumericMetricState;
use super::{Metric, MetricError, MetricValue, Numeric};
use crate::state::{State, Y_PRED, Y_TRUE};

/// The categorical accuracy metric.
///
/// Compares the argmax of the model scores against the target labels and
/// emits a per-sample 0/1 correctness vector. Samples whose target equals
/// the ignore index are removed from the reading, not zeroed.
#[derive(Default)]
pub struct CategoricalAccuracyMetric {
    state: NumericMetricState,
    ignore_index: Option<i64>,
}

impl CategoricalAccuracyMetric {
    /// Creates the metric.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the label value excluded from the computation.
    pub fn with_ignore_index(mut self, index: i64) -> Self {
        self.ignore_index = Some(index);
        self
    }

    /// The label value excluded from the computation, if any.
    pub fn ignore_index(&self) -> Option<i64> {
        self.ignore_index
    }
}

impl Metric for CategoricalAccuracyMetric {
    fn name(&self) -> &str {
        "Accuracy"
    }

    fn process(&mut self, state: &State) -> Result<MetricValue, MetricError> {
        let predictions = state.get(Y_PRED)?;
        let targets = state.get(Y_TRUE)?;

        let (batch_size, _num_classes) = predictions.dim();
        if batch_size != targets.len() {
            return Err(MetricError::ShapeMismatch {
                predictions: batch_size,
                targets: targets.len(),
            });
        }

        let mut correct = Vec::with_capacity(batch_size);
        for (scores, target) in predictions.outer_iter().zip(targets.iter()) {
            if Some(*target) == self.ignore_index {
                continue;
            }

            let hit = argmax(scores) == *target;
            correct.push(if hit { 1.0 } else { 0.0 });
        }
        let correct = Array1::from(correct);

        if let Some(mean) = correct.mean() {
            self.state.update(100.0 * mean, correct.len());
        }

        Ok(MetricValue::PerSample(correct))
    }

    fn process_final(&mut self, _state: &State) -> Result<MetricValue, MetricError> {
        Ok(MetricValue::Scalar(self.state.value()))
    }

    fn reset(&mut self, _state: &State) {
        self.state.reset()
    }
}

impl Numeric for CategoricalAccuracyMetric {
    fn value(&self) -> f64 {
        self.state.value()
    }

    fn current(&self) -> f64 {
        self.state.current()
    }
}

/// Index of the first maximum of the scores.
fn argmax(scores: ArrayView1<'_, f64>) -> i64 {
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;

    for (index, &score) in scores.iter().enumerate() {
        if score > best_score {
            best = index;
            best_score = score;
        }
    }

    best as i64
}
