use std::collections::VecDeque;

use super::{Metric, MetricError, MetricValue, Numeric};
use crate::state::State;

/// Accumulates the mean of a wrapped metric's readings over an epoch.
///
/// The per-batch reading of the inner metric passes through unchanged; the
/// epoch summary is the sample-weighted mean of everything seen so far.
pub struct Mean<M> {
    name: String,
    inner: M,
    sum: f64,
    count: usize,
    current: f64,
}

impl<M: Metric> Mean<M> {
    /// Wrap the metric.
    pub fn new(inner: M) -> Self {
        Self {
            name: format!("Mean {}", inner.name()),
            inner,
            sum: 0.0,
            count: 0,
            current: f64::NAN,
        }
    }
}

impl<M: Metric> Metric for Mean<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&mut self, state: &State) -> Result<MetricValue, MetricError> {
        let value = self.inner.process(state)?;

        if let Some(mean) = value.mean() {
            let num_samples = value.num_samples();
            self.sum += mean * num_samples as f64;
            self.count += num_samples;
            self.current = mean;
        }

        Ok(value)
    }

    fn process_final(&mut self, _state: &State) -> Result<MetricValue, MetricError> {
        if self.count == 0 {
            return Err(MetricError::EmptyBatch("Mean"));
        }

        Ok(MetricValue::Scalar(self.sum / self.count as f64))
    }

    fn train(&mut self) {
        self.inner.train()
    }

    fn eval(&mut self) {
        self.inner.eval()
    }

    fn reset(&mut self, state: &State) {
        self.sum = 0.0;
        self.count = 0;
        self.current = f64::NAN;
        self.inner.reset(state)
    }
}

impl<M: Metric> Numeric for Mean<M> {
    fn value(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }

        self.sum / self.count as f64
    }

    fn current(&self) -> f64 {
        self.current
    }
}

/// Accumulates the population standard deviation of a wrapped metric's
/// readings over an epoch.
pub struct Std<M> {
    name: String,
    inner: M,
    sum: f64,
    sum_sq: f64,
    count: usize,
}

impl<M: Metric> Std<M> {
    /// Wrap the metric.
    pub fn new(inner: M) -> Self {
        Self {
            name: format!("{} Std", inner.name()),
            inner,
            sum: 0.0,
            sum_sq: 0.0,
            count: 0,
        }
    }

    fn push(&mut self, sample: f64) {
        self.sum += sample;
        self.sum_sq += sample * sample;
        self.count += 1;
    }
}

impl<M: Metric> Metric for Std<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&mut self, state: &State) -> Result<MetricValue, MetricError> {
        let value = self.inner.process(state)?;

        match &value {
            MetricValue::PerSample(values) => {
                for &sample in values {
                    self.push(sample);
                }
            }
            MetricValue::Scalar(sample) => self.push(*sample),
            MetricValue::Count(sample) => self.push(*sample as f64),
        }

        Ok(value)
    }

    fn process_final(&mut self, _state: &State) -> Result<MetricValue, MetricError> {
        if self.count == 0 {
            return Err(MetricError::EmptyBatch("Std"));
        }

        let mean = self.sum / self.count as f64;
        let variance = self.sum_sq / self.count as f64 - mean * mean;

        // Guard against tiny negative values from floating point error.
        Ok(MetricValue::Scalar(variance.max(0.0).sqrt()))
    }

    fn train(&mut self) {
        self.inner.train()
    }

    fn eval(&mut self) {
        self.inner.eval()
    }

    fn reset(&mut self, state: &State) {
        self.sum = 0.0;
        self.sum_sq = 0.0;
        self.count = 0;
        self.inner.reset(state)
    }
}

/// Smooths a wrapped metric over a window of recent batches.
///
/// The window only moves while the metric is in training mode; running
/// values are a training display affordance and stay frozen during
/// evaluation. The per-batch reading of the inner metric passes through
/// unchanged.
pub struct RunningMean<M> {
    name: String,
    inner: M,
    window: VecDeque<f64>,
    capacity: usize,
    current: f64,
    training: bool,
}

/// Number of recent batch readings kept by default.
const DEFAULT_WINDOW: usize = 50;

impl<M: Metric> RunningMean<M> {
    /// Wrap the metric with the default window size.
    pub fn new(inner: M) -> Self {
        Self::with_window(inner, DEFAULT_WINDOW)
    }

    /// Wrap the metric, keeping the given number of recent batch readings.
    pub fn with_window(inner: M, capacity: usize) -> Self {
        Self {
            name: format!("Running {}", inner.name()),
            inner,
            window: VecDeque::with_capacity(capacity),
            capacity,
            current: f64::NAN,
            training: true,
        }
    }
}

impl<M: Metric> Metric for RunningMean<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&mut self, state: &State) -> Result<MetricValue, MetricError> {
        let value = self.inner.process(state)?;

        if let Some(mean) = value.mean() {
            self.current = mean;

            if self.training {
                if self.window.len() == self.capacity {
                    self.window.pop_front();
                }
                self.window.push_back(mean);
            }
        }

        Ok(value)
    }

    fn process_final(&mut self, _state: &State) -> Result<MetricValue, MetricError> {
        if self.window.is_empty() {
            return Err(MetricError::EmptyBatch("RunningMean"));
        }

        Ok(MetricValue::Scalar(self.value()))
    }

    fn train(&mut self) {
        self.training = true;
        self.inner.train()
    }

    fn eval(&mut self) {
        self.training = false;
        self.inner.eval()
    }

    fn reset(&mut self, state: &State) {
        self.window.clear();
        self.current = f64::NAN;
        self.inner.reset(state)
    }
}

impl<M: Metric> Numeric for RunningMean<M> {
    fn value(&self) -> f64 {
        if self.window.is_empty() {
            return f64::NAN;
        }

        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    fn current(&self) -> f64 {
        self.current
    }
}
