/// Useful utility to implement numeric metrics.
///
/// Keeps the latest batch value alongside a running mean over the epoch,
/// weighted by batch size.
#[derive(Default, Debug, Clone)]
pub struct NumericMetricState {
    sum: f64,
    count: usize,
    current: f64,
}

impl NumericMetricState {
    /// Create a new numeric metric state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a batch value into the running aggregate.
    pub fn update(&mut self, value: f64, batch_size: usize) {
        self.sum += value * batch_size as f64;
        self.count += batch_size;
        self.current = value;
    }

    /// The running mean over the epoch. NaN until the first update.
    pub fn value(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }

        self.sum / self.count as f64
    }

    /// The value of the latest batch.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Number of samples folded in so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Reset the state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
