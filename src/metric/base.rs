use ndarray::Array1;

use crate::state::{State, StateError};

/// Errors raised while computing a metric.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricError {
    /// A state entry the metric needs was missing or had the wrong type.
    #[error(transparent)]
    State(#[from] StateError),

    /// Predictions and targets disagree on the batch size.
    #[error("predictions and targets disagree on batch size ({predictions} vs {targets})")]
    ShapeMismatch {
        /// Batch size of the predictions.
        predictions: usize,
        /// Batch size of the targets.
        targets: usize,
    },

    /// The metric received a batch without any sample.
    #[error("`{0}` received an empty batch")]
    EmptyBatch(&'static str),

    /// A serialized numeric entry could not be parsed back.
    #[error("invalid numeric entry `{0}`")]
    InvalidEntry(String),
}

/// Metric trait.
///
/// Metrics read the values published into the shared [`State`] by the
/// training loop. They produce one reading per batch with
/// [`process`](Metric::process) and summarize the epoch with
/// [`process_final`](Metric::process_final).
pub trait Metric: Send + Sync {
    /// The name of the metric.
    ///
    /// This should be unique, so avoid using short generic names.
    fn name(&self) -> &str;

    /// Compute the reading for the current batch.
    fn process(&mut self, state: &State) -> Result<MetricValue, MetricError>;

    /// Compute the summary for the current epoch.
    ///
    /// Defaults to the per-batch reading for metrics that do not accumulate.
    fn process_final(&mut self, state: &State) -> Result<MetricValue, MetricError> {
        self.process(state)
    }

    /// Put the metric in training mode.
    fn train(&mut self) {}

    /// Put the metric in evaluation mode.
    fn eval(&mut self) {}

    /// Clear any accumulated state at the start of an epoch.
    fn reset(&mut self, state: &State) {
        let _ = state;
    }
}

/// A single metric reading.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// One value for the whole batch.
    Scalar(f64),
    /// One value per sample of the batch.
    PerSample(Array1<f64>),
    /// An integer reading, such as an epoch number.
    Count(usize),
}

impl MetricValue {
    /// The reading as a scalar, when it is one.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(value) => Some(*value),
            _ => None,
        }
    }

    /// The per-sample values, when the reading has them.
    pub fn as_per_sample(&self) -> Option<&Array1<f64>> {
        match self {
            Self::PerSample(values) => Some(values),
            _ => None,
        }
    }

    /// The reading as a count, when it is one.
    pub fn as_count(&self) -> Option<usize> {
        match self {
            Self::Count(value) => Some(*value),
            _ => None,
        }
    }

    /// Fold the reading into a single value.
    ///
    /// `None` for a per-sample reading without any sample.
    pub fn mean(&self) -> Option<f64> {
        match self {
            Self::Scalar(value) => Some(*value),
            Self::Count(value) => Some(*value as f64),
            Self::PerSample(values) => values.mean(),
        }
    }

    /// Number of samples the reading covers.
    pub fn num_samples(&self) -> usize {
        match self {
            Self::PerSample(values) => values.len(),
            _ => 1,
        }
    }
}

/// Declare a metric to be numeric.
///
/// Numeric metrics expose a running value that can be plotted or compared
/// across batches. Both values use the metric's own scale, so entries built
/// from them stay consistent within one metric's log.
pub trait Numeric {
    /// Returns the numeric value of the metric.
    fn value(&self) -> f64;

    /// Returns the value of the latest batch, in the same scale as
    /// [`value`](Numeric::value).
    fn current(&self) -> f64;
}

/// Data type that contains the current state of a metric at a given time.
#[derive(new, Debug, Clone, PartialEq)]
pub struct MetricEntry {
    /// The name of the metric.
    pub name: String,
    /// The string to be displayed.
    pub formatted: String,
    /// The string to be saved.
    pub serialize: String,
}

/// Numeric metric entry.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericEntry {
    /// Single numeric value.
    Value(f64),
    /// Aggregated numeric (value, number of elements).
    Aggregated(f64, usize),
}

impl NumericEntry {
    /// Serialize the entry to a string.
    pub fn serialize(&self) -> String {
        match self {
            Self::Value(v) => v.to_string(),
            Self::Aggregated(v, n) => format!("{v},{n}"),
        }
    }

    /// Parse an entry back from its serialized form.
    pub fn deserialize(entry: &str) -> Result<Self, MetricError> {
        // Aggregated entries hold a comma separated value and count.
        let values = entry.split(',').collect::<Vec<_>>();

        match values[..] {
            [value] => value
                .parse::<f64>()
                .map(NumericEntry::Value)
                .map_err(|_| MetricError::InvalidEntry(entry.to_string())),
            [value, numel] => {
                let value = value
                    .parse::<f64>()
                    .map_err(|_| MetricError::InvalidEntry(entry.to_string()))?;
                let numel = numel
                    .parse::<usize>()
                    .map_err(|_| MetricError::InvalidEntry(entry.to_string()))?;
                Ok(NumericEntry::Aggregated(value, numel))
            }
            _ => Err(MetricError::InvalidEntry(entry.to_string())),
        }
    }
}

/// Format a float with the given precision. Will use scientific notation if necessary.
pub fn format_float(float: f64, precision: usize) -> String {
    let scientific_notation_threshold = 0.1_f64.powf(precision as f64 - 1.0);

    match scientific_notation_threshold >= float.abs() && float != 0.0 {
        true => format!("{float:.precision$e}"),
        false => format!("{float:.precision$}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn numeric_entry_value_round_trip() {
        let entry = NumericEntry::Value(2.35);
        let serialized = entry.serialize();

        assert_eq!("2.35", serialized);
        assert_eq!(entry, NumericEntry::deserialize(&serialized).unwrap());
    }

    #[test]
    fn numeric_entry_aggregated_round_trip() {
        let entry = NumericEntry::Aggregated(0.6, 5);
        let serialized = entry.serialize();

        assert_eq!("0.6,5", serialized);
        assert_eq!(entry, NumericEntry::deserialize(&serialized).unwrap());
    }

    #[test]
    fn numeric_entry_invalid() {
        assert!(NumericEntry::deserialize("not a number").is_err());
        assert!(NumericEntry::deserialize("1.0,2,3").is_err());
    }

    #[test]
    fn metric_value_mean() {
        assert_eq!(Some(2.0), MetricValue::Scalar(2.0).mean());
        assert_eq!(Some(101.0), MetricValue::Count(101).mean());
        assert_eq!(
            Some(0.5),
            MetricValue::PerSample(arr1(&[1.0, 0.0])).mean()
        );
        assert_eq!(None, MetricValue::PerSample(arr1(&[])).mean());
    }

    #[test]
    fn metric_value_num_samples() {
        assert_eq!(1, MetricValue::Scalar(2.0).num_samples());
        assert_eq!(3, MetricValue::PerSample(arr1(&[1.0, 0.0, 1.0])).num_samples());
    }

    #[test]
    fn format_float_regular() {
        assert_eq!("25.356", format_float(25.3563, 3));
    }

    #[test]
    fn format_float_scientific() {
        assert_eq!("2.0e-4", format_float(0.0002, 1));
    }
}
