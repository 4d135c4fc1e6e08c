use approx::assert_relative_eq;
use ndarray::{arr1, arr2, Array1, Array2};
use tally::logger::{FileMetricLogger, MetricLogger};
use tally::metric::{
    CategoricalAccuracyMetric, EpochMetric, LossMetric, MetricList, NumericEntry, RunningMean,
};
use tally::{State, EPOCH, ITERATION, LOSS, Y_PRED, Y_TRUE};

struct Batch {
    loss: Array1<f64>,
    predictions: Array2<f64>,
    targets: Array1<i64>,
}

fn batches() -> Vec<Batch> {
    vec![
        Batch {
            loss: arr1(&[0.9]),
            predictions: arr2(&[[0.9, 0.1], [0.2, 0.8]]),
            targets: arr1(&[0, 1]),
        },
        Batch {
            loss: arr1(&[0.5]),
            predictions: arr2(&[[0.9, 0.1], [0.9, 0.1]]),
            targets: arr1(&[0, 1]),
        },
    ]
}

fn run_epoch(
    metrics: &mut MetricList,
    logger: &mut dyn MetricLogger,
    state: &mut State,
    epoch: usize,
) {
    state.insert(EPOCH, epoch);
    metrics.reset(state);

    for (iteration, batch) in batches().into_iter().enumerate() {
        state.insert(ITERATION, iteration);
        state.insert(LOSS, batch.loss);
        state.insert(Y_PRED, batch.predictions);
        state.insert(Y_TRUE, batch.targets);

        let update = metrics.process(state);
        for entry in update
            .entries
            .iter()
            .chain(update.entries_numeric.iter().map(|(entry, _)| entry))
        {
            logger.log(entry);
        }
    }

    logger.end_epoch(epoch);
}

#[test]
fn metrics_flow_from_state_to_logger() {
    let dir = tempfile::tempdir().unwrap();
    let mut logger = FileMetricLogger::new(dir.path());

    let mut metrics = MetricList::new();
    metrics.register(EpochMetric::new());
    metrics.register_numeric(RunningMean::new(LossMetric::new()));
    metrics.register_numeric(CategoricalAccuracyMetric::new());

    let mut state = State::new();
    metrics.train();
    run_epoch(&mut metrics, &mut logger, &mut state, 1);
    run_epoch(&mut metrics, &mut logger, &mut state, 2);

    assert_eq!(2, logger.epochs());

    // Per-batch accuracy over epoch 1: both correct, then one of two,
    // serialized as percentages like the epoch summary.
    let accuracy = logger.read_numeric("Accuracy", 1).unwrap();
    assert_eq!(
        vec![
            NumericEntry::Aggregated(100.0, 2),
            NumericEntry::Aggregated(50.0, 2)
        ],
        accuracy
    );

    let epochs = logger.read_numeric("Epoch", 2).unwrap();
    assert_eq!(vec![NumericEntry::Value(2.0); 2], epochs);
}

#[test]
fn epoch_summaries_aggregate_batches() {
    let mut metrics = MetricList::new();
    metrics.register_numeric(LossMetric::new());
    metrics.register_numeric(CategoricalAccuracyMetric::new());

    let mut state = State::new();
    state.insert(EPOCH, 1);
    metrics.train();
    metrics.reset(&state);

    for batch in batches() {
        state.insert(LOSS, batch.loss);
        state.insert(Y_PRED, batch.predictions);
        state.insert(Y_TRUE, batch.targets);
        metrics.process(&state);
    }

    let update = metrics.process_final(&state);

    let (_, loss) = &update.entries_numeric[0];
    let NumericEntry::Value(loss) = loss else {
        panic!("expected a value entry");
    };
    assert_relative_eq!(0.7, *loss);

    let (_, accuracy) = &update.entries_numeric[1];
    let NumericEntry::Value(accuracy) = accuracy else {
        panic!("expected a value entry");
    };
    assert_relative_eq!(75.0, *accuracy);
}
