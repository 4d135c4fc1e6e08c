#![warn(missing_docs)]

//! Metrics for training loops.
//!
//! A training loop publishes the values of the current batch (loss, model
//! scores, targets, epoch number, ...) into a shared [`State`] mapping.
//! Metrics read that state, produce one reading per batch through
//! [`metric::Metric::process`], and summarize an epoch through
//! [`metric::Metric::process_final`]. Loggers persist the readings so they
//! can be aggregated or inspected after the fact.

#[macro_use]
extern crate derive_new;

/// The logger module.
pub mod logger;

/// The metric module.
pub mod metric;

/// The shared training state.
pub mod state;

pub use state::{State, StateKey, EPOCH, ITERATION, LOSS, Y_PRED, Y_TRUE};
