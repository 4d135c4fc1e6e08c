use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;

use ndarray::{Array1, Array2};

/// A typed key into the shared training [`State`].
///
/// Keys pair a name with the type stored under it, so reads come back as the
/// right type without callers having to downcast themselves.
pub struct StateKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for StateKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StateKey<T> {}

impl<T: 'static> StateKey<T> {
    /// Create a key with the given name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// The name of the key.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// The loss of the current batch, one value per sample or loss term.
pub const LOSS: StateKey<Array1<f64>> = StateKey::new("loss");

/// The current epoch number.
pub const EPOCH: StateKey<usize> = StateKey::new("epoch");

/// The current iteration within the epoch.
pub const ITERATION: StateKey<usize> = StateKey::new("iteration");

/// Model scores for the current batch, batch size x number of classes.
pub const Y_PRED: StateKey<Array2<f64>> = StateKey::new("y_pred");

/// Target labels for the current batch.
pub const Y_TRUE: StateKey<Array1<i64>> = StateKey::new("y_true");

/// Errors when reading the shared state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// No value was published under the key.
    #[error("missing state entry `{0}`")]
    Missing(&'static str),

    /// A value exists under the key's name but with another type. Happens
    /// when two keys share a name.
    #[error("state entry `{0}` does not have the expected type")]
    WrongType(&'static str),
}

/// The shared mapping of current batch/epoch values, threaded through the
/// training loop and read by metrics.
#[derive(Default)]
pub struct State {
    values: HashMap<&'static str, Box<dyn Any + Send>>,
}

impl State {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a value under the key, replacing any previous value.
    pub fn insert<T: Send + 'static>(&mut self, key: StateKey<T>, value: T) {
        self.values.insert(key.name, Box::new(value));
    }

    /// Read the value under the key.
    pub fn get<T: 'static>(&self, key: StateKey<T>) -> Result<&T, StateError> {
        self.values
            .get(key.name)
            .ok_or(StateError::Missing(key.name))?
            .downcast_ref::<T>()
            .ok_or(StateError::WrongType(key.name))
    }

    /// Read the value under the key, mutably.
    pub fn get_mut<T: 'static>(&mut self, key: StateKey<T>) -> Result<&mut T, StateError> {
        self.values
            .get_mut(key.name)
            .ok_or(StateError::Missing(key.name))?
            .downcast_mut::<T>()
            .ok_or(StateError::WrongType(key.name))
    }

    /// Take the value under the key out of the state.
    pub fn remove<T: 'static>(&mut self, key: StateKey<T>) -> Result<T, StateError> {
        let boxed = self
            .values
            .remove(key.name)
            .ok_or(StateError::Missing(key.name))?;

        match boxed.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(boxed) => {
                // Leave the state untouched when the type does not match.
                self.values.insert(key.name, boxed);
                Err(StateError::WrongType(key.name))
            }
        }
    }

    /// Whether a value is published under the key.
    pub fn contains<T>(&self, key: StateKey<T>) -> bool {
        self.values.contains_key(key.name)
    }

    /// Number of published values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the state is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
