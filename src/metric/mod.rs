mod acc;
mod aggregate;
mod base;
mod collection;
mod epoch;
mod loss;

/// State module.
pub mod state;

pub use acc::*;
pub use aggregate::*;
pub use base::*;
pub use collection::*;
pub use epoch::*;
pub use loss::*;
