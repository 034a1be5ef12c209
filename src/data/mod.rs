//! Trip records, the synthetic dataset, and dataset I/O.

pub mod io;
pub mod matrix;
pub mod record;
pub mod stats;
pub mod synthetic;

pub use io::{read_dataset, write_dataset, DatasetIoError};
pub use matrix::FeatureMatrix;
pub use record::{Feature, TripParams, TripRecord, FEATURE_ORDER, TARGET_NAME};
pub use stats::{summarize, DatasetSummary};
pub use synthetic::{generate, SyntheticConfig, SyntheticError};
