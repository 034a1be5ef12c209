//! carboncast: CO₂ emission estimation for logistics trips.
//!
//! This crate implements the estimation pipeline behind a carbon analytics
//! dashboard: a seeded synthetic trip dataset, label encoders for the
//! categorical trip fields, a bagged regression-tree ensemble trained on the
//! encoded dataset, an artifact bundle persisted to disk as one atomic set,
//! and the inference / offset calculations served to the presentation layer.

pub mod bundle;
pub mod constants;
pub mod data;
pub mod encoding;
pub mod forest;
pub mod inference;
pub mod offset;
pub mod persist;

pub use bundle::{ArtifactPaths, BuildConfig, BuildError, BundleCache, ModelBundle};
pub use data::record::{TripParams, TripRecord, FEATURE_ORDER};
pub use inference::EmissionEstimator;
pub use offset::trees_needed;
