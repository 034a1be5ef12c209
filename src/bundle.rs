//! The artifact bundle: matched encoders + model, loaded or rebuilt as one
//! unit.
//!
//! Five files form one bundle: the dataset CSV, the model artifact, and the
//! three encoder label lists. Loading is all-or-nothing: if any file is
//! missing, unreadable, or inconsistent, the whole bundle is treated as
//! absent and every file is rebuilt together, so a stale encoder can never
//! be paired with a fresh model.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::data::io::{read_dataset, write_dataset, DatasetIoError};
use crate::data::matrix::FeatureMatrix;
use crate::data::record::{Feature, FEATURE_ORDER};
use crate::data::synthetic::{generate, SyntheticConfig, SyntheticError};
use crate::encoding::{EncoderBundle, UnknownCategoryError};
use crate::forest::{ForestParams, RandomForest, TrainError};
use crate::inference::feature_vector;
use crate::persist::{
    load_encoder, load_model, save_encoder, save_model, ArtifactError,
};

/// Locations of the five files forming one artifact bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub dataset: PathBuf,
    pub model: PathBuf,
    pub encoder_fuel: PathBuf,
    pub encoder_traffic: PathBuf,
    pub encoder_weather: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            dataset: dir.join("carbon_footprint_logistics.csv"),
            model: dir.join("co2_emission_model.ccrf"),
            encoder_fuel: dir.join("label_encoder_fuel.txt"),
            encoder_traffic: dir.join("label_encoder_traffic.txt"),
            encoder_weather: dir.join("label_encoder_weather.txt"),
        }
    }
}

/// Configuration for a full bundle build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildConfig {
    pub synthetic: SyntheticConfig,
    pub forest: ForestParams,
}

/// Why a persisted bundle could not be loaded. Internal and always
/// recovered by a rebuild; logged, never surfaced.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetIoError),

    #[error("model expects {model} features but the schema has {schema}")]
    FeatureCountMismatch { model: usize, schema: usize },
}

/// Fatal build failure: the rebuild pipeline itself failed. Surfaced as a
/// startup error.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("dataset generation failed: {0}")]
    Synthetic(#[from] SyntheticError),

    #[error("dataset persistence failed: {0}")]
    Dataset(#[from] DatasetIoError),

    #[error("training row encoding failed: {0}")]
    Encode(#[from] UnknownCategoryError),

    #[error("model training failed: {0}")]
    Train(#[from] TrainError),

    #[error("artifact persistence failed: {0}")]
    Persist(#[from] ArtifactError),
}

/// The matched set of fitted model and encoders. Immutable once
/// constructed; build once at process start and share read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelBundle {
    forest: RandomForest,
    encoders: EncoderBundle,
}

impl ModelBundle {
    /// The fitted ensemble.
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// The fitted encoders.
    pub fn encoders(&self) -> &EncoderBundle {
        &self.encoders
    }

    /// Load a previously persisted bundle. All five files must be present
    /// and consistent.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, LoadError> {
        // The dataset is part of the bundle contract even though prediction
        // does not read it: a bundle with a missing dataset is rebuilt.
        read_dataset(&paths.dataset)?;

        let forest = load_model(&paths.model)?;
        let encoders = EncoderBundle {
            fuel: load_encoder(&paths.encoder_fuel, Feature::FuelType.name())?,
            traffic: load_encoder(&paths.encoder_traffic, Feature::TrafficLevel.name())?,
            weather: load_encoder(&paths.encoder_weather, Feature::WeatherCondition.name())?,
        };

        if forest.n_features() != FEATURE_ORDER.len() {
            return Err(LoadError::FeatureCountMismatch {
                model: forest.n_features(),
                schema: FEATURE_ORDER.len(),
            });
        }

        Ok(Self { forest, encoders })
    }

    /// Run the full pipeline: generate the dataset, fit encoders and model,
    /// and persist all five artifacts.
    pub fn build(paths: &ArtifactPaths, config: &BuildConfig) -> Result<Self, BuildError> {
        info!(
            n_samples = config.synthetic.n_samples,
            seed = config.synthetic.seed,
            n_trees = config.forest.n_trees,
            "building model bundle"
        );

        let records = generate(&config.synthetic)?;
        write_dataset(&paths.dataset, &records)?;

        let encoders = EncoderBundle::fit(&records);

        let n_cols = FEATURE_ORDER.len();
        let mut data = Vec::with_capacity(records.len() * n_cols);
        let mut targets = Vec::with_capacity(records.len());
        for record in &records {
            data.extend(feature_vector(&record.params(), &encoders)?);
            targets.push(record.co2_emission_kg);
        }
        let matrix = FeatureMatrix::from_vec(data, records.len(), n_cols);

        let forest = RandomForest::fit(&matrix, &targets, &config.forest)?;

        save_model(&paths.model, &forest)?;
        save_encoder(&paths.encoder_fuel, &encoders.fuel)?;
        save_encoder(&paths.encoder_traffic, &encoders.traffic)?;
        save_encoder(&paths.encoder_weather, &encoders.weather)?;

        info!(n_trees = forest.n_trees(), "model bundle built and persisted");
        Ok(Self { forest, encoders })
    }

    /// Load the bundle if the persisted artifacts are usable, otherwise
    /// rebuild everything from scratch.
    ///
    /// Idempotent across process starts: once artifacts exist, subsequent
    /// calls load instead of rebuilding.
    pub fn load_or_build(paths: &ArtifactPaths, config: &BuildConfig) -> Result<Self, BuildError> {
        match Self::load(paths) {
            Ok(bundle) => {
                info!("loaded persisted model bundle");
                Ok(bundle)
            }
            Err(error) => {
                warn!(%error, "artifact bundle unusable, rebuilding");
                Self::build(paths, config)
            }
        }
    }
}

/// Process-wide bundle slot with single-flight build semantics.
///
/// The mutex is held for the whole load-or-build, so concurrent callers
/// block until the first one has populated the slot; at most one build ever
/// runs.
#[derive(Debug, Default)]
pub struct BundleCache {
    slot: Mutex<Option<Arc<ModelBundle>>>,
}

impl BundleCache {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Return the cached bundle, loading or building it on first use.
    pub fn get_or_build(
        &self,
        paths: &ArtifactPaths,
        config: &BuildConfig,
    ) -> Result<Arc<ModelBundle>, BuildError> {
        let mut slot = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(bundle) = slot.as_ref() {
            return Ok(Arc::clone(bundle));
        }

        let bundle = Arc::new(ModelBundle::load_or_build(paths, config)?);
        *slot = Some(Arc::clone(&bundle));
        Ok(bundle)
    }
}
