//! Emission inference over a loaded bundle.
//!
//! Feature vectors are assembled by walking [`FEATURE_ORDER`], never
//! positionally, so the inference layout cannot drift from the layout the
//! model was trained on.

use std::sync::Arc;

use crate::bundle::ModelBundle;
use crate::data::record::{Feature, TripParams, FEATURE_ORDER};
use crate::encoding::{EncoderBundle, UnknownCategoryError};

/// Assemble the encoded feature vector for one trip, in training order.
///
/// Fails fast on any categorical value outside the fitted label sets.
pub fn feature_vector(
    trip: &TripParams,
    encoders: &EncoderBundle,
) -> Result<Vec<f64>, UnknownCategoryError> {
    let mut features = Vec::with_capacity(FEATURE_ORDER.len());
    for feature in FEATURE_ORDER {
        let value = match feature {
            Feature::DistanceKm => trip.distance_km,
            Feature::FuelType => f64::from(encoders.fuel.encode(&trip.fuel_type)?),
            Feature::FuelConsumedLiters => trip.fuel_consumed_liters,
            Feature::AvgSpeedKmph => trip.avg_speed_kmph,
            Feature::TrafficLevel => f64::from(encoders.traffic.encode(&trip.traffic_level)?),
            Feature::WeatherCondition => f64::from(encoders.weather.encode(&trip.weather_condition)?),
            Feature::CargoWeightKg => trip.cargo_weight_kg,
        };
        features.push(value);
    }
    Ok(features)
}

/// Inference service: a pure function of its input and the bundle it was
/// constructed with.
#[derive(Debug, Clone)]
pub struct EmissionEstimator {
    bundle: Arc<ModelBundle>,
}

impl EmissionEstimator {
    /// Create an estimator over an already-constructed bundle.
    pub fn new(bundle: Arc<ModelBundle>) -> Self {
        Self { bundle }
    }

    /// Estimate the CO₂ emission (kg) for one trip.
    ///
    /// Validates the categorical fields against the fitted label sets before
    /// predicting. Negative raw estimates are clamped to zero: an emission
    /// cannot be negative.
    pub fn predict(&self, trip: &TripParams) -> Result<f64, UnknownCategoryError> {
        let features = feature_vector(trip, self.bundle.encoders())?;
        let raw = self.bundle.forest().predict_row(&features);
        Ok(raw.max(0.0))
    }

    /// Normalized per-feature importance, keyed by feature name, for the
    /// diagnostics view.
    pub fn feature_importance(&self) -> Vec<(&'static str, f64)> {
        FEATURE_ORDER
            .iter()
            .map(|f| f.name())
            .zip(self.bundle.forest().feature_importance_normalized())
            .collect()
    }

    /// The bundle this estimator serves.
    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }
}
