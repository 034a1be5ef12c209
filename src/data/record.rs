//! Trip record schema.
//!
//! The feature order used at training time is part of the model's contract:
//! inference must assemble vectors in exactly the same order. [`FEATURE_ORDER`]
//! is the single source of truth for that order; nothing assembles feature
//! vectors positionally.

use serde::{Deserialize, Serialize};

/// One feature of a trip record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    DistanceKm,
    FuelType,
    FuelConsumedLiters,
    AvgSpeedKmph,
    TrafficLevel,
    WeatherCondition,
    CargoWeightKg,
}

impl Feature {
    /// Column name, matching the dataset header.
    pub const fn name(self) -> &'static str {
        match self {
            Feature::DistanceKm => "distance_km",
            Feature::FuelType => "fuel_type",
            Feature::FuelConsumedLiters => "fuel_consumed_liters",
            Feature::AvgSpeedKmph => "avg_speed_kmph",
            Feature::TrafficLevel => "traffic_level",
            Feature::WeatherCondition => "weather_condition",
            Feature::CargoWeightKg => "cargo_weight_kg",
        }
    }

    /// True for the three label-encoded fields.
    pub const fn is_categorical(self) -> bool {
        matches!(
            self,
            Feature::FuelType | Feature::TrafficLevel | Feature::WeatherCondition
        )
    }
}

/// Column order the model is trained on and predicts from.
pub const FEATURE_ORDER: [Feature; 7] = [
    Feature::DistanceKm,
    Feature::FuelType,
    Feature::FuelConsumedLiters,
    Feature::AvgSpeedKmph,
    Feature::TrafficLevel,
    Feature::WeatherCondition,
    Feature::CargoWeightKg,
];

/// Name of the prediction target column.
pub const TARGET_NAME: &str = "co2_emission_kg";

/// One row of the dataset: a logistics trip with its emission target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub distance_km: f64,
    pub fuel_type: String,
    pub fuel_consumed_liters: f64,
    pub avg_speed_kmph: f64,
    pub traffic_level: String,
    pub weather_condition: String,
    pub cargo_weight_kg: f64,
    pub co2_emission_kg: f64,
}

impl TripRecord {
    /// The record without its target, as an inference request.
    pub fn params(&self) -> TripParams {
        TripParams {
            distance_km: self.distance_km,
            fuel_type: self.fuel_type.clone(),
            fuel_consumed_liters: self.fuel_consumed_liters,
            avg_speed_kmph: self.avg_speed_kmph,
            traffic_level: self.traffic_level.clone(),
            weather_condition: self.weather_condition.clone(),
            cargo_weight_kg: self.cargo_weight_kg,
        }
    }
}

/// Raw trip parameters for one emission estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripParams {
    pub distance_km: f64,
    pub fuel_type: String,
    pub fuel_consumed_liters: f64,
    pub avg_speed_kmph: f64,
    pub traffic_level: String,
    pub weather_condition: String,
    pub cargo_weight_kg: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_order_matches_schema() {
        let names: Vec<&str> = FEATURE_ORDER.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            [
                "distance_km",
                "fuel_type",
                "fuel_consumed_liters",
                "avg_speed_kmph",
                "traffic_level",
                "weather_condition",
                "cargo_weight_kg",
            ]
        );
    }

    #[test]
    fn three_categorical_features() {
        let n = FEATURE_ORDER.iter().filter(|f| f.is_categorical()).count();
        assert_eq!(n, 3);
    }
}
