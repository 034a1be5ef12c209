//! Seeded synthetic trip dataset.
//!
//! The dataset is a deterministic function of the seed: the same seed always
//! reproduces the identical records in the identical order, so model builds
//! are reproducible. Targets come from the closed-form emission formula, not
//! from any real telemetry.

use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::{emission_factor, AVG_CO2_PER_KM};
use crate::data::record::TripRecord;

/// Fuel type labels with their sampling weights.
const FUEL_CHOICES: [(&str, f64); 4] = [
    ("Diesel", 0.3),
    ("Petrol", 0.3),
    ("CNG", 0.2),
    ("Electric", 0.2),
];

/// Traffic level labels with their sampling weights.
const TRAFFIC_CHOICES: [(&str, f64); 3] = [("Low", 0.3), ("Medium", 0.5), ("High", 0.2)];

/// Weather condition labels with their sampling weights.
const WEATHER_CHOICES: [(&str, f64); 3] = [("Clear", 0.6), ("Rainy", 0.3), ("Foggy", 0.1)];

const DISTANCE_RANGE: std::ops::Range<f64> = 50.0..2000.0;
const FUEL_CONSUMED_RANGE: std::ops::Range<f64> = 10.0..500.0;
const SPEED_RANGE: std::ops::Range<f64> = 30.0..100.0;
const CARGO_RANGE: std::ops::Range<f64> = 500.0..10000.0;

/// Configuration for synthetic dataset generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticConfig {
    /// Number of trip records to generate.
    pub n_samples: usize,
    /// Seed for the pseudorandom generator.
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            n_samples: 5000,
            seed: 42,
        }
    }
}

/// Errors from dataset generation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyntheticError {
    #[error("requested an empty dataset")]
    Empty,

    #[error("invalid category weights: {0}")]
    Weights(#[from] WeightedError),

    #[error("no emission factor for fuel type {0:?}")]
    MissingEmissionFactor(String),
}

/// Closed-form emission target (kg CO₂) for one trip.
pub fn emission_for(
    fuel_type: &str,
    fuel_consumed_liters: f64,
    distance_km: f64,
    cargo_weight_kg: f64,
) -> Option<f64> {
    let factor = emission_factor(fuel_type)?;
    Some(fuel_consumed_liters * factor + distance_km * cargo_weight_kg * AVG_CO2_PER_KM / 1000.0)
}

/// Generate `config.n_samples` trip records from the given seed.
pub fn generate(config: &SyntheticConfig) -> Result<Vec<TripRecord>, SyntheticError> {
    if config.n_samples == 0 {
        return Err(SyntheticError::Empty);
    }

    let mut rng = StdRng::seed_from_u64(config.seed);

    let fuel_dist = WeightedIndex::new(FUEL_CHOICES.iter().map(|(_, w)| *w))?;
    let traffic_dist = WeightedIndex::new(TRAFFIC_CHOICES.iter().map(|(_, w)| *w))?;
    let weather_dist = WeightedIndex::new(WEATHER_CHOICES.iter().map(|(_, w)| *w))?;

    let mut records = Vec::with_capacity(config.n_samples);
    for _ in 0..config.n_samples {
        let distance_km = rng.gen_range(DISTANCE_RANGE);
        let fuel_type = FUEL_CHOICES[fuel_dist.sample(&mut rng)].0;
        let fuel_consumed_liters = rng.gen_range(FUEL_CONSUMED_RANGE);
        let avg_speed_kmph = rng.gen_range(SPEED_RANGE);
        let traffic_level = TRAFFIC_CHOICES[traffic_dist.sample(&mut rng)].0;
        let weather_condition = WEATHER_CHOICES[weather_dist.sample(&mut rng)].0;
        let cargo_weight_kg = rng.gen_range(CARGO_RANGE);

        let co2_emission_kg =
            emission_for(fuel_type, fuel_consumed_liters, distance_km, cargo_weight_kg)
                .ok_or_else(|| SyntheticError::MissingEmissionFactor(fuel_type.to_string()))?;

        records.push(TripRecord {
            distance_km,
            fuel_type: fuel_type.to_string(),
            fuel_consumed_liters,
            avg_speed_kmph,
            traffic_level: traffic_level.to_string(),
            weather_condition: weather_condition.to_string(),
            cargo_weight_kg,
            co2_emission_kg,
        });
    }

    Ok(records)
}
