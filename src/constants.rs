//! Fixed physical constants used across the pipeline.

/// kg CO₂ emitted per km travelled per kg of cargo, divided by 1000 in the
/// emission formula (industry average).
pub const AVG_CO2_PER_KM: f64 = 0.15;

/// kg CO₂ absorbed per tree per year (USDA average).
pub const TREE_ABSORPTION_PER_YEAR: f64 = 21.77;

/// Per-liter CO₂ emission factor (kg) for each known fuel type,
/// sorted by label.
pub const FUEL_EMISSION_FACTORS: [(&str, f64); 4] = [
    ("CNG", 1.65),
    ("Diesel", 2.68),
    ("Electric", 0.0),
    ("Petrol", 2.31),
];

/// Look up the emission factor for a fuel type label.
pub fn emission_factor(fuel_type: &str) -> Option<f64> {
    FUEL_EMISSION_FACTORS
        .iter()
        .find(|(label, _)| *label == fuel_type)
        .map(|(_, factor)| *factor)
}

/// Industry-average emission (kg CO₂) for a trip, used as the comparator
/// shown next to a model estimate.
pub fn industry_average_emission(distance_km: f64, cargo_weight_kg: f64) -> f64 {
    distance_km * cargo_weight_kg * AVG_CO2_PER_KM / 1000.0
}
