//! Descriptive statistics over a dataset.
//!
//! Read-only summaries consumed by the dataset explorer view: per-column
//! count/mean/std/min/max plus a couple of headline metrics.

use std::collections::BTreeMap;

use crate::data::record::{TripRecord, TARGET_NAME};

/// Summary of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: &'static str,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); zero for n < 2.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// Summary of a whole dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    /// One entry per numeric column, in schema order.
    pub columns: Vec<ColumnSummary>,
    /// Most frequent fuel type label; on a tie the lexicographically
    /// greatest label wins.
    pub most_common_fuel: Option<String>,
    /// Mean of the emission target.
    pub mean_emission: f64,
}

fn summarize_column(name: &'static str, values: &[f64]) -> ColumnSummary {
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;

    let std_dev = if count > 1 {
        let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        (ss / (count - 1) as f64).sqrt()
    } else {
        0.0
    };

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    ColumnSummary {
        name,
        count,
        mean,
        std_dev,
        min,
        max,
    }
}

/// Compute descriptive statistics for a dataset.
///
/// Returns an empty summary for an empty slice.
pub fn summarize(records: &[TripRecord]) -> DatasetSummary {
    if records.is_empty() {
        return DatasetSummary {
            columns: Vec::new(),
            most_common_fuel: None,
            mean_emission: 0.0,
        };
    }

    let numeric: [(&'static str, fn(&TripRecord) -> f64); 5] = [
        ("distance_km", |r| r.distance_km),
        ("fuel_consumed_liters", |r| r.fuel_consumed_liters),
        ("avg_speed_kmph", |r| r.avg_speed_kmph),
        ("cargo_weight_kg", |r| r.cargo_weight_kg),
        (TARGET_NAME, |r| r.co2_emission_kg),
    ];

    let columns = numeric
        .iter()
        .map(|&(name, get)| {
            let values: Vec<f64> = records.iter().map(get).collect();
            summarize_column(name, &values)
        })
        .collect();

    let mut fuel_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in records {
        *fuel_counts.entry(r.fuel_type.as_str()).or_default() += 1;
    }
    let most_common_fuel = fuel_counts
        .iter()
        .max_by_key(|(_, count)| *count)
        .map(|(label, _)| label.to_string());

    let mean_emission =
        records.iter().map(|r| r.co2_emission_kg).sum::<f64>() / records.len() as f64;

    DatasetSummary {
        columns,
        most_common_fuel,
        mean_emission,
    }
}
