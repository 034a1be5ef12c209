//! Label encoders for the categorical trip fields.
//!
//! Each encoder is fit once from the dataset: the label set is the
//! sorted-unique set of observed values, and codes are assigned by sort
//! order. Encoders are immutable after fit and shared read-only by the
//! inference service.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::data::record::{Feature, TripRecord};

/// A categorical value outside the fitted label set.
///
/// User-visible: names the offending field and value so the input can be
/// corrected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {field} value {value:?}, expected one of {known:?}")]
pub struct UnknownCategoryError {
    /// Field the bad value was supplied for.
    pub field: String,
    /// The value that was not in the fitted label set.
    pub value: String,
    /// The labels the encoder was fit on.
    pub known: Vec<String>,
}

/// Deterministic label ↔ integer code mapping for one categorical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    field: String,
    /// Sorted label set; a label's code is its index here.
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit an encoder from observed values: sorted-unique labels, codes by
    /// sort order.
    pub fn fit<'a>(field: &str, values: impl IntoIterator<Item = &'a str>) -> Self {
        let classes: BTreeSet<&str> = values.into_iter().collect();
        Self {
            field: field.to_string(),
            classes: classes.into_iter().map(str::to_string).collect(),
        }
    }

    /// Reconstruct an encoder from an already-ordered label list.
    ///
    /// The caller must have validated that `classes` is sorted and free of
    /// duplicates; lookups rely on it.
    pub fn from_classes(field: &str, classes: Vec<String>) -> Self {
        debug_assert!(classes.windows(2).all(|w| w[0] < w[1]));
        Self {
            field: field.to_string(),
            classes,
        }
    }

    /// Field this encoder was fit for.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The fitted label set, in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Map a label to its integer code.
    pub fn encode(&self, label: &str) -> Result<u32, UnknownCategoryError> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map(|idx| idx as u32)
            .map_err(|_| UnknownCategoryError {
                field: self.field.clone(),
                value: label.to_string(),
                known: self.classes.clone(),
            })
    }

    /// Map a code back to its label.
    pub fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }
}

/// The three fitted encoders, created together and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderBundle {
    pub fuel: LabelEncoder,
    pub traffic: LabelEncoder,
    pub weather: LabelEncoder,
}

impl EncoderBundle {
    /// Fit all three encoders from a dataset.
    pub fn fit(records: &[TripRecord]) -> Self {
        Self {
            fuel: LabelEncoder::fit(
                Feature::FuelType.name(),
                records.iter().map(|r| r.fuel_type.as_str()),
            ),
            traffic: LabelEncoder::fit(
                Feature::TrafficLevel.name(),
                records.iter().map(|r| r.traffic_level.as_str()),
            ),
            weather: LabelEncoder::fit(
                Feature::WeatherCondition.name(),
                records.iter().map(|r| r.weather_condition.as_str()),
            ),
        }
    }
}
