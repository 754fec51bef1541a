use serde::{Deserialize, Serialize};
use std::fmt;

/// A single-row table of named numeric columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: Vec<(String, f64)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column, replacing any existing column with the same name.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.columns.push((name, value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), *v))
    }
}

/// Loan outcome predicted by the classifier.
///
/// Class index 0 is `Default` and class index 1 is `FullyPaid`; this
/// follows the label encoding the classifier was trained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Default,
    FullyPaid,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "Default"),
            Self::FullyPaid => write!(f, "Fully Paid"),
        }
    }
}

/// Raw per-feature contributions in the classifier's margin space.
#[derive(Debug, Clone, PartialEq)]
pub struct Contributions {
    pub values: Vec<f64>,
    pub base_value: f64,
}

impl Contributions {
    /// Margin reconstructed from the contributions.
    pub fn total(&self) -> f64 {
        self.base_value + self.values.iter().sum::<f64>()
    }
}

/// Contributions paired with human-readable feature names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub features: Vec<FeatureAttribution>,
    pub base_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureAttribution {
    pub feature: String,
    pub value: f64,
}

impl Attribution {
    pub fn new(names: Vec<String>, contributions: Contributions) -> Self {
        let features = names
            .into_iter()
            .zip(contributions.values)
            .map(|(feature, value)| FeatureAttribution { feature, value })
            .collect();

        Self {
            features,
            base_value: contributions.base_value,
        }
    }
}
