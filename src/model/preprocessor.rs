use super::{Preprocessor, Record};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Per-column scaling fitted by the training pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerPipeline {
    pub transformers: Vec<ColumnTransformer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    pub column: String,
    #[serde(flatten)]
    pub scaling: Scaling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaling {
    StandardScaler { mean: f64, scale: f64 },
    MinMaxScaler { min: f64, max: f64 },
    Log1pStandardScaler { mean: f64, scale: f64 },
    Passthrough,
}

impl Scaling {
    fn validate(&self, column: &str) -> Result<()> {
        match *self {
            Self::StandardScaler { mean, scale } | Self::Log1pStandardScaler { mean, scale } => {
                if !mean.is_finite() || !scale.is_finite() || scale <= 0.0 {
                    return Err(Error::invalid_artifact(format!(
                        "column '{column}' has invalid standard scaling (mean={mean}, scale={scale})"
                    )));
                }
            }
            Self::MinMaxScaler { min, max } => {
                if !min.is_finite() || !max.is_finite() || max <= min {
                    return Err(Error::invalid_artifact(format!(
                        "column '{column}' has invalid min-max bounds (min={min}, max={max})"
                    )));
                }
            }
            Self::Passthrough => {}
        }
        Ok(())
    }

    fn apply(&self, column: &str, value: f64) -> Result<f64> {
        let scaled = match *self {
            Self::StandardScaler { mean, scale } => (value - mean) / scale,
            Self::MinMaxScaler { min, max } => (value - min) / (max - min),
            Self::Log1pStandardScaler { mean, scale } => {
                if value <= -1.0 {
                    return Err(Error::inference(format!(
                        "column '{column}' value {value} is outside the log1p domain"
                    )));
                }
                (value.ln_1p() - mean) / scale
            }
            Self::Passthrough => value,
        };

        if !scaled.is_finite() {
            return Err(Error::inference(format!(
                "column '{column}' produced a non-finite feature from {value}"
            )));
        }
        Ok(scaled)
    }
}

impl ScalerPipeline {
    pub fn from_json(json: &str) -> Result<Self> {
        let pipeline: Self = serde_json::from_str(json)?;
        pipeline.validate()?;
        Ok(pipeline)
    }

    pub fn validate(&self) -> Result<()> {
        if self.transformers.is_empty() {
            return Err(Error::invalid_artifact("preprocessor has no transformers"));
        }
        for transformer in &self.transformers {
            if transformer.column.trim().is_empty() {
                return Err(Error::invalid_artifact("transformer with an empty column name"));
            }
            transformer.scaling.validate(&transformer.column)?;
        }
        Ok(())
    }
}

impl Preprocessor for ScalerPipeline {
    fn output_names(&self) -> Vec<String> {
        self.transformers.iter().map(|t| t.column.clone()).collect()
    }

    fn transform(&self, record: &Record) -> Result<Vec<f64>> {
        self.transformers
            .iter()
            .map(|t| {
                let value = record.get(&t.column).ok_or_else(|| Error::MissingColumn {
                    column: t.column.clone(),
                })?;
                t.scaling.apply(&t.column, value)
            })
            .collect()
    }
}
