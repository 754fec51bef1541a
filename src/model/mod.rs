//! Fitted artifacts and the capabilities the scoring flow relies on.
//!
//! Both artifacts are produced by an external training pipeline. This module
//! only evaluates them: the preprocessor maps a named [`Record`] to a feature
//! vector, and the classifier maps that vector to class probabilities.

mod booster;
mod explain;
mod loader;
mod preprocessor;
mod types;

pub use booster::GradientBoostedTrees;
pub use loader::{ArtifactLoader, ScoringContext};
pub use preprocessor::{ColumnTransformer, Scaling, ScalerPipeline};
pub use types::{Attribution, Contributions, FeatureAttribution, Outcome, Record};

use crate::Result;

/// A fitted transform from raw named columns to the classifier's input vector.
pub trait Preprocessor: Send + Sync {
    /// Names of the input columns each output feature is derived from, in
    /// output order. The length is the width of the produced vector.
    fn output_names(&self) -> Vec<String>;

    fn transform(&self, record: &Record) -> Result<Vec<f64>>;
}

/// A pre-trained binary classifier over "default" (class 0) and
/// "fully paid" (class 1).
pub trait Classifier: Send + Sync {
    /// Width of the feature vector the classifier expects.
    fn num_features(&self) -> usize;

    /// Returns `[p_default, p_fully_paid]`.
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]>;

    fn predict(&self, features: &[f64]) -> Result<Outcome> {
        let proba = self.predict_proba(features)?;
        if proba[1] >= proba[0] {
            Ok(Outcome::FullyPaid)
        } else {
            Ok(Outcome::Default)
        }
    }

    /// Whether [`Classifier::explain`] produces attributions.
    fn can_explain(&self) -> bool {
        false
    }

    /// Per-feature attribution of a single prediction. `None` when the model
    /// family cannot explain itself.
    fn explain(&self, _features: &[f64]) -> Option<Result<Contributions>> {
        None
    }
}
