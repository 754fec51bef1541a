//! Startup loading of the fitted artifacts

use super::{Classifier, GradientBoostedTrees, Preprocessor, ScalerPipeline};
use crate::{Error, Result, config::ModelsConfig};
use std::path::Path;
use tracing::info;

/// Read-only bundle of the two artifacts every scoring action uses.
///
/// Built once at startup and shared between request handlers.
pub struct ScoringContext {
    preprocessor: Box<dyn Preprocessor>,
    classifier: Box<dyn Classifier>,
}

impl ScoringContext {
    /// Pairs a preprocessor with a classifier, checking that the width of the
    /// transformed vector matches the classifier's input.
    pub fn new(preprocessor: Box<dyn Preprocessor>, classifier: Box<dyn Classifier>) -> Result<Self> {
        let produced = preprocessor.output_names().len();
        let expected = classifier.num_features();
        if produced != expected {
            return Err(Error::invalid_artifact(format!(
                "preprocessor produces {produced} features but the classifier expects {expected}"
            )));
        }

        Ok(Self {
            preprocessor,
            classifier,
        })
    }

    pub fn preprocessor(&self) -> &dyn Preprocessor {
        self.preprocessor.as_ref()
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }
}

/// Loader for the preprocessor and classifier artifacts
pub struct ArtifactLoader;

impl ArtifactLoader {
    /// Load both artifacts. Any failure here is fatal for the process.
    pub fn load(config: &ModelsConfig) -> Result<ScoringContext> {
        let preprocessor = Self::load_preprocessor(&config.preprocessor_path)?;
        let classifier = Self::load_classifier(&config.classifier_path)?;

        ScoringContext::new(Box::new(preprocessor), Box::new(classifier))
            .map_err(|e| Error::artifact_load(&config.classifier_path, e))
    }

    pub fn load_preprocessor<P: AsRef<Path>>(path: P) -> Result<ScalerPipeline> {
        let path = path.as_ref();

        info!(path = %path.display(), "Loading preprocessor");

        let json = std::fs::read_to_string(path).map_err(|e| Error::artifact_load(path, e))?;
        let pipeline = ScalerPipeline::from_json(&json).map_err(|e| Error::artifact_load(path, e))?;

        info!(
            path = %path.display(),
            columns = pipeline.transformers.len(),
            "Preprocessor loaded successfully"
        );

        Ok(pipeline)
    }

    pub fn load_classifier<P: AsRef<Path>>(path: P) -> Result<GradientBoostedTrees> {
        let path = path.as_ref();

        info!(path = %path.display(), "Loading classifier");

        let json = std::fs::read_to_string(path).map_err(|e| Error::artifact_load(path, e))?;
        let model =
            GradientBoostedTrees::from_json(&json).map_err(|e| Error::artifact_load(path, e))?;

        info!(
            path = %path.display(),
            trees = model.num_trees(),
            features = model.num_features(),
            explainable = model.can_explain(),
            "Classifier loaded successfully"
        );

        Ok(model)
    }
}
