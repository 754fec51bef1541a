mod types;

pub use types::*;

use crate::{
    Error, Result,
    model::{Attribution, ScoringContext},
};
use tracing::debug;

/// Scores one applicant.
///
/// The default probability is derived as the complement of the rounded
/// fully-paid probability so the two percentages always sum to 100.
/// Attribution is computed only when `explain` is set and the classifier
/// supports it.
pub fn score(context: &ScoringContext, request: &ScoringRequest, explain: bool) -> Result<ScoringOutcome> {
    request.validate()?;

    let record = request.to_record();
    let features = context.preprocessor().transform(&record)?;

    let classifier = context.classifier();
    if features.len() != classifier.num_features() {
        return Err(Error::ShapeMismatch {
            expected: classifier.num_features(),
            actual: features.len(),
        });
    }

    let proba = classifier.predict_proba(&features)?;
    let p_fully_paid = proba[1];
    if !(0.0..=1.0).contains(&p_fully_paid) {
        return Err(Error::inference(format!(
            "classifier returned probability {p_fully_paid} outside [0, 1]"
        )));
    }
    let predicted_outcome = classifier.predict(&features)?;

    let probability_fully_paid = round2(p_fully_paid * 100.0);
    let probability_default = round2(100.0 - probability_fully_paid);

    let attribution = if explain {
        classifier
            .explain(&features)
            .transpose()?
            .map(|contributions| {
                let names = context
                    .preprocessor()
                    .output_names()
                    .iter()
                    .map(|name| FieldSpec::label_for(name))
                    .collect();
                Attribution::new(names, contributions)
            })
    } else {
        None
    };

    debug!(
        loan_amnt = request.loan_amnt,
        annual_inc = request.annual_inc,
        dti = request.dti,
        probability_fully_paid,
        probability_default,
        outcome = %predicted_outcome,
        explained = attribution.is_some(),
        "Scored request"
    );

    Ok(ScoringOutcome {
        request: *request,
        result: ScoringResult {
            probability_fully_paid,
            probability_default,
            predicted_outcome,
        },
        attribution,
    })
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
