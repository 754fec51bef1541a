use credit_risk_dashboard::{
    Result,
    model::{Classifier, Contributions, Outcome, Preprocessor, Record},
};
use mockall::mock;

mock! {
    /// Mock preprocessor for testing
    pub Preprocessor {}

    impl Preprocessor for Preprocessor {
        fn output_names(&self) -> Vec<String>;
        fn transform(&self, record: &Record) -> Result<Vec<f64>>;
    }
}

mock! {
    /// Mock classifier for testing
    pub Classifier {}

    impl Classifier for Classifier {
        fn num_features(&self) -> usize;
        fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]>;
        fn predict(&self, features: &[f64]) -> Result<Outcome>;
        fn can_explain(&self) -> bool;
        fn explain(&self, features: &[f64]) -> Option<Result<Contributions>>;
    }
}

pub fn column_names() -> Vec<String> {
    vec![
        "loan_amnt".to_string(),
        "annual_inc".to_string(),
        "dti".to_string(),
    ]
}

/// Preprocessor that passes the three columns through unchanged
pub fn passthrough_preprocessor() -> MockPreprocessor {
    let mut preprocessor = MockPreprocessor::new();
    preprocessor.expect_output_names().returning(column_names);
    preprocessor.expect_transform().returning(|record| {
        Ok(record.columns().map(|(_, value)| value).collect())
    });
    preprocessor
}

/// Classifier that always answers with the given probabilities and no explanation
pub fn fixed_classifier(proba: [f64; 2]) -> MockClassifier {
    let mut classifier = MockClassifier::new();
    classifier.expect_num_features().return_const(3usize);
    classifier
        .expect_predict_proba()
        .returning(move |_| Ok(proba));
    classifier.expect_predict().returning(move |_| {
        Ok(if proba[1] >= proba[0] {
            Outcome::FullyPaid
        } else {
            Outcome::Default
        })
    });
    classifier.expect_can_explain().return_const(false);
    classifier.expect_explain().returning(|_| None);
    classifier
}
