use credit_risk_dashboard::{
    config::{Config, DashboardConfig, LogsConfig, ModelsConfig, ServerConfig},
    model::{GradientBoostedTrees, ScalerPipeline, ScoringContext},
    server::handlers::AppState,
};
use serde_json::Value;
use std::{path::Path, sync::Arc};
use tempfile::TempDir;

/// Standard scaling around round numbers so transformed values are easy to
/// reason about: loan 10000 ± 5000, income 60000 ± 30000, dti 15 ± 5.
pub const PREPROCESSOR_JSON: &str = r#"{
    "transformers": [
        { "column": "loan_amnt", "kind": "standard_scaler", "mean": 10000.0, "scale": 5000.0 },
        { "column": "annual_inc", "kind": "standard_scaler", "mean": 60000.0, "scale": 30000.0 },
        { "column": "dti", "kind": "standard_scaler", "mean": 15.0, "scale": 5.0 }
    ]
}"#;

/// Two trees over the three scaled features, with additive covers.
pub const MODEL_JSON: &str = r#"{
    "objective": "binary:logistic",
    "base_score": 0.75,
    "num_features": 3,
    "trees": [
        { "nodeid": 0, "split": "f2", "split_condition": 0.0, "yes": 1, "no": 2, "missing": 1, "cover": 100.0,
          "children": [
            { "nodeid": 1, "split": "f1", "split_condition": 0.0, "yes": 3, "no": 4, "missing": 3, "cover": 60.0,
              "children": [
                { "nodeid": 3, "leaf": 0.3, "cover": 30.0 },
                { "nodeid": 4, "leaf": 0.6, "cover": 30.0 }
              ] },
            { "nodeid": 2, "split": "f0", "split_condition": 0.5, "yes": 5, "no": 6, "missing": 5, "cover": 40.0,
              "children": [
                { "nodeid": 5, "leaf": -0.2, "cover": 25.0 },
                { "nodeid": 6, "leaf": -0.7, "cover": 15.0 }
              ] }
          ] },
        { "nodeid": 0, "split": "f1", "split_condition": -0.5, "yes": 1, "no": 2, "missing": 1, "cover": 100.0,
          "children": [
            { "nodeid": 1, "leaf": -0.4, "cover": 20.0 },
            { "nodeid": 2, "split": "f2", "split_condition": 1.0, "yes": 3, "no": 4, "missing": 3, "cover": 80.0,
              "children": [
                { "nodeid": 3, "leaf": 0.25, "cover": 60.0 },
                { "nodeid": 4, "leaf": -0.15, "cover": 20.0 }
              ] }
          ] }
    ]
}"#;

/// Same ensemble without cover statistics, so it cannot explain itself.
pub fn model_json_without_cover() -> String {
    fn strip(value: &mut Value) {
        match value {
            Value::Object(map) => {
                map.remove("cover");
                map.values_mut().for_each(strip);
            }
            Value::Array(items) => items.iter_mut().for_each(strip),
            _ => {}
        }
    }

    let mut model: Value = serde_json::from_str(MODEL_JSON).unwrap();
    strip(&mut model);
    model.to_string()
}

pub fn create_test_context() -> ScoringContext {
    let preprocessor = ScalerPipeline::from_json(PREPROCESSOR_JSON).unwrap();
    let classifier = GradientBoostedTrees::from_json(MODEL_JSON).unwrap();
    ScoringContext::new(Box::new(preprocessor), Box::new(classifier)).unwrap()
}

pub fn create_test_state(context: ScoringContext, dashboard: DashboardConfig) -> AppState {
    AppState {
        context: Arc::new(context),
        dashboard: Arc::new(dashboard),
    }
}

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Writes both fixture artifacts into `dir` and returns a config pointing at them.
pub fn write_artifacts(dir: &Path) -> ModelsConfig {
    let preprocessor_path = dir.join("preprocessor.json");
    let classifier_path = dir.join("xgb_model.json");
    std::fs::write(&preprocessor_path, PREPROCESSOR_JSON).unwrap();
    std::fs::write(&classifier_path, MODEL_JSON).unwrap();
    ModelsConfig {
        preprocessor_path,
        classifier_path,
    }
}

/// Create a test configuration with sensible defaults
pub fn create_test_config(models: ModelsConfig) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            logs: LogsConfig {
                level: "debug".to_string(),
            },
        },
        models,
        dashboard: DashboardConfig::default(),
    }
}

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
server:
  host: "127.0.0.1"
  port: 9090
  logs:
    level: "debug"

models:
  preprocessor_path: "artifacts/pre.json"
  classifier_path: "artifacts/model.json"

dashboard:
  title: "Loan Desk"
  subtitle: "Score one applicant"
  chart_mode: "feature_values"
  footer: "Risk team"
"#;

/// Configuration that only overrides the port
pub const MINIMAL_CONFIG_YAML: &str = r#"
server:
  port: 3000
"#;

/// Invalid configuration YAML for testing error cases
pub const INVALID_CONFIG_YAML: &str = r#"
server:
  port: "not-a-number"
dashboard:
  chart_mode: "pie"
"#;
