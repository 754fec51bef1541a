use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_preprocessor_path")]
    pub preprocessor_path: PathBuf,
    #[serde(default = "default_classifier_path")]
    pub classifier_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
    #[serde(default)]
    pub chart_mode: ChartMode,
    #[serde(default = "default_footer")]
    pub footer: String,
}

/// Which chart fills the feature panel of the results area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartMode {
    /// Per-feature attribution from the classifier, when it can explain itself.
    #[default]
    Attribution,
    /// Raw magnitudes of the submitted inputs.
    FeatureValues,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            preprocessor_path: default_preprocessor_path(),
            classifier_path: default_classifier_path(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: default_subtitle(),
            chart_mode: ChartMode::default(),
            footer: default_footer(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_preprocessor_path() -> PathBuf {
    PathBuf::from("models/preprocessor.json")
}

fn default_classifier_path() -> PathBuf {
    PathBuf::from("models/xgb_model.json")
}

fn default_title() -> String {
    "Credit Risk Scoring Dashboard".to_string()
}

fn default_subtitle() -> String {
    "Adjust loan details and click Predict to see updated results.".to_string()
}

fn default_footer() -> String {
    "Interactive Credit Risk Dashboard".to_string()
}
