pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod scoring;
pub mod server;

pub use error::{Error, Result};
