//! Error types for Astrolabe operations.
//!
//! The export pipeline itself never fails: malformed or missing input
//! degrades to an empty result. [`AstrolabeError`] covers the surfaces
//! around it, such as loading models and rendering DOT with Graphviz.

use std::io;

use thiserror::Error;

/// The main error type for Astrolabe operations.
#[derive(Debug, Error)]
pub enum AstrolabeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Render error: {0}")]
    Render(String),
}

impl From<serde_json::Error> for AstrolabeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Model(err.to_string())
    }
}
