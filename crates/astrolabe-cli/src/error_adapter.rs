//! Error adapter for converting AstrolabeError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use astrolabe::AstrolabeError;

/// Adapter giving an [`AstrolabeError`] a stable diagnostic code and, where
/// one applies, a hint on how to fix it.
pub struct ErrorAdapter(pub AstrolabeError);

impl fmt::Debug for ErrorAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            AstrolabeError::Io(_) => "astrolabe::io",
            AstrolabeError::Model(_) => "astrolabe::model",
            AstrolabeError::Config(_) => "astrolabe::config",
            AstrolabeError::Render(_) => "astrolabe::render",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            AstrolabeError::Io(_) => return None,
            AstrolabeError::Model(_) => {
                "a model is a JSON object with an `items` array of elements and relations"
            }
            AstrolabeError::Config(_) => {
                "configuration keys are snake_case, e.g. `rank_dir = \"LR\"` or `view_level = 2`"
            }
            AstrolabeError::Render(_) => {
                "SVG output needs the `graphviz` feature and the Graphviz `dot` binary on PATH"
            }
        };
        Some(Box::new(help))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}
