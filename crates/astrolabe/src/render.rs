//! SVG rendering through the Graphviz `dot` binary.
//!
//! The engine itself only produces DOT text. This module hands that text to
//! an installed Graphviz through `graphviz-rust` for callers that want the
//! finished drawing.

use graphviz_rust::{
    cmd::{CommandArg, Format},
    exec_dot,
};
use log::{debug, info};

use crate::AstrolabeError;

/// Lays out `dot` with Graphviz and returns the SVG document.
///
/// An empty document renders to an empty string without invoking Graphviz.
///
/// # Errors
///
/// Returns [`AstrolabeError::Render`] if the `dot` binary cannot be run,
/// rejects the input, or emits output that is not UTF-8.
pub fn render_svg(dot: &str) -> Result<String, AstrolabeError> {
    if dot.is_empty() {
        return Ok(String::new());
    }

    info!(bytes = dot.len(); "Rendering SVG with Graphviz");
    let output = exec_dot(dot.to_string(), vec![CommandArg::Format(Format::Svg)])
        .map_err(|err| AstrolabeError::Render(format!("failed to run Graphviz: {err}")))?;

    let svg = String::from_utf8(output)
        .map_err(|err| AstrolabeError::Render(format!("Graphviz output is not UTF-8: {err}")))?;
    debug!(bytes = svg.len(); "SVG rendered");
    Ok(svg)
}
