//! CLI logic for the Astrolabe diagram tool.
//!
//! This module contains the core CLI logic: it reads a JSON model, exports
//! one view of it and writes the DOT (or SVG) document.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, OutputFormat};
pub use error_adapter::ErrorAdapter;

use std::fs;

use log::{info, warn};
use serde::Serialize;

use astrolabe::{
    AstrolabeError, ExportResult, Exporter,
    config::ExportConfig,
    constraints::LayoutConstraints,
    extract::Element,
    model::Model,
    projection::Relation,
    quality::LayoutQuality,
    text::TextMeasure,
};

/// Intermediates written by `--emit-json`.
#[derive(Serialize)]
struct Dump<'a> {
    elements: &'a [Element],
    relations: &'a [Relation],
    constraints: Option<&'a LayoutConstraints>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<&'a LayoutQuality>,
}

/// Run the Astrolabe CLI application
///
/// This function loads the configuration and the model, exports the
/// requested view and writes the resulting document to the output file.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `AstrolabeError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed models
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), AstrolabeError> {
    let output = args.output_path();
    info!(
        input_path = args.input,
        output_path = output;
        "Processing model"
    );

    let config = apply_overrides(config::load_config(args.config.as_ref())?, args);

    let source = fs::read_to_string(&args.input)?;
    let model = astrolabe::parse_model(&source)?;

    let (result, quality) = export(args, config, &model);
    if result.is_empty() {
        warn!(input_path = args.input; "Model has no elements; writing an empty document");
    }

    let document = match args.format {
        OutputFormat::Dot => result.dot.clone(),
        OutputFormat::Svg => render_svg(&result.dot)?,
    };
    fs::write(&output, document)?;
    info!(output_file = output; "Diagram exported successfully");

    if let Some(path) = &args.emit_json {
        let dump = Dump {
            elements: &result.elements,
            relations: &result.relations,
            constraints: result.constraints.as_ref(),
            quality: quality.as_ref(),
        };
        fs::write(path, serde_json::to_string_pretty(&dump)?)?;
        info!(path = path; "Intermediates written");
    }

    Ok(())
}

/// Command-line view options take precedence over the configuration file.
fn apply_overrides(mut config: ExportConfig, args: &Args) -> ExportConfig {
    if let Some(level) = args.level {
        config = config.with_view_level(level);
    }
    if let Some(focus) = &args.focus {
        config = config.with_focus(Some(focus.as_str()));
    }
    config
}

#[cfg(feature = "font-shaping")]
fn export(args: &Args, config: ExportConfig, model: &Model) -> (ExportResult, Option<LayoutQuality>) {
    match &args.font {
        Some(family) => {
            info!(font = family; "Measuring labels with font shaping");
            let measure = astrolabe::text::FontShaper::new(family.as_str());
            export_with(&Exporter::with_measure(config, measure), model, args.refine)
        }
        None => export_with(&Exporter::new(config), model, args.refine),
    }
}

#[cfg(not(feature = "font-shaping"))]
fn export(args: &Args, config: ExportConfig, model: &Model) -> (ExportResult, Option<LayoutQuality>) {
    export_with(&Exporter::new(config), model, args.refine)
}

fn export_with<M: TextMeasure>(
    exporter: &Exporter<M>,
    model: &Model,
    refine: Option<usize>,
) -> (ExportResult, Option<LayoutQuality>) {
    match refine {
        Some(max_iterations) => {
            let refined = exporter.export_refined(Some(model), max_iterations);
            info!(
                iterations = refined.iterations,
                score = refined.quality.score();
                "Layout refined"
            );
            (refined.result, Some(refined.quality))
        }
        None => (exporter.export(Some(model)), None),
    }
}

#[cfg(feature = "graphviz")]
fn render_svg(dot: &str) -> Result<String, AstrolabeError> {
    astrolabe::render::render_svg(dot)
}

#[cfg(not(feature = "graphviz"))]
fn render_svg(_dot: &str) -> Result<String, AstrolabeError> {
    Err(AstrolabeError::Render(
        "SVG output is not available in this build".to_string(),
    ))
}
