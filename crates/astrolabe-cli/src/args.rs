//! Command-line argument definitions for the Astrolabe CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, the exported view, refinement and logging verbosity.

use clap::{Parser, ValueEnum};

/// Format of the written diagram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Graphviz DOT text
    #[default]
    Dot,
    /// SVG rendered by Graphviz (requires the `graphviz` feature)
    Svg,
}

impl OutputFormat {
    /// File extension used for the default output path.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::Svg => "svg",
        }
    }
}

/// Command-line arguments for the Astrolabe diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input model (JSON)
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output file [default: out.dot or out.svg]
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// C4 view level (1 context, 2 container, 3 component); overrides the config file
    #[arg(long, allow_negative_numbers = true)]
    pub level: Option<i64>,

    /// Fully-qualified name of the element to zoom into; overrides the config file
    #[arg(long)]
    pub focus: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Dot)]
    pub format: OutputFormat,

    /// Refine the layout constraints for at most N iterations
    #[arg(long, value_name = "N")]
    pub refine: Option<usize>,

    /// Write the visible elements, relations and constraints as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub emit_json: Option<String>,

    /// Font family used to measure labels instead of the built-in width table
    #[cfg(feature = "font-shaping")]
    #[arg(long)]
    pub font: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// The output path, derived from the format when none was given.
    pub fn output_path(&self) -> String {
        self.output
            .clone()
            .unwrap_or_else(|| format!("out.{}", self.format.extension()))
    }
}
