//! shared-table-names: naming-collision resolution for shared tables
//!
//! When several record types map onto one physical table (inheritance mapping or
//! table splitting), their columns, keys, foreign-key constraints and indexes share
//! one namespace. This library partitions record types into tables, separates
//! types that only collided because long table names were clipped to the same
//! prefix, and assigns unique, length-bounded names while keeping intentional
//! sharing intact.

pub mod error;
pub mod model;
pub mod naming;
pub mod output;
mod util;

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Result;

pub use error::NamingError;
pub use model::SchemaModel;
pub use naming::{resolve, resolve_with_report, ResolutionReport};

/// SQL Server's `sysname` length, used when neither the caller nor the model file says otherwise
pub const DEFAULT_MAX_IDENTIFIER_LENGTH: usize = 128;

/// Options for resolving a model file
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Path to the XML model file
    pub model_path: PathBuf,
    /// Where to write the resolved model; `None` leaves writing to the caller
    pub output_path: Option<PathBuf>,
    /// Overrides the model file's `maxIdentifierLength`
    pub max_identifier_length: Option<usize>,
    /// Enable verbose output
    pub verbose: bool,
}

/// A resolved model together with what the run changed
#[derive(Debug, Clone)]
pub struct ResolvedModel {
    pub model: SchemaModel,
    pub report: ResolutionReport,
    pub max_identifier_length: usize,
}

/// Load a model file, resolve its names and optionally write the result
pub fn resolve_model_file(options: ResolveOptions) -> Result<ResolvedModel> {
    if options.verbose {
        println!("Loading model: {}", options.model_path.display());
    }

    let loaded = model::load_model_file(&options.model_path)?;

    let max_identifier_length = options
        .max_identifier_length
        .or(loaded.max_identifier_length)
        .unwrap_or(DEFAULT_MAX_IDENTIFIER_LENGTH);
    if max_identifier_length == 0 {
        return Err(NamingError::InvalidIdentifierLength { length: 0 }.into());
    }

    if options.verbose {
        println!(
            "Found {} record types, max identifier length {}",
            loaded.model.len(),
            max_identifier_length
        );
    }

    let mut model = loaded.model;
    let report = resolve_with_report(&mut model, max_identifier_length);

    if options.verbose {
        println!(
            "Renamed {} names, {} clashes left unresolved",
            report.renames.len(),
            report.unresolved.len()
        );
    }

    if let Some(output_path) = &options.output_path {
        let file = File::create(output_path).map_err(|e| NamingError::OutputWriteError {
            path: output_path.clone(),
            source: e,
        })?;
        output::write_resolved_model(BufWriter::new(file), &model, &report, max_identifier_length)?;

        if options.verbose {
            println!("Wrote resolved model: {}", output_path.display());
        }
    }

    Ok(ResolvedModel {
        model,
        report,
        max_identifier_length,
    })
}
