use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;

use shared_table_names::{output, resolve_model_file, ResolveOptions};

#[derive(Parser)]
#[command(name = "shared-table-names")]
#[command(author, version, about = "Resolve naming collisions between record types sharing a table")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve column, key, foreign key and index names in a model file
    Resolve {
        /// Path to the XML model file
        #[arg(short, long)]
        model: PathBuf,

        /// Output path for the resolved model (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum identifier length of the target engine (overrides the model file)
        #[arg(short = 'l', long, value_parser = clap::value_parser!(u64).range(1..))]
        max_identifier_length: Option<u64>,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            model,
            output,
            max_identifier_length,
            verbose,
        } => {
            init_tracing(verbose);

            let to_stdout = output.is_none();
            let options = ResolveOptions {
                model_path: model,
                output_path: output,
                max_identifier_length: max_identifier_length.map(|l| l as usize),
                // Progress lines would interleave with the XML on stdout
                verbose: verbose && !to_stdout,
            };

            let resolved = resolve_model_file(options)?;
            if to_stdout {
                output::write_resolved_model(
                    io::stdout().lock(),
                    &resolved.model,
                    &resolved.report,
                    resolved.max_identifier_length,
                )?;
                println!();
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
