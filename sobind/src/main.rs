//! Structured-output binding generator driver.
//!
//! Default mode regenerates the full artifact set for the standard schema
//! into the output directory; `clean` removes everything a run creates and
//! exits. Any schema or filesystem error exits nonzero.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sobind")]
#[command(about = "Generate C, R and Fortran bindings for the structured-output model")]
struct Cli {
    /// Output directory for generated artifacts.
    #[arg(long = "out-dir", default_value = "output", global = true)]
    out_dir: PathBuf,
    /// File whose contents are prepended to every artifact as a license
    /// header, commented per target language.
    #[arg(long = "license-header")]
    license_header: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Remove all generated files and directories, then exit.
    Clean,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Some(Mode::Clean) = cli.command {
        sobind_codegen::clean(&cli.out_dir).context("cleaning output tree")?;
        return Ok(());
    }

    let license_header = match &cli.license_header {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("reading license header {}", path.display()))?,
        ),
        None => None,
    };

    let schema = sobind_schema::standard_output_schema();
    info!(entities = schema.entities.len(), "loaded standard schema");

    let options = sobind_codegen::CodegenOptions { license_header };
    let files = sobind_codegen::generate_with_options(&schema, options)
        .context("generating artifacts")?;
    sobind_codegen::write_files(&files, &cli.out_dir).context("writing output tree")?;
    Ok(())
}
