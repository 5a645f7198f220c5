// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP-Lite command-line front end
//!
//! Reads a `.step`/`.stp` file, reconstructs its planar solid and writes the
//! mesh as JSON (mesh, debug overlay and report) or OBJ.

mod config;
mod output;

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use step_lite_geometry::{is_step_document, is_step_path, reconstruct, HoleMode};

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Obj,
}

#[derive(Debug, Parser)]
#[command(name = "step-lite", version)]
#[command(about = "Reconstruct planar STEP solids into triangle meshes.")]
struct Cli {
    /// STEP file to reconstruct
    input: PathBuf,
    /// Output file (stdout when omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
    /// Endpoint matching distance for loop closing
    #[arg(long, value_parser = config::parse_tolerance)]
    tolerance: Option<f64>,
    /// How inner bounds are treated: subtract or fill
    #[arg(long)]
    hole_mode: Option<HoleMode>,
    /// Keep triangles in earcut order instead of winding them around the normal
    #[arg(long)]
    no_orient: bool,
    /// Skip the debug overlay
    #[arg(long)]
    no_debug: bool,
    /// Flip the normal of faces whose same-sense flag is false
    #[arg(long)]
    respect_face_sense: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn,step_lite=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().with_overrides(
        cli.tolerance,
        cli.hole_mode,
        cli.no_orient,
        cli.no_debug,
        cli.respect_face_sense,
    );

    tracing::info!(
        input = %cli.input.display(),
        tolerance = config.tolerance,
        hole_mode = %config.hole_mode,
        "Reconstructing"
    );

    run(&cli, &config)
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    let content = fs::read_to_string(&cli.input)
        .with_context(|| format!("read input: {:?}", cli.input))?;
    if !is_step_document(&content) && !is_step_path(&cli.input) {
        bail!("{:?} is not a STEP document", cli.input);
    }

    let solid = reconstruct(&content, &config.reconstruct_config());
    let summary = output::summary(&solid);

    match &cli.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create output directory: {parent:?}"))?;
            }
            let file = fs::File::create(path).with_context(|| format!("create output: {path:?}"))?;
            write_solid(BufWriter::new(file), cli.format, &solid, &cli.input)
                .with_context(|| format!("write output: {path:?}"))?;
            print!("{summary}");
        }
        None => {
            // Mesh goes to stdout, the summary stays out of the way
            write_solid(io::stdout().lock(), cli.format, &solid, &cli.input)?;
            eprint!("{summary}");
        }
    }

    Ok(())
}

fn write_solid(
    mut writer: impl Write,
    format: Format,
    solid: &step_lite_geometry::SolidMesh,
    input: &Path,
) -> Result<()> {
    match format {
        Format::Json => output::write_json(&mut writer, solid).context("serialize solid")?,
        Format::Obj => {
            let name = input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("solid");
            output::write_obj(&mut writer, &solid.mesh, name)?;
        }
    }
    writer.flush()?;
    Ok(())
}
