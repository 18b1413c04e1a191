use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

mod connectivity;
mod curvature;
mod datatypes;
mod error;
mod geometry;
mod input;
mod writer;

use datatypes::{ChainKind, DuctGeometry, Parameters, SegmentInfo, Vertex};
use error::GutLegError;

#[derive(Parser)]
#[command(
    name = "gutleg",
    version,
    about = "Builds immersed-boundary input files for a gut tube inside a leg tube"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the vertex, spring, beam, target and porous files
    Generate {
        /// JSON input file; built-in defaults are used when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Directory the structure files are written to
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Override the structure name used for file names
        #[arg(long)]
        name: Option<String>,

        /// Override the point spacing
        #[arg(long)]
        ds: Option<f64>,

        /// Seed beam curvature from the wall geometry
        #[arg(long)]
        seed_curvature: bool,
    },
    /// Re-derive segment boundaries and table sizes from a .vertex file
    Inspect {
        /// The .vertex file to read
        vertex_file: PathBuf,
    },
}

fn generate(
    input_file: Option<&Path>,
    output: &Path,
    name: Option<String>,
    ds: Option<f64>,
    seed_curvature: bool,
) -> Result<(), GutLegError> {
    let mut params = match input_file {
        Some(path) => {
            let input_json = input::load_input_file(path)?;
            input::parse_parameters(&input_json)?
        }
        None => {
            log::info!("no input file given, using built-in parameters");
            Parameters::default()
        }
    };

    if let Some(name) = name {
        params.structure_name = name;
    }
    if let Some(ds) = ds {
        params.ds = ds;
    }
    if seed_curvature {
        params.stiffness.seed_beam_curvature = true;
    }
    input::validate(&params)?;

    log::info!(
        "generating '{}': Lx = {}, Nx = {}, ds = {:e}, gut D = {}, leg D = {}",
        params.structure_name,
        params.domain_length,
        params.grid_resolution,
        params.ds,
        params.gut_diameter,
        params.leg_diameter
    );

    let geometry = geometry::build(&params)?;
    let tables = connectivity::build_tables(&geometry, &params)?;
    let written = writer::write_all(output, &params, &geometry, &tables)?;

    log::info!("wrote {} files to {}", written.len(), output.display());
    Ok(())
}

/// Closed outline of one duct: top wall forward, bottom wall back
fn duct_outline(geometry: &DuctGeometry, top: ChainKind, bottom: ChainKind) -> Vec<Vertex> {
    let segments = &geometry.segments;
    let forward = segments.chain(top).indices();
    let backward = segments.chain(bottom).indices().rev();
    forward
        .chain(backward)
        .map(|index| *geometry.vertex(index))
        .collect()
}

fn inspect(vertex_file: &Path) -> Result<(), GutLegError> {
    let vertices = writer::read_vertices(vertex_file)?;
    let segments = SegmentInfo::from_point_count(vertices.len())?;
    let geometry = DuctGeometry { vertices, segments };

    log::info!(
        "{} points: halfCount = {}, innerTotal = {}, innerPlusHalfOuter = {}",
        segments.point_count,
        segments.half_count,
        segments.inner_total,
        segments.inner_plus_half_outer
    );
    for chain in segments.chains() {
        log::info!(
            "  {:<16} points {}..={}",
            chain.kind.name(),
            chain.first,
            chain.last()
        );
    }

    for (top, bottom) in [
        (ChainKind::InnerTop, ChainKind::InnerBottom),
        (ChainKind::OuterTop, ChainKind::OuterBottom),
    ] {
        let top_chain = segments.chain(top);
        let bottom_chain = segments.chain(bottom);
        let misaligned = top_chain
            .indices()
            .zip(bottom_chain.indices())
            .filter(|(a, b)| geometry.vertex(*a).x != geometry.vertex(*b).x)
            .count();
        if misaligned > 0 {
            log::warn!(
                "{} and {} disagree on x at {} points",
                top.name(),
                bottom.name(),
                misaligned
            );
        }

        let outline = duct_outline(&geometry, top, bottom);
        let peak = curvature::closed_loop_curvatures(&outline)
            .into_iter()
            .fold(0.0_f64, |acc, c| acc.max(c.abs()));
        log::info!(
            "  {} / {} outline: peak |curvature| = {:e}",
            top.name(),
            bottom.name(),
            peak
        );
    }

    let tables = connectivity::build_tables(&geometry, &Parameters::default())?;
    log::info!(
        "expected tables: {} springs, {} beams, {} targets, {} porous points",
        tables.springs.len(),
        tables.beams.len(),
        tables.targets.len(),
        tables.porous.len()
    );

    Ok(())
}

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Generate {
            input,
            output,
            name,
            ds,
            seed_curvature,
        } => generate(input.as_deref(), &output, name, ds, seed_curvature),
        Command::Inspect { vertex_file } => inspect(&vertex_file),
    };

    if let Err(err) = result {
        log::error!("{err}");
        std::process::exit(1);
    }
}
