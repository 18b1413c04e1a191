use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use indicatif::ProgressBar;
use json::JsonValue;

use crate::{
    datatypes::{DuctGeometry, Parameters, StructureTables, Vertex},
    error::GutLegError,
};

/// Formats a float the way C's `%1.16e` does: 16 fractional digits and a
/// signed exponent of at least two digits.
pub fn format_sci(value: f64) -> String {
    let raw = format!("{:.16e}", value);
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => raw,
    }
}

/// Writes a count header followed by one line per record
///
/// # Arguments
/// * `path` - The output file
/// * `records` - The records to write, in order
/// * `format_record` - Renders one record as a line, without the newline
fn write_table<T>(
    path: &Path,
    records: &[T],
    format_record: impl Fn(&T) -> String,
) -> Result<(), GutLegError> {
    let file = File::create(path).map_err(|err| GutLegError::io(path, err))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "{}", records.len()).map_err(|err| GutLegError::io(path, err))?;

    let bar = ProgressBar::new(records.len() as u64);
    for record in records {
        writeln!(out, "{}", format_record(record)).map_err(|err| GutLegError::io(path, err))?;
        bar.inc(1);
    }
    out.flush().map_err(|err| GutLegError::io(path, err))?;
    bar.finish_and_clear();

    log::info!("wrote {} records to {}", records.len(), path.display());
    Ok(())
}

pub fn write_vertices(path: &Path, vertices: &[Vertex]) -> Result<(), GutLegError> {
    write_table(path, vertices, |v| {
        format!("{} {}", format_sci(v.x), format_sci(v.y))
    })
}

pub fn write_springs(path: &Path, tables: &StructureTables) -> Result<(), GutLegError> {
    write_table(path, &tables.springs, |s| {
        format!(
            "{} {} {} {}",
            s.a,
            s.b,
            format_sci(s.stiffness),
            format_sci(s.rest_length)
        )
    })
}

pub fn write_beams(path: &Path, tables: &StructureTables) -> Result<(), GutLegError> {
    write_table(path, &tables.beams, |b| {
        format!(
            "{} {} {} {} {}",
            b.p,
            b.q,
            b.r,
            format_sci(b.stiffness),
            format_sci(b.curvature)
        )
    })
}

pub fn write_targets(path: &Path, tables: &StructureTables) -> Result<(), GutLegError> {
    write_table(path, &tables.targets, |t| {
        format!("{} {}", t.index, format_sci(t.stiffness))
    })
}

/// The direction code goes out float-formatted, as the solver reads it
pub fn write_porous(path: &Path, tables: &StructureTables) -> Result<(), GutLegError> {
    write_table(path, &tables.porous, |p| {
        format!(
            "{} {} {}",
            p.index,
            format_sci(p.permeability),
            format_sci(f64::from(p.code))
        )
    })
}

/// Summarises a run so the solver input can be checked against it
pub fn manifest(
    params: &Parameters,
    geometry: &DuctGeometry,
    tables: &StructureTables,
) -> JsonValue {
    let segments = &geometry.segments;
    let mut manifest = JsonValue::new_object();

    manifest["structure_name"] = params.structure_name.as_str().into();

    manifest["metadata"]["Lx"] = params.domain_length.into();
    manifest["metadata"]["Nx"] = params.grid_resolution.into();
    manifest["metadata"]["ds"] = params.ds.into();
    manifest["metadata"]["gut_diameter"] = params.gut_diameter.into();
    manifest["metadata"]["leg_diameter"] = params.leg_diameter.into();
    manifest["metadata"]["span_start"] = params.span_start.into();
    manifest["metadata"]["span_end"] = params.span_end.into();
    manifest["metadata"]["centerline"] = params.centerline.into();

    manifest["stiffness"]["spring"] = params.stiffness.spring.into();
    manifest["stiffness"]["cross_spring"] = params.stiffness.cross_spring.into();
    manifest["stiffness"]["beam"] = params.stiffness.beam.into();
    manifest["stiffness"]["target"] = params.stiffness.target.into();
    manifest["stiffness"]["porosity"] = params.stiffness.porosity.into();
    manifest["stiffness"]["seed_beam_curvature"] = params.stiffness.seed_beam_curvature.into();

    manifest["segments"]["half_count"] = segments.half_count.into();
    manifest["segments"]["inner_total"] = segments.inner_total.into();
    manifest["segments"]["inner_plus_half_outer"] = segments.inner_plus_half_outer.into();

    manifest["chains"] = JsonValue::Array(
        segments
            .chains()
            .iter()
            .map(|chain| {
                let mut entry = JsonValue::new_object();
                entry["name"] = chain.kind.name().into();
                entry["first"] = chain.first.into();
                entry["last"] = chain.last().into();
                entry
            })
            .collect(),
    );

    manifest["counts"]["vertices"] = segments.point_count.into();
    manifest["counts"]["springs"] = tables.springs.len().into();
    manifest["counts"]["beams"] = tables.beams.len().into();
    manifest["counts"]["targets"] = tables.targets.len().into();
    manifest["counts"]["porous"] = tables.porous.len().into();

    manifest
}

/// Writes every structure file into `dir`, named after the structure
///
/// # Returns
/// The paths written, vertex file first
pub fn write_all(
    dir: &Path,
    params: &Parameters,
    geometry: &DuctGeometry,
    tables: &StructureTables,
) -> Result<Vec<PathBuf>, GutLegError> {
    std::fs::create_dir_all(dir).map_err(|err| GutLegError::io(dir, err))?;

    let path = |ext: &str| dir.join(format!("{}.{ext}", params.structure_name));

    let vertex_path = path("vertex");
    let spring_path = path("spring");
    let beam_path = path("beam");
    let target_path = path("target");
    let porous_path = path("porous");
    let manifest_path = path("json");

    write_vertices(&vertex_path, &geometry.vertices)?;
    write_springs(&spring_path, tables)?;
    write_beams(&beam_path, tables)?;
    write_targets(&target_path, tables)?;
    write_porous(&porous_path, tables)?;

    std::fs::write(
        &manifest_path,
        manifest(params, geometry, tables).pretty(2),
    )
    .map_err(|err| GutLegError::io(&manifest_path, err))?;
    log::info!("wrote run manifest to {}", manifest_path.display());

    Ok(vec![
        vertex_path,
        spring_path,
        beam_path,
        target_path,
        porous_path,
        manifest_path,
    ])
}

/// Parses a `.vertex` file back into vertices
///
/// # Arguments
/// * `path` - The vertex file
///
/// # Returns
/// The vertices in file order; the header count must match
pub fn read_vertices(path: &Path) -> Result<Vec<Vertex>, GutLegError> {
    let contents = std::fs::read_to_string(path).map_err(|err| GutLegError::io(path, err))?;
    // keep 1-based file line numbers for error messages
    let mut lines = contents
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let count: usize = match lines.next() {
        Some((line_no, header)) => header.trim().parse().map_err(|_| {
            GutLegError::Parse(format!(
                "Bad point count '{}' on line {} of {}",
                header.trim(),
                line_no,
                path.display()
            ))
        })?,
        None => {
            return Err(GutLegError::Parse(format!(
                "Empty vertex file {}",
                path.display()
            )))
        }
    };

    let mut vertices = Vec::with_capacity(count);
    for (line_no, line) in lines {
        let coords: Vec<f64> = line
            .split_whitespace()
            .map(|c| c.parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| GutLegError::Parse(format!("Non-float coordinate on line {line_no}")))?;

        if coords.len() != 2 {
            return Err(GutLegError::Parse(format!(
                "Expected 2 coordinates on line {}, found {}",
                line_no,
                coords.len()
            )));
        }
        vertices.push(Vertex {
            x: coords[0],
            y: coords[1],
        });
    }

    if vertices.len() != count {
        return Err(GutLegError::Parse(format!(
            "Header declares {} points but {} were found",
            count,
            vertices.len()
        )));
    }

    Ok(vertices)
}
