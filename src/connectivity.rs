use crate::{
    curvature::triplet_curvature,
    datatypes::{
        Beam, ChainKind, DuctGeometry, Parameters, PorousPoint, SegmentInfo, Spring,
        StructureTables, Target,
    },
    error::GutLegError,
};

/// Walls held together by springs and beams
const ELASTIC_CHAINS: [ChainKind; 2] = [ChainKind::InnerTop, ChainKind::InnerBottom];

/// Walls pinned by target points and carrying porosity
const ANCHORED_CHAINS: [ChainKind; 2] = [ChainKind::OuterTop, ChainKind::OuterBottom];

/// Where a point sits along its wall, as far as the porosity codes care
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallPosition {
    First,
    Second,
    SecondToLast,
    Last,
    Interior,
}

impl WallPosition {
    pub fn of(offset: usize, len: usize) -> WallPosition {
        if offset == 0 {
            WallPosition::First
        } else if offset == 1 {
            WallPosition::Second
        } else if offset + 1 == len {
            WallPosition::Last
        } else if offset + 2 == len {
            WallPosition::SecondToLast
        } else {
            WallPosition::Interior
        }
    }
}

/// Porosity direction codes at the open ends of the leg walls
const END_CODES: [(WallPosition, i8); 4] = [
    (WallPosition::First, -2),
    (WallPosition::Second, -1),
    (WallPosition::SecondToLast, 1),
    (WallPosition::Last, 2),
];

/// Direction code for a point given its wall and its position on that wall.
/// Only leg wall ends are nonzero.
pub fn direction_code(kind: ChainKind, position: WallPosition) -> i8 {
    if !kind.is_outer() {
        return 0;
    }
    END_CODES
        .iter()
        .find(|(p, _)| *p == position)
        .map(|(_, code)| *code)
        .unwrap_or(0)
}

/// Links neighbouring points along each gut wall, then ties every top wall
/// point to the bottom wall point at the same x.
///
/// # Arguments
/// * `segments` - The segment boundaries of the structure
/// * `params` - Run parameters supplying stiffnesses and rest lengths
///
/// # Returns
/// `(halfCount - 1) * 2` adjacent springs followed by `halfCount` cross springs
pub fn springs(segments: &SegmentInfo, params: &Parameters) -> Vec<Spring> {
    let mut springs = Vec::with_capacity(segments.inner_total - 2 + segments.half_count);

    for kind in ELASTIC_CHAINS {
        let chain = segments.chain(kind);
        for a in chain.first..chain.last() {
            springs.push(Spring {
                a,
                b: a + 1,
                stiffness: params.stiffness.spring,
                rest_length: params.ds,
            });
        }
    }

    let top = segments.chain(ChainKind::InnerTop);
    let bottom = segments.chain(ChainKind::InnerBottom);
    for offset in 0..top.len.min(bottom.len) {
        springs.push(Spring {
            a: top.first + offset,
            b: bottom.first + offset,
            stiffness: params.stiffness.cross_spring,
            rest_length: params.gut_diameter,
        });
    }

    springs
}

/// Builds a bending element at every interior point of each gut wall.
///
/// Curvature is zero unless `seed_beam_curvature` is set, in which case each
/// element takes the curvature of its own three points.
pub fn beams(geometry: &DuctGeometry, params: &Parameters) -> Result<Vec<Beam>, GutLegError> {
    let segments = &geometry.segments;
    if segments.inner_total < 5 {
        return Err(GutLegError::Connectivity(format!(
            "Need at least 5 gut points for bending elements, got {}",
            segments.inner_total
        )));
    }

    let mut beams = Vec::with_capacity(segments.inner_total - 4);
    for kind in ELASTIC_CHAINS {
        let chain = segments.chain(kind);
        for q in chain.first + 1..chain.last() {
            let curvature = if params.stiffness.seed_beam_curvature {
                triplet_curvature(
                    geometry.vertex(q - 1),
                    geometry.vertex(q),
                    geometry.vertex(q + 1),
                )
            } else {
                0.0
            };

            beams.push(Beam {
                p: q - 1,
                q,
                r: q + 1,
                stiffness: params.stiffness.beam,
                curvature,
            });
        }
    }

    Ok(beams)
}

/// Pins every leg point
pub fn targets(segments: &SegmentInfo, params: &Parameters) -> Vec<Target> {
    ANCHORED_CHAINS
        .iter()
        .flat_map(|kind| segments.chain(*kind).indices())
        .map(|index| Target {
            index,
            stiffness: params.stiffness.target,
        })
        .collect()
}

/// Assigns a permeability and direction code to every leg point.
///
/// The first two points of each leg wall carry `-2, -1` and the last two carry
/// `1, 2`; everything else is sealed with code `0`.
pub fn porous_points(segments: &SegmentInfo, params: &Parameters) -> Vec<PorousPoint> {
    let mut points = Vec::with_capacity(segments.point_count - segments.inner_total);

    for kind in ANCHORED_CHAINS {
        let chain = segments.chain(kind);
        for index in chain.indices() {
            let position = WallPosition::of(index - chain.first, chain.len);
            points.push(PorousPoint {
                index,
                permeability: params.stiffness.porosity,
                code: direction_code(kind, position),
            });
        }
    }

    points
}

/// Derives all four connectivity tables for a structure
pub fn build_tables(
    geometry: &DuctGeometry,
    params: &Parameters,
) -> Result<StructureTables, GutLegError> {
    let segments = &geometry.segments;

    let tables = StructureTables {
        springs: springs(segments, params),
        beams: beams(geometry, params)?,
        targets: targets(segments, params),
        porous: porous_points(segments, params),
    };

    log::info!(
        "derived {} springs, {} beams, {} targets, {} porous points",
        tables.springs.len(),
        tables.beams.len(),
        tables.targets.len(),
        tables.porous.len()
    );

    Ok(tables)
}
