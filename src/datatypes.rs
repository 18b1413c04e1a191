use std::ops::RangeInclusive;

use nalgebra::Vector2;

use crate::error::GutLegError;

/// Fewest points a wall may hold. Below this the two porosity end markers of
/// a wall overlap and the bending elements vanish.
pub const MIN_WALL_POINTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

/// One of the four open polylines making up the structure, in the order they
/// are laid out in the global point sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainKind {
    InnerTop,
    InnerBottom,
    OuterTop,
    OuterBottom,
}

impl ChainKind {
    pub const ALL: [ChainKind; 4] = [
        ChainKind::InnerTop,
        ChainKind::InnerBottom,
        ChainKind::OuterTop,
        ChainKind::OuterBottom,
    ];

    pub fn is_outer(&self) -> bool {
        matches!(self, ChainKind::OuterTop | ChainKind::OuterBottom)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChainKind::InnerTop => "gut top wall",
            ChainKind::InnerBottom => "gut bottom wall",
            ChainKind::OuterTop => "leg top wall",
            ChainKind::OuterBottom => "leg bottom wall",
        }
    }
}

/// A contiguous run of 1-based point indices belonging to a single wall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chain {
    pub kind: ChainKind,
    pub first: usize,
    pub len: usize,
}

impl Chain {
    pub fn last(&self) -> usize {
        self.first + self.len - 1
    }

    pub fn indices(&self) -> RangeInclusive<usize> {
        self.first..=self.last()
    }
}

/// Segment boundaries of the global point sequence (the "Ninfo" triple).
///
/// Point indices are 1-based. The walls are laid out as
/// `[gut top, gut bottom, leg top, leg bottom]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentInfo {
    /// Points along one wall of the inner duct
    pub half_count: usize,
    /// Points in the inner duct, both walls
    pub inner_total: usize,
    /// Index of the last point of the outer duct's first wall
    pub inner_plus_half_outer: usize,
    /// Points in the whole structure
    pub point_count: usize,
}

impl SegmentInfo {
    /// Builds the segment boundaries from the lengths of the four walls.
    ///
    /// Both walls of a duct must hold the same number of points, otherwise the
    /// cross links and the porosity end markers would land on the wrong points.
    /// Every wall needs at least [`MIN_WALL_POINTS`].
    pub fn from_wall_lengths(
        inner_top: usize,
        inner_bottom: usize,
        outer_top: usize,
        outer_bottom: usize,
    ) -> Result<SegmentInfo, GutLegError> {
        if inner_top != inner_bottom {
            return Err(GutLegError::Geometry(format!(
                "Inner duct walls differ in length ({inner_top} vs {inner_bottom})"
            )));
        }
        if outer_top != outer_bottom {
            return Err(GutLegError::Geometry(format!(
                "Outer duct walls differ in length ({outer_top} vs {outer_bottom})"
            )));
        }
        if inner_top < MIN_WALL_POINTS || outer_top < MIN_WALL_POINTS {
            return Err(GutLegError::Geometry(format!(
                "Walls of {inner_top} (gut) and {outer_top} (leg) points; need at least {MIN_WALL_POINTS}"
            )));
        }

        let inner_total = inner_top + inner_bottom;
        Ok(SegmentInfo {
            half_count: inner_top,
            inner_total,
            inner_plus_half_outer: inner_total + outer_top,
            point_count: inner_total + outer_top + outer_bottom,
        })
    }

    /// Re-derives the segment boundaries from a bare point count, assuming all
    /// four walls share the same sample array.
    pub fn from_point_count(point_count: usize) -> Result<SegmentInfo, GutLegError> {
        if point_count == 0 || point_count % 4 != 0 {
            return Err(GutLegError::Geometry(format!(
                "Point count {point_count} cannot be split into four equal walls"
            )));
        }
        let wall = point_count / 4;
        SegmentInfo::from_wall_lengths(wall, wall, wall, wall)
    }

    pub fn outer_half_count(&self) -> usize {
        self.inner_plus_half_outer - self.inner_total
    }

    pub fn chain(&self, kind: ChainKind) -> Chain {
        let (first, len) = match kind {
            ChainKind::InnerTop => (1, self.half_count),
            ChainKind::InnerBottom => (self.half_count + 1, self.inner_total - self.half_count),
            ChainKind::OuterTop => (self.inner_total + 1, self.outer_half_count()),
            ChainKind::OuterBottom => (
                self.inner_plus_half_outer + 1,
                self.point_count - self.inner_plus_half_outer,
            ),
        };
        Chain { kind, first, len }
    }

    pub fn chains(&self) -> [Chain; 4] {
        ChainKind::ALL.map(|kind| self.chain(kind))
    }
}

/// Point coordinates plus the partition of the global sequence into walls
#[derive(Debug, Clone)]
pub struct DuctGeometry {
    pub vertices: Vec<Vertex>,
    pub segments: SegmentInfo,
}

impl DuctGeometry {
    /// Looks up a point by its 1-based global index
    pub fn vertex(&self, index: usize) -> &Vertex {
        &self.vertices[index - 1]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub a: usize,
    pub b: usize,
    pub stiffness: f64,
    pub rest_length: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beam {
    pub p: usize,
    pub q: usize,
    pub r: usize,
    pub stiffness: f64,
    pub curvature: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub index: usize,
    pub stiffness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PorousPoint {
    pub index: usize,
    pub permeability: f64,
    pub code: i8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructureTables {
    pub springs: Vec<Spring>,
    pub beams: Vec<Beam>,
    pub targets: Vec<Target>,
    pub porous: Vec<PorousPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stiffnesses {
    pub spring: f64,
    pub cross_spring: f64,
    pub beam: f64,
    pub target: f64,
    pub porosity: f64,
    pub seed_beam_curvature: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub structure_name: String,
    pub domain_length: f64,
    pub grid_resolution: usize,
    pub ds: f64,
    pub gut_diameter: f64,
    pub leg_diameter: f64,
    pub span_start: f64,
    pub span_end: f64,
    pub centerline: f64,
    pub stiffness: Stiffnesses,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            structure_name: "gut_leg".to_owned(),
            domain_length: 1.0,
            grid_resolution: 1000,
            ds: 0.0005,
            gut_diameter: 0.05,
            leg_diameter: 0.1,
            span_start: 0.25,
            span_end: 0.75,
            centerline: 0.5,
            stiffness: Stiffnesses {
                spring: 1.0e7,
                cross_spring: 1.0e5,
                beam: 5.0e9,
                target: 1.0e7,
                porosity: 1.0e-3,
                seed_beam_curvature: false,
            },
        }
    }
}
