use crate::{
    datatypes::{DuctGeometry, Parameters, SegmentInfo, Vertex, MIN_WALL_POINTS},
    error::GutLegError,
};

/// Relative slack when deciding whether the last step lands on the end point
const STEP_TOLERANCE: f64 = 1e-9;

/// Samples `start, start + step, ...` up to and including `end`.
///
/// The last sample may fall short of `end` when `step` does not divide the
/// span evenly.
///
/// # Arguments
/// * `start` - The first sample
/// * `end` - The inclusive upper bound
/// * `step` - The spacing between samples
///
/// # Returns
/// An ascending vector of samples; empty if `end < start`
pub fn stepped_samples(start: f64, end: f64, step: f64) -> Vec<f64> {
    if end < start || step <= 0.0 {
        return Vec::new();
    }
    let steps = ((end - start) / step + STEP_TOLERANCE).floor() as usize;
    (0..=steps).map(|i| start + i as f64 * step).collect()
}

/// Places a wall at constant height over the sample array
fn wall(samples: &[f64], y: f64) -> Vec<Vertex> {
    samples.iter().map(|&x| Vertex { x, y }).collect()
}

/// Builds the point sequence for the gut (inner) and leg (outer) ducts.
///
/// Every wall uses the same horizontal samples, so point `i` of a duct's top
/// wall and point `i` of its bottom wall share an x-coordinate.
///
/// # Arguments
/// * `params` - The validated run parameters
///
/// # Returns
/// The ordered vertices `[gut top, gut bottom, leg top, leg bottom]` and their
/// segment boundaries
pub fn build(params: &Parameters) -> Result<DuctGeometry, GutLegError> {
    let grid_ds = params.domain_length / (2.0 * params.grid_resolution as f64);
    if ((params.ds - grid_ds) / grid_ds).abs() > 0.01 {
        log::warn!(
            "ds = {:e} differs from Lx/(2 Nx) = {:e}; make sure the solver grid matches",
            params.ds,
            grid_ds
        );
    }

    let x_start = params.span_start * params.domain_length;
    let x_end = params.span_end * params.domain_length;
    let samples = stepped_samples(x_start, x_end, params.ds);

    if samples.len() < MIN_WALL_POINTS {
        return Err(GutLegError::Geometry(format!(
            "Only {} points per wall with ds = {:e}; need at least {}",
            samples.len(),
            params.ds,
            MIN_WALL_POINTS
        )));
    }

    if let Some(last) = samples.last() {
        if x_end - last > STEP_TOLERANCE * params.ds {
            log::warn!(
                "duct span truncated: last sample at x = {:e}, nominal end {:e}",
                last,
                x_end
            );
        }
    }

    let y_center = params.centerline * params.domain_length;
    let gut_top = wall(&samples, y_center + params.gut_diameter / 2.0);
    let gut_bottom = wall(&samples, y_center - params.gut_diameter / 2.0);
    let leg_top = wall(&samples, y_center + params.leg_diameter / 2.0);
    let leg_bottom = wall(&samples, y_center - params.leg_diameter / 2.0);

    let segments = SegmentInfo::from_wall_lengths(
        gut_top.len(),
        gut_bottom.len(),
        leg_top.len(),
        leg_bottom.len(),
    )?;

    let mut vertices = Vec::with_capacity(segments.point_count);
    vertices.extend(gut_top);
    vertices.extend(gut_bottom);
    vertices.extend(leg_top);
    vertices.extend(leg_bottom);

    log::info!(
        "built {} points ({} per wall) between x = {:.4} and x = {:.4}",
        segments.point_count,
        segments.half_count,
        x_start,
        x_end
    );
    log::debug!("segment info: {:?}", segments);

    Ok(DuctGeometry { vertices, segments })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::ChainKind;
    use approx::assert_relative_eq;

    #[test]
    fn samples_include_exact_end() {
        let samples = stepped_samples(0.25, 0.75, 0.0005);
        assert_eq!(samples.len(), 1001);
        assert_relative_eq!(samples[0], 0.25);
        assert_relative_eq!(*samples.last().unwrap(), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn samples_truncate_uneven_span() {
        let samples = stepped_samples(0.0, 1.0, 0.3);
        assert_eq!(samples.len(), 4);
        assert_relative_eq!(*samples.last().unwrap(), 0.9, epsilon = 1e-12);
    }

    #[test]
    fn samples_empty_for_reversed_span() {
        assert!(stepped_samples(1.0, 0.0, 0.1).is_empty());
    }

    #[test]
    fn inner_duct_has_equal_walls() {
        for ds in [0.0005, 0.0007, 0.0013, 0.01] {
            let params = Parameters {
                ds,
                ..Parameters::default()
            };
            let geometry = build(&params).unwrap();
            let segments = geometry.segments;
            assert_eq!(segments.half_count * 2, segments.inner_total);
            assert_eq!(geometry.vertices.len(), segments.point_count);
        }
    }

    #[test]
    fn walls_sit_at_duct_offsets() {
        let params = Parameters::default();
        let geometry = build(&params).unwrap();
        let y_center = params.centerline * params.domain_length;

        let expected = [
            (ChainKind::InnerTop, y_center + params.gut_diameter / 2.0),
            (ChainKind::InnerBottom, y_center - params.gut_diameter / 2.0),
            (ChainKind::OuterTop, y_center + params.leg_diameter / 2.0),
            (ChainKind::OuterBottom, y_center - params.leg_diameter / 2.0),
        ];
        for (kind, y) in expected {
            for index in geometry.segments.chain(kind).indices() {
                assert_relative_eq!(geometry.vertex(index).y, y);
            }
        }
    }

    #[test]
    fn paired_wall_points_share_x() {
        let geometry = build(&Parameters::default()).unwrap();
        let half = geometry.segments.half_count;
        for i in 1..=half {
            assert_eq!(geometry.vertex(i).x, geometry.vertex(i + half).x);
        }
    }

    #[test]
    fn too_coarse_spacing_is_rejected() {
        let params = Parameters {
            ds: 0.2,
            ..Parameters::default()
        };
        assert!(matches!(build(&params), Err(GutLegError::Geometry(_))));
    }
}
