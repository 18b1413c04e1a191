use crate::datatypes::Vertex;

/// Discrete curvature proxy at `q` for the neighbors `p` and `r`.
///
/// This is the 2D cross product of `q - p` and `r - q`, taken as
/// `(Xr-Xq)(Yq-Yp) - (Yr-Yq)(Xq-Xp)`. Zero on straight runs; the sign gives
/// the turning direction.
pub fn triplet_curvature(p: &Vertex, q: &Vertex, r: &Vertex) -> f64 {
    let incoming = q.to_vector() - p.to_vector();
    let outgoing = r.to_vector() - q.to_vector();
    outgoing.perp(&incoming)
}

/// Curvature proxy at every point of a closed loop.
///
/// The first point's predecessor is the last point and vice versa. Do not pass
/// several open chains concatenated together; split them first.
///
/// # Arguments
/// * `points` - The vertices of the loop, in order
///
/// # Returns
/// One curvature value per input point
pub fn closed_loop_curvatures(points: &[Vertex]) -> Vec<f64> {
    let n = points.len();
    if n < 3 {
        return vec![0.0; n];
    }

    (0..n)
        .map(|i| {
            let p = &points[(i + n - 1) % n];
            let r = &points[(i + 1) % n];
            triplet_curvature(p, &points[i], r)
        })
        .collect()
}
