//! Epsilon-tolerant 2-D predicates, evaluated on coordinates already
//! projected into the work plane.
//!
//! Tolerances follow the scale of each quantity: areas compare against
//! `eps²`, products of areas and in-circle determinants against `eps⁴`.

use geo_types::Coord;

use crate::VertexId;

/// Twice the signed area of triangle `abc`. Positive when `abc` is CCW.
#[inline]
pub fn twice_signed_area(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> f64 {
    let x1 = b.x - a.x;
    let y1 = b.y - a.y;
    let x2 = c.x - a.x;
    let y2 = c.y - a.y;
    x1 * y2 - x2 * y1
}

/// True iff closed segments `a0a1` and `b0b1` properly cross.
///
/// Touching, collinear and nearly-collinear configurations (area products
/// within `eps⁴` of zero) count as not crossing. A zero-length segment makes
/// both of its area products zero, so it is reported as not crossing too;
/// no special case is taken for it.
pub fn segments_cross(
    a0: Coord<f64>,
    a1: Coord<f64>,
    b0: Coord<f64>,
    b1: Coord<f64>,
    eps: f64,
) -> bool {
    let eps4 = eps * eps * eps * eps;

    let a0a1b0 = twice_signed_area(a0, a1, b0);
    let a0a1b1 = twice_signed_area(a0, a1, b1);
    if -(a0a1b0 * a0a1b1) <= eps4 {
        return false;
    }

    let b0b1a0 = twice_signed_area(b0, b1, a0);
    let b0b1a1 = twice_signed_area(b0, b1, a1);
    if -(b0b1a0 * b0b1a1) <= eps4 {
        return false;
    }

    true
}

/// Winding density of `contour` at `point`.
///
/// Counts edges passing below the point, so the result is:
///
/// * `2` strictly inside a CCW contour, `-2` strictly inside a CW contour,
/// * `1` / `-1` on the boundary (within `eps²` area tolerance),
/// * `0` outside.
///
/// Contours that wind more than once give larger magnitudes.
pub fn contour_density(
    points: &[Coord<f64>],
    contour: &[VertexId],
    point: Coord<f64>,
    eps: f64,
) -> i32 {
    let eps2 = eps * eps;
    let n = contour.len();
    let mut density = 0;

    for i in 0..n {
        let v0 = points[contour[i]];
        let v1 = points[contour[(i + 1) % n]];

        let x_density = (v1.x > point.x) as i32 - (v0.x > point.x) as i32;
        if x_density == 0 {
            continue;
        }

        let y_density = (v1.y > point.y) as i32 - (v0.y > point.y) as i32;
        if y_density != 0 {
            // Edge straddles the point in both directions; decide by which side it passes.
            let side = x_density as f64
                * ((point.x - v0.x) * (v1.y - v0.y) - (point.y - v0.y) * (v1.x - v0.x));
            if side <= eps2 {
                if -side > eps2 {
                    density += 2 * x_density;
                } else {
                    density += x_density;
                }
            }
        } else if v0.y <= point.y {
            density += 2 * x_density;
        }
    }

    density
}

// Relative rounding bound of the in-circle determinant (Shewchuk's iccerrboundA).
const IN_CIRCLE_ERRBOUND: f64 = (10.0 + 96.0 * (f64::EPSILON / 2.0)) * (f64::EPSILON / 2.0);

/// In-circle comfort of the quad `abcd` whose current diagonal is `a`-`c`.
///
/// `a, b, c` are expected CCW. The value is negative when `d` lies inside
/// the circumcircle of `abc` (the diagonal should become `b`-`d`) and
/// positive when the current diagonal is the better one. It scales with the
/// fourth power of the coordinates.
///
/// Determinants within floating-point rounding of zero are reported as
/// exactly `0.0`, so both diagonals of a cocircular quad look neutral.
pub fn quad_comfort(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>, d: Coord<f64>) -> f64 {
    let adx = a.x - d.x;
    let ady = a.y - d.y;
    let bdx = b.x - d.x;
    let bdy = b.y - d.y;
    let cdx = c.x - d.x;
    let cdy = c.y - d.y;

    let a_lift = adx * adx + ady * ady;
    let b_lift = bdx * bdx + bdy * bdy;
    let c_lift = cdx * cdx + cdy * cdy;

    let bc_det = bdx * cdy - cdx * bdy;
    let ca_det = cdx * ady - adx * cdy;
    let ab_det = adx * bdy - bdx * ady;
    let det = a_lift * bc_det + b_lift * ca_det + c_lift * ab_det;

    let permanent = ((bdx * cdy).abs() + (cdx * bdy).abs()) * a_lift
        + ((cdx * ady).abs() + (adx * cdy).abs()) * b_lift
        + ((adx * bdy).abs() + (bdx * ady).abs()) * c_lift;
    if det.abs() <= IN_CIRCLE_ERRBOUND * permanent {
        return 0.0;
    }
    -det
}

/// Signed angle from vector `a0->a1` to vector `b0->b1`, in `(-pi, pi]`.
pub fn angle(a0: Coord<f64>, a1: Coord<f64>, b0: Coord<f64>, b1: Coord<f64>) -> f64 {
    let ax = a1.x - a0.x;
    let ay = a1.y - a0.y;
    let bx = b1.x - b0.x;
    let by = b1.y - b0.y;

    let cos_angle = ax * bx + ay * by;
    let sin_angle = ax * by - ay * bx;
    sin_angle.atan2(cos_angle)
}

/// Twice the signed area of a contour, summed over its fan triangulation from
/// the first vertex. Contours shorter than 3 have zero area.
pub fn twice_contour_area(points: &[Coord<f64>], contour: &[VertexId]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }
    let v0 = points[contour[0]];
    contour[1..]
        .windows(2)
        .map(|w| twice_signed_area(v0, points[w[0]], points[w[1]]))
        .sum()
}
