//! Ear clipping of a single simple (possibly self-touching) contour.

use geo_types::Coord;
use log::{debug, trace};

use crate::error::{Result, TriangulationError};
use crate::predicates::twice_signed_area;
use crate::{Contour, Triangle, VertexId};

fn trivial(contour: &[VertexId]) -> Option<Vec<Triangle>> {
    match contour.len() {
        0..=2 => Some(Vec::new()),
        3 => Some(vec![[contour[0], contour[1], contour[2]]]),
        _ => None,
    }
}

#[inline]
fn dist_sq(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Drops each vertex lying within `eps` of the previously kept one, then the
/// last vertex if it coincides with the first.
///
/// This also collapses the doubled vertex left by bridging a single-vertex
/// hole.
pub fn remove_duplicates(points: &[Coord<f64>], contour: &[VertexId], eps: f64) -> Contour {
    let eps2 = eps * eps;
    let mut kept: Contour = Vec::with_capacity(contour.len());
    for &v in contour {
        match kept.last() {
            Some(&prev) if dist_sq(points[prev], points[v]) <= eps2 => {}
            _ => kept.push(v),
        }
    }
    if kept.len() >= 2 && dist_sq(points[kept[0]], points[kept[kept.len() - 1]]) <= eps2 {
        kept.pop();
    }
    kept
}

/// True if no non-convex vertex of `ring` lies inside or on the triangle
/// formed by position `i` and its neighbours.
fn is_ear(points: &[Coord<f64>], ring: &[VertexId], i: usize, eps2: f64) -> bool {
    let n = ring.len();
    let pre = (i + n - 1) % n;
    let post = (i + 1) % n;
    let v = points[ring[i]];
    let pre_v = points[ring[pre]];
    let post_v = points[ring[post]];

    if twice_signed_area(pre_v, v, post_v) <= 0.0 {
        return false;
    }

    for j in 0..n {
        if j == i || j == pre || j == post {
            continue;
        }
        let w = points[ring[j]];
        let pre_w = points[ring[(j + n - 1) % n]];
        let post_w = points[ring[(j + 1) % n]];

        // Convex vertices cannot sit inside a convex ear.
        if twice_signed_area(pre_w, w, post_w) > eps2 {
            continue;
        }
        if -twice_signed_area(pre_v, v, w) <= eps2
            && -twice_signed_area(v, post_v, w) <= eps2
            && -twice_signed_area(post_v, pre_v, w) <= eps2
        {
            return false;
        }
    }
    true
}

/// Triangulates a simple (possibly self-touching) CCW contour by repeatedly
/// clipping the last ear found scanning backwards from the end.
///
/// A contour of 3 vertices is returned as-is and shorter ones produce
/// nothing; both checks run again after duplicate removal. Otherwise the
/// result has exactly `len - 2` triangles for the deduplicated length.
pub fn clip_ears(points: &[Coord<f64>], contour: &[VertexId], eps: f64) -> Result<Vec<Triangle>> {
    if let Some(tris) = trivial(contour) {
        return Ok(tris);
    }

    let mut ring = remove_duplicates(points, contour, eps);
    if let Some(tris) = trivial(&ring) {
        return Ok(tris);
    }
    if ring.len() != contour.len() {
        trace!(
            "removed {} duplicate vertices",
            contour.len() - ring.len()
        );
    }

    let eps2 = eps * eps;
    let n_tris = ring.len() - 2;
    let mut tris: Vec<Triangle> = Vec::with_capacity(n_tris);

    while tris.len() < n_tris {
        let n = ring.len();
        let ear = (0..n)
            .rev()
            .find(|&i| is_ear(points, &ring, i, eps2))
            .ok_or_else(|| {
                TriangulationError::InternalInconsistency(format!(
                    "no ear found in contour of {} remaining vertices",
                    n
                ))
            })?;

        tris.push([ring[(ear + n - 1) % n], ring[ear], ring[(ear + 1) % n]]);
        ring.remove(ear);
    }

    debug!("clipped {} ears", tris.len());
    Ok(tris)
}
