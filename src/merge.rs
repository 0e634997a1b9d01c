//! Merging a component's holes into its outer contour with out-and-back
//! bridge edges, producing one simple (self-touching) contour.

use geo::Line;
use geo_types::Coord;
use log::{debug, trace};
use rstar::{RTree, RTreeObject, AABB};

use crate::components::{leftmost_vertex, Component};
use crate::error::{Result, TriangulationError};
use crate::predicates::{segments_cross, twice_signed_area};
use crate::{Contour, VertexId};

// Wrapper for a contour edge to be indexable by rstar
#[derive(Clone, Copy, Debug)]
struct IndexedLine {
    line: Line<f64>,
    index: usize,
}

impl RTreeObject for IndexedLine {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let p1 = self.line.start;
        let p2 = self.line.end;
        AABB::from_corners(
            [p1.x.min(p2.x), p1.y.min(p2.y)],
            [p1.x.max(p2.x), p1.y.max(p2.y)],
        )
    }
}

/// Edge index of the contour currently being grown.
///
/// A proper crossing implies overlapping (closed) bounding boxes, so the
/// tree only prunes edges that `segments_cross` would reject anyway.
struct EdgeIndex {
    tree: RTree<IndexedLine>,
}

impl EdgeIndex {
    fn build(points: &[Coord<f64>], contour: &[VertexId]) -> Self {
        let n = contour.len();
        let lines = (0..n)
            .map(|i| IndexedLine {
                line: Line::new(points[contour[i]], points[contour[(i + 1) % n]]),
                index: i,
            })
            .collect();
        Self {
            tree: RTree::bulk_load(lines),
        }
    }

    fn is_blocked(&self, from: Coord<f64>, to: Coord<f64>, eps: f64) -> bool {
        let query = AABB::from_corners(
            [from.x.min(to.x), from.y.min(to.y)],
            [from.x.max(to.x), from.y.max(to.y)],
        );
        match self
            .tree
            .locate_in_envelope_intersecting(&query)
            .find(|edge| segments_cross(edge.line.start, edge.line.end, from, to, eps))
        {
            Some(edge) => {
                trace!("bridge candidate blocked by contour edge {}", edge.index);
                true
            }
            None => false,
        }
    }
}

/// Finds the first position on `outer` whose vertex can be joined to `inner`
/// by a bridge edge: strictly left of it, facing it, and with the bridge
/// crossing no edge of `outer`.
fn find_bridge(
    points: &[Coord<f64>],
    outer: &[VertexId],
    inner: Coord<f64>,
    eps: f64,
) -> Option<usize> {
    let eps2 = eps * eps;
    let n = outer.len();
    let edges = EdgeIndex::build(points, outer);

    (0..n).find(|&i| {
        let v = points[outer[i]];
        if v.x >= inner.x {
            return false;
        }

        let pre = points[outer[(i + n - 1) % n]];
        let post = points[outer[(i + 1) % n]];
        let inner_left_of_incoming = twice_signed_area(pre, v, inner) > eps2;
        let inner_left_of_outgoing = twice_signed_area(v, post, inner) > eps2;

        let facing = if twice_signed_area(pre, v, post) >= 0.0 {
            // Convex corner: the bridge must leave into the wedge between both edges.
            inner_left_of_incoming && inner_left_of_outgoing
        } else {
            // Reflex corner: being solidly inside one half-plane is enough.
            inner_left_of_incoming || inner_left_of_outgoing
        };

        facing && !edges.is_blocked(inner, v, eps)
    })
}

/// Splices `inner` into `outer` by walking out from `outer[outer_pos]` to
/// `inner[inner_pos]`, around `inner`, and back. Both bridge vertices are
/// repeated, so the result holds `outer.len() + inner.len() + 2` entries.
pub fn splice_contours(
    result: &mut Vec<VertexId>,
    outer: &[VertexId],
    outer_pos: usize,
    inner: &[VertexId],
    inner_pos: usize,
) {
    result.clear();
    result.extend_from_slice(&outer[outer_pos..]);
    result.extend_from_slice(&outer[..=outer_pos]);
    result.extend_from_slice(&inner[inner_pos..]);
    result.extend_from_slice(&inner[..=inner_pos]);
}

/// Length of the merged contour for a component.
pub fn merged_length(contours: &[Contour], component: &Component) -> usize {
    component
        .contour_indices()
        .map(|i| contours[i].len())
        .sum::<usize>()
        + 2 * component.holes.len()
}

/// Merges a component into a single contour. Holes are bridged in the
/// order they appear in `component.holes`, each against the contour built
/// so far.
pub fn merge_component(
    points: &[Coord<f64>],
    contours: &[Contour],
    component: &Component,
    eps: f64,
) -> Result<Contour> {
    let outer = &contours[component.outer];
    if component.holes.is_empty() {
        return Ok(outer.clone());
    }

    let total = merged_length(contours, component);
    let mut merged: Vec<VertexId> = Vec::with_capacity(total);
    let mut scratch: Vec<VertexId> = Vec::with_capacity(total);
    merged.extend_from_slice(outer);

    for &hole_idx in &component.holes {
        let hole = &contours[hole_idx];
        let inner = leftmost_vertex(points, hole).ok_or_else(|| {
            TriangulationError::InvalidInput(format!("contour {} is empty", hole_idx))
        })?;
        let inner_vertex = points[hole[inner.position]];

        let outer_pos = find_bridge(points, &merged, inner_vertex, eps).ok_or_else(|| {
            TriangulationError::InternalInconsistency(format!(
                "no visible bridge vertex for hole contour {}",
                hole_idx
            ))
        })?;
        trace!(
            "bridging hole {} at vertex {} to outer vertex {}",
            hole_idx,
            hole[inner.position],
            merged[outer_pos]
        );

        splice_contours(&mut scratch, &merged, outer_pos, hole, inner.position);
        std::mem::swap(&mut merged, &mut scratch);
    }

    if merged.len() != total {
        return Err(TriangulationError::InternalInconsistency(format!(
            "merged contour has length {}, expected {}",
            merged.len(),
            total
        )));
    }
    debug!(
        "merged {} holes into contour of length {}",
        component.holes.len(),
        merged.len()
    );

    Ok(merged)
}
