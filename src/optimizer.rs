//! Edge-flip optimization toward a locally Delaunay triangulation.
//!
//! Every internal edge sits in a min-heap keyed by its quad comfort. The
//! least comfortable edge is flipped until no comfort is below `-eps⁴`.

use geo_types::Coord;
use log::{debug, trace};

use crate::error::{Result, TriangulationError};
use crate::graph::{ComfortHeap, EdgeGraph, EdgeId};
use crate::plane::{check_vertices, WorkPlane};
use crate::predicates::quad_comfort;
use crate::Triangle;

/// Outcome of one optimizer run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OptimizeReport {
    /// Undirected edges shared by two triangles.
    pub internal_edges: usize,
    pub flips: usize,
}

/// Comfort of the quad around internal edge `e`, with `e`'s current
/// diagonal as the reference. Boundary edges have no quad.
pub(crate) fn edge_comfort(
    points: &[Coord<f64>],
    tris: &[Triangle],
    graph: &EdgeGraph,
    e: EdgeId,
) -> Option<f64> {
    let de = &graph.directed_edges[e];
    let sym = de.sym?;
    let apex = graph.apex(tris, e);
    let opposite_apex = graph.apex(tris, sym);
    Some(quad_comfort(
        points[de.dst],
        points[apex],
        points[de.src],
        points[opposite_apex],
    ))
}

/// Re-keys the heap-resident direction of `e`, if `e` is internal.
fn adjust_edge_or_sym(
    points: &[Coord<f64>],
    tris: &[Triangle],
    graph: &EdgeGraph,
    heap: &mut ComfortHeap,
    e: EdgeId,
) -> Result<()> {
    let de = &graph.directed_edges[e];
    let resident = match de.sym {
        None => return Ok(()),
        Some(_) if de.is_canonical() => e,
        Some(sym) => sym,
    };
    if let Some(comfort) = edge_comfort(points, tris, graph, resident) {
        heap.adjust(resident, comfort)?;
    }
    Ok(())
}

/// Flips internal edges of `tris` in place until the triangulation is
/// locally optimal.
///
/// `tris` must be a CCW triangulation of a planar region in `points`, with
/// no undirected edge shared by more than two triangles. Triangle slots
/// keep their identity; only their vertex indices change.
pub(crate) fn optimize_projected(
    points: &[Coord<f64>],
    tris: &mut [Triangle],
    eps: f64,
    debug_checks: bool,
) -> Result<OptimizeReport> {
    let mut graph = EdgeGraph::build(tris)?;
    let n_internal = graph.internal_edges;
    let mut heap = ComfortHeap::new(graph.directed_edges.len(), n_internal);

    let canonical: Vec<EdgeId> = graph.canonical_internal_edges().collect();
    for e in canonical {
        if let Some(comfort) = edge_comfort(points, tris, &graph, e) {
            heap.push(e, comfort);
        }
    }
    if debug_checks {
        graph.check_consistency(tris)?;
        heap.check_order()?;
    }

    let eps4 = eps * eps * eps * eps;
    let max_iters = n_internal * n_internal + 1;
    let mut flips = 0;

    for _ in 0..max_iters {
        let (e, comfort) = match heap.min() {
            Some(min) => min,
            None => break,
        };
        if -comfort <= eps4 {
            debug!(
                "optimizer converged after {} flips over {} internal edges",
                flips, n_internal
            );
            return Ok(OptimizeReport {
                internal_edges: n_internal,
                flips,
            });
        }

        trace!("flipping edge {} with comfort {}", e, comfort);
        let touched = graph.flip(tris, e)?;
        flips += 1;
        for &t in &touched {
            adjust_edge_or_sym(points, tris, &graph, &mut heap, t)?;
        }

        if debug_checks {
            graph.check_consistency(tris)?;
            heap.check_order()?;
        }
    }

    if heap.is_empty() {
        return Ok(OptimizeReport {
            internal_edges: n_internal,
            flips,
        });
    }
    Err(TriangulationError::InternalInconsistency(format!(
        "optimizer did not converge within {} iterations",
        max_iters
    )))
}

/// Optimizes an existing triangulation of `verts` in the given work plane.
///
/// Vertices must share one dimension and have finite coordinates. Triangles
/// must be CCW in `plane`; the output of
/// [`Triangulator::triangulate`](crate::Triangulator::triangulate) with the
/// same plane qualifies.
pub fn optimize_triangulation<V: AsRef<[f64]>>(
    verts: &[V],
    tris: &mut [Triangle],
    plane: WorkPlane,
    eps: f64,
    debug_checks: bool,
) -> Result<OptimizeReport> {
    if !eps.is_finite() || eps < 0.0 {
        return Err(TriangulationError::InvalidInput(format!(
            "eps must be finite and non-negative, got {}",
            eps
        )));
    }
    if !verts.is_empty() {
        plane.validate(check_vertices(verts)?)?;
    }
    if let Some(&bad) = tris.iter().flatten().find(|&&v| v >= verts.len()) {
        return Err(TriangulationError::InvalidInput(format!(
            "triangle references vertex {} but only {} vertices exist",
            bad,
            verts.len()
        )));
    }

    let points = plane.project_all(verts);
    optimize_projected(&points, tris, eps, debug_checks)
}

#[cfg(test)]
#[path = "optimizer_tests.rs"]
mod tests;
