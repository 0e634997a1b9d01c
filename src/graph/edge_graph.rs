//! Directed-edge adjacency over a triangle list, stored as a flat arena
//! indexed by edge id.

use crate::error::{Result, TriangulationError};
use crate::{Triangle, VertexId};

/// Index into `EdgeGraph::directed_edges`.
pub type EdgeId = usize;

/// One side of a triangle edge, running `src -> dst` along the triangle's
/// CCW order.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectedEdge {
    pub src: VertexId,
    pub dst: VertexId,
    /// Slot of the owning triangle in the triangle array.
    pub triangle: usize,
    /// Position of this edge within its triangle: edge `k` runs from
    /// corner `k` to corner `k + 1`.
    pub local: usize,
    /// The reverse edge on the neighbouring triangle. `None` on the boundary.
    pub sym: Option<EdgeId>,
}

impl DirectedEdge {
    /// The direction kept in the heap for an internal edge.
    #[inline]
    pub fn is_canonical(&self) -> bool {
        self.src < self.dst
    }
}

/// Directed-edge adjacency over a triangle array.
///
/// Triangles keep their slots for the lifetime of the graph; flips rewrite
/// vertex indices and edge records in place.
#[derive(Clone, Debug)]
pub struct EdgeGraph {
    pub directed_edges: Vec<DirectedEdge>,
    /// `slots[t][k]` is the edge at local position `k` of triangle `t`.
    pub slots: Vec<[EdgeId; 3]>,
    /// Number of paired (undirected internal) edges.
    pub internal_edges: usize,
}

impl EdgeGraph {
    /// Creates three directed edges per triangle and pairs each with its
    /// reverse by sorting on `(src, dst)` and binary searching.
    pub fn build(tris: &[Triangle]) -> Result<Self> {
        let mut directed_edges = Vec::with_capacity(tris.len() * 3);
        let mut slots = Vec::with_capacity(tris.len());

        for (t, tri) in tris.iter().enumerate() {
            for local in 0..3 {
                directed_edges.push(DirectedEdge {
                    src: tri[local],
                    dst: tri[(local + 1) % 3],
                    triangle: t,
                    local,
                    sym: None,
                });
            }
            slots.push([3 * t, 3 * t + 1, 3 * t + 2]);
        }

        let mut order: Vec<EdgeId> = (0..directed_edges.len()).collect();
        let key = |de: &DirectedEdge| (de.src, de.dst);
        order.sort_unstable_by_key(|&e| key(&directed_edges[e]));

        if let Some(w) = order
            .windows(2)
            .find(|w| key(&directed_edges[w[0]]) == key(&directed_edges[w[1]]))
        {
            let de = &directed_edges[w[0]];
            return Err(TriangulationError::InternalInconsistency(format!(
                "directed edge {}->{} occurs in more than one triangle",
                de.src, de.dst
            )));
        }

        let mut internal_edges = 0;
        for &e in &order {
            let (src, dst) = key(&directed_edges[e]);
            if src >= dst {
                continue;
            }
            let found = order.binary_search_by_key(&(dst, src), |&f| key(&directed_edges[f]));
            if let Ok(pos) = found {
                let o = order[pos];
                directed_edges[e].sym = Some(o);
                directed_edges[o].sym = Some(e);
                internal_edges += 1;
            }
        }

        Ok(Self {
            directed_edges,
            slots,
            internal_edges,
        })
    }

    /// Ids of the canonical direction of every internal edge.
    pub fn canonical_internal_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.directed_edges
            .iter()
            .enumerate()
            .filter(|(_, de)| de.sym.is_some() && de.is_canonical())
            .map(|(e, _)| e)
    }

    /// The vertex of `e`'s triangle not on `e`.
    #[inline]
    pub fn apex(&self, tris: &[Triangle], e: EdgeId) -> VertexId {
        let de = &self.directed_edges[e];
        tris[de.triangle][(de.local + 2) % 3]
    }

    /// Replaces internal edge `e` with the other diagonal of the quad formed
    /// by its two triangles.
    ///
    /// With `e = a -> b` in triangle `(a, b, c)` and its reverse in
    /// `(b, a, d)`, the triangles become `(a, d, c)` and `(b, c, d)` in the
    /// same slots. `e` stays the canonical direction of the new diagonal.
    /// Returns the new diagonal followed by the four quad-perimeter edges.
    pub fn flip(&mut self, tris: &mut [Triangle], e: EdgeId) -> Result<[EdgeId; 5]> {
        let o = self.directed_edges[e].sym.ok_or_else(|| {
            TriangulationError::InternalInconsistency(format!("cannot flip boundary edge {}", e))
        })?;

        let (i, ii) = (self.directed_edges[e].triangle, self.directed_edges[e].local);
        let (j, jj) = (self.directed_edges[o].triangle, self.directed_edges[o].local);
        let (iip1, iip2) = ((ii + 1) % 3, (ii + 2) % 3);
        let (jjp1, jjp2) = ((jj + 1) % 3, (jj + 2) % 3);

        let i_iip1 = self.slots[i][iip1];
        let j_jjp1 = self.slots[j][jjp1];

        tris[i][iip1] = tris[j][jjp2];
        tris[j][jjp1] = tris[i][iip2];

        // The perimeter edges a->d and b->c change owner.
        self.slots[i][ii] = j_jjp1;
        self.set_owner(j_jjp1, i, ii);
        self.slots[j][jj] = i_iip1;
        self.set_owner(i_iip1, j, jj);

        // The new diagonal d-c; `e` takes whichever direction is canonical.
        if tris[i][iip1] < tris[j][jjp1] {
            self.slots[i][iip1] = e;
            self.slots[j][jjp1] = o;
        } else {
            self.slots[j][jjp1] = e;
            self.slots[i][iip1] = o;
        }
        let (di, dj) = (self.slots[i][iip1], self.slots[j][jjp1]);
        self.set_owner(di, i, iip1);
        self.directed_edges[di].src = tris[i][iip1];
        self.directed_edges[di].dst = tris[i][iip2];
        self.set_owner(dj, j, jjp1);
        self.directed_edges[dj].src = tris[j][jjp1];
        self.directed_edges[dj].dst = tris[j][jjp2];

        Ok([
            e,
            self.slots[i][iip2],
            self.slots[i][ii],
            self.slots[j][jjp2],
            self.slots[j][jj],
        ])
    }

    #[inline]
    fn set_owner(&mut self, e: EdgeId, triangle: usize, local: usize) {
        let de = &mut self.directed_edges[e];
        de.triangle = triangle;
        de.local = local;
    }

    /// Verifies that every edge record agrees with the triangle array and
    /// that pairing is mutual and reversed.
    pub fn check_consistency(&self, tris: &[Triangle]) -> Result<()> {
        let fail = |msg: String| Err(TriangulationError::InternalInconsistency(msg));

        if self.slots.len() != tris.len() {
            return fail(format!(
                "graph has {} triangle slots, array has {}",
                self.slots.len(),
                tris.len()
            ));
        }

        let mut paired = 0;
        for (t, tri) in tris.iter().enumerate() {
            for local in 0..3 {
                let e = self.slots[t][local];
                let de = &self.directed_edges[e];
                if de.triangle != t || de.local != local {
                    return fail(format!(
                        "edge {} is in slot ({}, {}) but records ({}, {})",
                        e, t, local, de.triangle, de.local
                    ));
                }
                if de.src != tri[local] || de.dst != tri[(local + 1) % 3] {
                    return fail(format!(
                        "edge {} runs {}->{} but triangle {} has {:?}",
                        e, de.src, de.dst, t, tri
                    ));
                }
                if let Some(o) = de.sym {
                    let od = &self.directed_edges[o];
                    if od.sym != Some(e) || od.src != de.dst || od.dst != de.src {
                        return fail(format!("edges {} and {} are not mutual reverses", e, o));
                    }
                    paired += 1;
                }
            }
        }

        if paired != 2 * self.internal_edges {
            return fail(format!(
                "{} paired directed edges for {} internal edges",
                paired, self.internal_edges
            ));
        }
        Ok(())
    }
}
