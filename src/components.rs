//! Grouping of contours into connected components via a containment forest.

use std::cmp::Ordering;

use geo_types::Coord;
use log::{debug, trace};
use smallvec::SmallVec;

use crate::error::{Result, TriangulationError};
use crate::predicates::{angle, contour_density};
use crate::{Contour, VertexId};

/// One outer contour and the hole contours it directly encloses.
///
/// Contours are referred to by their index in the caller's contour list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Component {
    pub outer: usize,
    pub holes: SmallVec<[usize; 4]>,
}

impl Component {
    pub fn single(outer: usize) -> Self {
        Self {
            outer,
            holes: SmallVec::new(),
        }
    }

    /// Contour indices with the outer contour first.
    pub fn contour_indices(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::once(self.outer).chain(self.holes.iter().copied())
    }
}

/// The leftmost vertex of a contour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeftmostVertex {
    /// Position within the contour (not the vertex id).
    pub position: usize,
    pub x: f64,
    /// Turn angle at the vertex from the outgoing edge to the incoming edge's reverse.
    pub angle: f64,
}

/// Finds the vertex of minimum x. Ties go to the vertex with the largest
/// angle between its outgoing edge and the reversed incoming edge, which
/// makes an enclosing contour win over a contour touching it from inside.
///
/// Returns `None` only for an empty contour.
pub fn leftmost_vertex(points: &[Coord<f64>], contour: &[VertexId]) -> Option<LeftmostVertex> {
    let n = contour.len();
    let mut best: Option<LeftmostVertex> = None;

    for i in 0..n {
        let v = points[contour[i]];
        if let Some(b) = best {
            if v.x > b.x {
                continue;
            }
        }
        let prev = points[contour[(i + n - 1) % n]];
        let next = points[contour[(i + 1) % n]];
        let this_angle = angle(v, next, v, prev);

        let replace = match best {
            None => true,
            Some(b) => v.x < b.x || this_angle > b.angle,
        };
        if replace {
            best = Some(LeftmostVertex {
                position: i,
                x: v.x,
                angle: this_angle,
            });
        }
    }

    best
}

/// Orders contours so that an enclosing contour always comes before any
/// contour it encloses: by leftmost x, then by descending angle there.
fn containment_order(leftmost: &[LeftmostVertex]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..leftmost.len()).collect();
    order.sort_by(|&i, &j| {
        let a = &leftmost[i];
        let b = &leftmost[j];
        a.x.partial_cmp(&b.x)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.angle.partial_cmp(&a.angle).unwrap_or(Ordering::Equal))
    });
    order
}

/// First-child / next-sibling containment forest over sorted positions.
/// Position 0 is the root; top-level contours are the root's siblings.
struct ContainmentForest {
    first_child: Vec<Option<usize>>,
    next_sibling: Vec<Option<usize>>,
}

impl ContainmentForest {
    fn build(
        points: &[Coord<f64>],
        contours: &[Contour],
        order: &[usize],
        eps: f64,
    ) -> Result<Self> {
        let n = order.len();
        let mut forest = ContainmentForest {
            first_child: vec![None; n],
            next_sibling: vec![None; n],
        };

        for pos in 1..n {
            let contour = &contours[order[pos]];
            let mut node = 0;
            loop {
                let node_contour = &contours[order[node]];
                let density = solid_density(points, node_contour, contour, eps)?;

                let slot = if density != 0 {
                    &mut forest.first_child[node]
                } else {
                    &mut forest.next_sibling[node]
                };
                match *slot {
                    Some(next) => node = next,
                    None => {
                        *slot = Some(pos);
                        break;
                    }
                }
            }
        }

        Ok(forest)
    }

    /// +1 for outer (even depth), -1 for inner (odd depth), per sorted position.
    /// Parents and earlier siblings always precede a node, so one forward pass suffices.
    fn directions(&self) -> Vec<i8> {
        let n = self.first_child.len();
        let mut dirs = vec![0i8; n];
        if n == 0 {
            return dirs;
        }
        dirs[0] = 1;
        for pos in 0..n {
            let dir = dirs[pos];
            debug_assert!(dir != 0);
            if let Some(child) = self.first_child[pos] {
                dirs[child] = -dir;
            }
            if let Some(sibling) = self.next_sibling[pos] {
                dirs[sibling] = dir;
            }
        }
        dirs
    }

    fn children(&self, pos: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.first_child[pos], move |&c| self.next_sibling[c])
    }
}

/// Density of `node_contour` at the first vertex of `contour` that is not on
/// its boundary. Only 0 (outside) or ±2 (inside) are accepted.
fn solid_density(
    points: &[Coord<f64>],
    node_contour: &[VertexId],
    contour: &[VertexId],
    eps: f64,
) -> Result<i32> {
    let density = contour
        .iter()
        .map(|&v| contour_density(points, node_contour, points[v], eps))
        .find(|d| d & 1 == 0)
        .ok_or_else(|| {
            TriangulationError::InternalInconsistency(
                "every vertex of a contour lies on the boundary of another contour".to_string(),
            )
        })?;

    if !matches!(density, 0 | 2 | -2) {
        return Err(TriangulationError::InternalInconsistency(format!(
            "ambiguous containment density {}",
            density
        )));
    }
    Ok(density)
}

/// Splits contours into connected components.
///
/// Contours at even depth in the containment forest are outer contours and
/// start a component; their direct children are that component's holes.
/// Anything nested deeper starts a component of its own, so islands inside
/// holes are kept.
///
/// Components come out in containment order (leftmost first).
pub fn group_components(
    points: &[Coord<f64>],
    contours: &[Contour],
    eps: f64,
) -> Result<Vec<Component>> {
    match contours.len() {
        0 => return Ok(Vec::new()),
        1 => return Ok(vec![Component::single(0)]),
        _ => {}
    }

    let leftmost = contours
        .iter()
        .enumerate()
        .map(|(i, c)| {
            leftmost_vertex(points, c).ok_or_else(|| {
                TriangulationError::InvalidInput(format!("contour {} is empty", i))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let order = containment_order(&leftmost);
    let forest = ContainmentForest::build(points, contours, &order, eps)?;
    let dirs = forest.directions();

    let components: Vec<Component> = (0..order.len())
        .filter(|&pos| dirs[pos] == 1)
        .map(|pos| Component {
            outer: order[pos],
            holes: forest.children(pos).map(|c| order[c]).collect(),
        })
        .collect();

    for c in &components {
        trace!("component: outer {} holes {:?}", c.outer, c.holes);
    }
    debug!(
        "grouped {} contours into {} components",
        contours.len(),
        components.len()
    );

    Ok(components)
}
