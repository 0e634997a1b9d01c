//! Indexed binary min-heap of edge comfort values.

use crate::error::{Result, TriangulationError};
use crate::graph::EdgeId;

/// Binary min-heap of edge ids keyed by comfort, with O(log n) adjustment
/// of any resident edge's value.
///
/// Each resident edge records its own position in the heap array, so an
/// adjusted edge can be sifted from where it is.
#[derive(Clone, Debug)]
pub struct ComfortHeap {
    /// Heap array of edge ids, root at 0.
    nodes: Vec<EdgeId>,
    /// Current value per edge id.
    values: Vec<f64>,
    /// Position in `nodes` per edge id, `None` if not resident.
    index_in_heap: Vec<Option<usize>>,
}

impl ComfortHeap {
    /// An empty heap able to hold ids below `n_edges`, with room for
    /// `capacity` residents.
    pub fn new(n_edges: usize, capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            values: vec![0.0; n_edges],
            index_in_heap: vec![None; n_edges],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn contains(&self, edge: EdgeId) -> bool {
        self.index_in_heap[edge].is_some()
    }

    #[inline]
    pub fn value(&self, edge: EdgeId) -> f64 {
        self.values[edge]
    }

    /// The resident edge with the smallest value.
    pub fn min(&self) -> Option<(EdgeId, f64)> {
        self.nodes.first().map(|&e| (e, self.values[e]))
    }

    pub fn push(&mut self, edge: EdgeId, value: f64) {
        let pos = self.nodes.len();
        self.nodes.push(edge);
        self.values[edge] = value;
        self.index_in_heap[edge] = Some(pos);
        self.sift_up(pos);
    }

    /// Changes the value of a resident edge and restores heap order.
    pub fn adjust(&mut self, edge: EdgeId, value: f64) -> Result<()> {
        let pos = self.index_in_heap[edge].ok_or_else(|| {
            TriangulationError::InternalInconsistency(format!("edge {} is not in the heap", edge))
        })?;
        self.values[edge] = value;
        if pos > 0 && value < self.values[self.nodes[(pos - 1) / 2]] {
            self.sift_up(pos);
        } else {
            self.sift_down(pos);
        }
        Ok(())
    }

    #[inline]
    fn place(&mut self, pos: usize, edge: EdgeId) {
        self.nodes[pos] = edge;
        self.index_in_heap[edge] = Some(pos);
    }

    fn sift_up(&mut self, mut pos: usize) {
        let edge = self.nodes[pos];
        let value = self.values[edge];
        while pos > 0 {
            let parent = (pos - 1) / 2;
            let parent_edge = self.nodes[parent];
            if self.values[parent_edge] <= value {
                break;
            }
            self.place(pos, parent_edge);
            pos = parent;
        }
        self.place(pos, edge);
    }

    fn sift_down(&mut self, mut pos: usize) {
        let edge = self.nodes[pos];
        let value = self.values[edge];
        let len = self.nodes.len();
        loop {
            let mut child = 2 * pos + 1;
            if child >= len {
                break;
            }
            if child + 1 < len && self.values[self.nodes[child + 1]] < self.values[self.nodes[child]] {
                child += 1;
            }
            let child_edge = self.nodes[child];
            if value <= self.values[child_edge] {
                break;
            }
            self.place(pos, child_edge);
            pos = child;
        }
        self.place(pos, edge);
    }

    /// Full scan of heap order and the position back-references.
    pub fn check_order(&self) -> Result<()> {
        for (pos, &edge) in self.nodes.iter().enumerate() {
            if self.index_in_heap[edge] != Some(pos) {
                return Err(TriangulationError::InternalInconsistency(format!(
                    "edge {} at heap position {} records {:?}",
                    edge, pos, self.index_in_heap[edge]
                )));
            }
            if pos > 0 {
                let parent_edge = self.nodes[(pos - 1) / 2];
                if self.values[parent_edge] > self.values[edge] {
                    return Err(TriangulationError::InternalInconsistency(format!(
                        "heap order broken between edges {} ({}) and {} ({})",
                        parent_edge, self.values[parent_edge], edge, self.values[edge]
                    )));
                }
            }
        }
        Ok(())
    }
}
