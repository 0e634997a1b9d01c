//! Flat-arena adjacency and priority structures for edge flipping.

pub mod edge_graph;
pub mod heap;


pub use edge_graph::{DirectedEdge, EdgeGraph, EdgeId};
pub use heap::ComfortHeap;
