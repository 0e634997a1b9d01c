//! Triangulation of multi-contour polygons embedded in two or more
//! dimensions, with optional edge-flip optimization toward a locally
//! Delaunay result.

pub mod components;
pub mod ear_clip;
pub mod error;
pub mod graph;
pub mod interop;
pub mod merge;
pub mod optimizer;
pub mod plane;
pub mod predicates;
pub mod triangulator;
pub mod utils;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

/// Index into the caller's vertex table.
pub type VertexId = usize;
/// Cyclic sequence of vertex indices; the last vertex connects to the first.
pub type Contour = Vec<VertexId>;
/// Three vertex indices, CCW in the work plane.
pub type Triangle = [VertexId; 3];

pub use error::{Result, TriangulationError};
pub use optimizer::{optimize_triangulation, OptimizeReport};
pub use plane::WorkPlane;
pub use triangulator::{triangle_upper_bound, Triangulator};
