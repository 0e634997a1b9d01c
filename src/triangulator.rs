//! Top-level configuration and the triangulation pipeline.

use geo_types::Coord;
use log::debug;

use crate::components::{group_components, Component};
use crate::ear_clip::clip_ears;
use crate::error::{Result, TriangulationError};
use crate::merge::merge_component;
use crate::optimizer::optimize_projected;
use crate::plane::{check_contours, check_vertices, WorkPlane};
use crate::utils::parallel::try_map_ordered;
use crate::{Contour, Triangle};

/// Largest number of triangles `components` can produce: `len - 2` per
/// outer contour plus `len + 2` per hole.
pub fn triangle_upper_bound(contours: &[Contour], components: &[Component]) -> usize {
    components
        .iter()
        .map(|c| {
            let outer = contours[c.outer].len().saturating_sub(2);
            let holes: usize = c.holes.iter().map(|&h| contours[h].len() + 2).sum();
            outer + holes
        })
        .sum()
}

/// Triangulates polygons given as contours over a shared vertex table.
///
/// Outer contours are expected CCW and holes CW in the work plane; every
/// output triangle is CCW in that plane.
///
/// # Example
///
/// ```
/// use geo_triangulate::Triangulator;
///
/// let verts = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
/// let tris = Triangulator::new()
///     .with_optimize(true)
///     .triangulate(&verts, &[vec![0, 1, 2, 3]])
///     .unwrap();
/// assert_eq!(tris.len(), 2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangulator {
    /// Coordinate-scale tolerance. Areas compare against `eps²` and
    /// in-circle values against `eps⁴`.
    pub eps: f64,
    /// Run the edge-flip optimizer on each component's triangles.
    pub optimize: bool,
    /// Verify adjacency and heap invariants after every flip.
    pub debug_checks: bool,
    /// Fixed axis pair; `None` selects the plane of largest area.
    pub work_plane: Option<WorkPlane>,
}

impl Default for Triangulator {
    fn default() -> Self {
        Self {
            eps: 1e-10,
            optimize: false,
            debug_checks: false,
            work_plane: None,
        }
    }
}

impl Triangulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn with_debug_checks(mut self, debug_checks: bool) -> Self {
        self.debug_checks = debug_checks;
        self
    }

    pub fn with_work_plane(mut self, plane: WorkPlane) -> Self {
        self.work_plane = Some(plane);
        self
    }

    fn check_eps(&self) -> Result<()> {
        if !self.eps.is_finite() || self.eps < 0.0 {
            return Err(TriangulationError::InvalidInput(format!(
                "eps must be finite and non-negative, got {}",
                self.eps
            )));
        }
        Ok(())
    }

    /// Checks vertex dimensions, coordinates and contour indices, returning
    /// the dimension.
    fn check_input<V: AsRef<[f64]>>(&self, verts: &[V], contours: &[Contour]) -> Result<usize> {
        let dimension = check_vertices(verts)?;
        check_contours(contours, verts.len())?;
        Ok(dimension)
    }

    fn plane_for<V: AsRef<[f64]>>(
        &self,
        verts: &[V],
        contours: &[Contour],
        dimension: usize,
    ) -> Result<WorkPlane> {
        match self.work_plane {
            Some(plane) => {
                plane.validate(dimension)?;
                Ok(plane)
            }
            None => WorkPlane::select(verts, contours),
        }
    }

    fn triangulate_contour(&self, points: &[Coord<f64>], contour: &[usize]) -> Result<Vec<Triangle>> {
        let mut tris = clip_ears(points, contour, self.eps)?;
        if self.optimize {
            optimize_projected(points, &mut tris, self.eps, self.debug_checks)?;
        }
        Ok(tris)
    }

    /// Triangulates one polygon of any number of contours.
    ///
    /// Contours may be listed in any order; nesting is recovered
    /// geometrically. Each nested level alternates between outer contour
    /// and hole, and every outer contour with its direct holes is
    /// triangulated independently. A hole of a single vertex is a Steiner
    /// point.
    pub fn triangulate<V: AsRef<[f64]>>(
        &self,
        verts: &[V],
        contours: &[Contour],
    ) -> Result<Vec<Triangle>> {
        self.check_eps()?;
        if contours.is_empty() || verts.is_empty() {
            return Ok(Vec::new());
        }
        let dimension = self.check_input(verts, contours)?;

        if let [contour] = contours {
            match contour.len() {
                0..=2 => return Ok(Vec::new()),
                3 => return Ok(vec![[contour[0], contour[1], contour[2]]]),
                _ => {}
            }
        }

        let plane = self.plane_for(verts, contours, dimension)?;
        let points = plane.project_all(verts);

        if let [contour] = contours {
            let tris = self.triangulate_contour(&points, contour)?;
            debug!("triangulated single contour into {} triangles", tris.len());
            return Ok(tris);
        }

        let components = group_components(&points, contours, self.eps)?;
        let bound = triangle_upper_bound(contours, &components);

        let per_component = try_map_ordered(&components, |component| {
            let merged = merge_component(&points, contours, component, self.eps)?;
            self.triangulate_contour(&points, &merged)
        })?;

        let mut tris = Vec::with_capacity(bound);
        for component_tris in per_component {
            tris.extend(component_tris);
        }
        debug!(
            "triangulated {} contours in {} components into {} triangles (bound {})",
            contours.len(),
            components.len(),
            tris.len(),
            bound
        );
        Ok(tris)
    }

    /// Groups contours into components and merges each component's holes
    /// into its outer contour, without triangulating.
    ///
    /// Returns one simple (possibly self-touching) contour per component.
    pub fn simplify<V: AsRef<[f64]>>(&self, verts: &[V], contours: &[Contour]) -> Result<Vec<Contour>> {
        self.check_eps()?;
        if contours.is_empty() || verts.is_empty() {
            return Ok(Vec::new());
        }
        let dimension = self.check_input(verts, contours)?;
        if contours.len() == 1 {
            return Ok(contours.to_vec());
        }

        let plane = self.plane_for(verts, contours, dimension)?;
        let points = plane.project_all(verts);
        let components = group_components(&points, contours, self.eps)?;
        try_map_ordered(&components, |component| {
            merge_component(&points, contours, component, self.eps)
        })
    }
}

#[cfg(test)]
#[path = "triangulator_tests.rs"]
mod tests;
