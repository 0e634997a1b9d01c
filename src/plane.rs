//! Work-plane selection and projection of N-dimensional vertices, plus the
//! vertex-table checks every public entry point runs before projecting.

use geo_types::Coord;
use log::debug;

use crate::error::{Result, TriangulationError};
use crate::predicates::twice_signed_area;
use crate::Contour;

/// Checks that all vertices have the same number of coordinates, at least
/// two, and that every coordinate is finite. Returns the dimension.
pub(crate) fn check_vertices<V: AsRef<[f64]>>(verts: &[V]) -> Result<usize> {
    let dimension = verts.first().map(|v| v.as_ref().len()).unwrap_or(0);
    if dimension < 2 {
        return Err(TriangulationError::InvalidInput(format!(
            "vertices need at least 2 coordinates, got {}",
            dimension
        )));
    }
    for (i, v) in verts.iter().enumerate() {
        let v = v.as_ref();
        if v.len() != dimension {
            return Err(TriangulationError::InvalidInput(format!(
                "vertex {} has {} coordinates, expected {}",
                i,
                v.len(),
                dimension
            )));
        }
        if let Some(c) = v.iter().find(|c| !c.is_finite()) {
            return Err(TriangulationError::InvalidInput(format!(
                "vertex {} has non-finite coordinate {}",
                i, c
            )));
        }
    }
    Ok(dimension)
}

/// Checks that every contour index refers to an existing vertex.
pub(crate) fn check_contours(contours: &[Contour], n_verts: usize) -> Result<()> {
    for (ci, contour) in contours.iter().enumerate() {
        if let Some(&bad) = contour.iter().find(|&&v| v >= n_verts) {
            return Err(TriangulationError::InvalidInput(format!(
                "contour {} references vertex {} but only {} vertices exist",
                ci, bad, n_verts
            )));
        }
    }
    Ok(())
}

/// The pair of coordinate axes all 2-D computations are done in.
///
/// Every orientation, area and in-circle test in the crate reads only these
/// two coordinates of each vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorkPlane {
    pub x_axis: usize,
    pub y_axis: usize,
}

impl Default for WorkPlane {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl WorkPlane {
    pub fn new(x_axis: usize, y_axis: usize) -> Self {
        Self { x_axis, y_axis }
    }

    /// The same plane with the axes exchanged, which flips every orientation.
    pub fn swapped(self) -> Self {
        Self::new(self.y_axis, self.x_axis)
    }

    #[inline]
    pub fn project<V: AsRef<[f64]>>(&self, vertex: &V) -> Coord<f64> {
        let v = vertex.as_ref();
        Coord {
            x: v[self.x_axis],
            y: v[self.y_axis],
        }
    }

    /// Projects the whole vertex table. Indices are preserved.
    pub fn project_all<V: AsRef<[f64]>>(&self, verts: &[V]) -> Vec<Coord<f64>> {
        verts.iter().map(|v| self.project(v)).collect()
    }

    /// Fails unless both axes exist in `dimension` and differ.
    pub fn validate(&self, dimension: usize) -> Result<()> {
        if self.x_axis == self.y_axis {
            return Err(TriangulationError::InvalidInput(format!(
                "work plane axes must differ, both are {}",
                self.x_axis
            )));
        }
        if self.x_axis >= dimension || self.y_axis >= dimension {
            return Err(TriangulationError::InvalidInput(format!(
                "work plane axes ({}, {}) out of range for {}-dimensional vertices",
                self.x_axis, self.y_axis, dimension
            )));
        }
        Ok(())
    }

    /// Twice the signed area of the whole polygon in this plane.
    pub fn twice_polygon_area<V: AsRef<[f64]>>(&self, verts: &[V], contours: &[Contour]) -> f64 {
        let mut sum = 0.0;
        for contour in contours {
            if contour.len() < 3 {
                continue;
            }
            let v0 = self.project(&verts[contour[0]]);
            let mut v1 = self.project(&verts[contour[1]]);
            for &idx in &contour[2..] {
                let v2 = self.project(&verts[idx]);
                sum += twice_signed_area(v0, v1, v2);
                v1 = v2;
            }
        }
        sum
    }

    /// Picks the axis pair in which the polygon's area has the largest
    /// magnitude, ordered so that area is positive.
    ///
    /// Fully degenerate input (zero area in every plane) keeps the first pair
    /// examined, `(0, 1)`. Malformed vertices or contour indices are
    /// `InvalidInput`.
    pub fn select<V: AsRef<[f64]>>(verts: &[V], contours: &[Contour]) -> Result<Self> {
        check_contours(contours, verts.len())?;
        if verts.is_empty() {
            return Ok(WorkPlane::default());
        }
        let n_axes = check_vertices(verts)?;

        let mut best: Option<(WorkPlane, f64)> = None;
        for y_axis in 0..n_axes {
            for x_axis in 0..y_axis {
                let plane = WorkPlane::new(x_axis, y_axis);
                let area = plane.twice_polygon_area(verts, contours);
                let better = match best {
                    None => true,
                    Some((_, best_area)) => area.abs() > best_area.abs(),
                };
                if better {
                    best = Some((plane, area));
                }
            }
        }

        // n_axes >= 2 guarantees at least one pair was examined.
        let (plane, area) = best.unwrap_or((WorkPlane::default(), 0.0));
        let plane = if area < 0.0 { plane.swapped() } else { plane };
        debug!(
            "selected work plane ({}, {}) with twice-area {}",
            plane.x_axis,
            plane.y_axis,
            area.abs()
        );
        Ok(plane)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_select_ccw_square_keeps_xy() {
        let verts = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let plane = WorkPlane::select(&verts, &[vec![0, 1, 2, 3]]).unwrap();
        assert_eq!(plane, WorkPlane::new(0, 1));
    }

    #[test]
    fn test_select_cw_square_swaps_axes() {
        let verts = vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];
        let contours = vec![vec![0, 1, 2, 3]];
        let plane = WorkPlane::select(&verts, &contours).unwrap();
        assert_eq!(plane, WorkPlane::new(1, 0));
        assert!(plane.twice_polygon_area(&verts, &contours) > 0.0);
    }

    #[test]
    fn test_select_3d_picks_largest_projection() {
        // Square in the plane x = 5, spanning y and z.
        let verts = vec![
            [5.0, 0.0, 0.0],
            [5.0, 2.0, 0.0],
            [5.0, 2.0, 2.0],
            [5.0, 0.0, 2.0],
        ];
        let contours = vec![vec![0, 1, 2, 3]];
        let plane = WorkPlane::select(&verts, &contours).unwrap();
        assert_eq!(plane, WorkPlane::new(1, 2));
        assert_relative_eq!(plane.twice_polygon_area(&verts, &contours), 8.0);
    }

    #[test]
    fn test_select_not_fooled_by_bounding_box() {
        // Bounding box is largest in xy, but the quad is a vertical strip there.
        let verts = vec![
            [4.0, 0.0, 0.0],
            [0.0, 4.0, 0.0],
            [0.0, 4.0, 2.0],
            [4.0, 0.0, 2.0],
        ];
        let contours = vec![vec![0, 1, 2, 3]];
        let plane = WorkPlane::select(&verts, &contours).unwrap();
        assert_ne!((plane.x_axis.min(plane.y_axis), plane.x_axis.max(plane.y_axis)), (0, 1));
        assert!(plane.twice_polygon_area(&verts, &contours) > 0.0);
    }

    #[test]
    fn test_select_rejects_one_dimensional_vertices() {
        let verts = vec![vec![0.0], vec![1.0]];
        let err = WorkPlane::select(&verts, &[vec![0, 1]]).unwrap_err();
        assert!(matches!(err, TriangulationError::InvalidInput(_)));
    }

    #[test]
    fn test_select_rejects_malformed_input() {
        let verts = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let err = WorkPlane::select(&verts, &[vec![0, 1, 9]]).unwrap_err();
        assert!(matches!(err, TriangulationError::InvalidInput(_)));

        let ragged = vec![vec![0.0, 0.0], vec![1.0, 0.0, 0.0], vec![0.0]];
        let err = WorkPlane::select(&ragged, &[vec![0, 1, 2]]).unwrap_err();
        assert!(matches!(err, TriangulationError::InvalidInput(_)));

        let with_nan = vec![[0.0, 0.0], [f64::NAN, 0.0], [0.0, 1.0]];
        let err = WorkPlane::select(&with_nan, &[vec![0, 1, 2]]).unwrap_err();
        assert!(matches!(err, TriangulationError::InvalidInput(_)));
    }

    #[test]
    fn test_check_vertices() {
        assert_eq!(check_vertices(&[[0.0, 0.0, 1.0], [1.0, 2.0, 3.0]]).unwrap(), 3);
        let empty: [[f64; 2]; 0] = [];
        assert!(check_vertices(&empty).is_err());
        assert!(check_vertices(&[[0.0, f64::INFINITY]]).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(WorkPlane::new(0, 1).validate(2).is_ok());
        assert!(WorkPlane::new(1, 1).validate(3).is_err());
        assert!(WorkPlane::new(0, 2).validate(2).is_err());
    }
}
