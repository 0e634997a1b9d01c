//! Adapters between `geo-types` / GeoJSON polygons and the index-based
//! triangulation API.

use std::convert::TryInto;
use std::str::FromStr;

use geo::Winding;
use geo_types::{Coord, Geometry, LineString, MultiPolygon, Polygon};
use geojson::{Feature, FeatureCollection, GeoJson, Value};
use log::{debug, trace};

use crate::error::{Result, TriangulationError};
use crate::utils::parallel::try_map_ordered;
use crate::{Contour, Triangulator};

fn push_ring(ring: &LineString<f64>, ccw: bool, verts: &mut Vec<[f64; 2]>, contours: &mut Vec<Contour>) {
    let mut ring = ring.clone();
    if ccw {
        ring.make_ccw_winding();
    } else {
        ring.make_cw_winding();
    }

    let coords = &ring.0;
    let n = if coords.len() > 1 && ring.is_closed() {
        coords.len() - 1
    } else {
        coords.len()
    };
    let start = verts.len();
    verts.extend(coords[..n].iter().map(|c| [c.x, c.y]));
    contours.push((start..start + n).collect());
}

/// Flattens a polygon into a vertex table and contours: the exterior CCW
/// first, then each interior CW. Closing coordinates are dropped.
pub fn polygon_contours(polygon: &Polygon<f64>) -> (Vec<[f64; 2]>, Vec<Contour>) {
    let n_coords = polygon.exterior().0.len()
        + polygon.interiors().iter().map(|r| r.0.len()).sum::<usize>();
    let mut verts = Vec::with_capacity(n_coords);
    let mut contours = Vec::with_capacity(1 + polygon.interiors().len());

    push_ring(polygon.exterior(), true, &mut verts, &mut contours);
    for interior in polygon.interiors() {
        push_ring(interior, false, &mut verts, &mut contours);
    }
    (verts, contours)
}

fn to_coord(v: [f64; 2]) -> Coord<f64> {
    Coord { x: v[0], y: v[1] }
}

impl Triangulator {
    /// Triangulates a `geo-types` polygon, holes included.
    ///
    /// Any configured work plane is ignored; polygons are always planar in
    /// `(x, y)`.
    pub fn triangulate_polygon(&self, polygon: &Polygon<f64>) -> Result<Vec<geo_types::Triangle<f64>>> {
        let (verts, contours) = polygon_contours(polygon);
        let mut config = *self;
        config.work_plane = Some(Default::default());
        let tris = config.triangulate(&verts, &contours)?;
        Ok(tris
            .iter()
            .map(|t| {
                geo_types::Triangle::new(
                    to_coord(verts[t[0]]),
                    to_coord(verts[t[1]]),
                    to_coord(verts[t[2]]),
                )
            })
            .collect())
    }

    /// Triangulates every polygon of a multi-polygon, concatenating the
    /// results in polygon order.
    pub fn triangulate_multi_polygon(
        &self,
        multi: &MultiPolygon<f64>,
    ) -> Result<Vec<geo_types::Triangle<f64>>> {
        let per_polygon = try_map_ordered(&multi.0, |p| self.triangulate_polygon(p))?;
        Ok(per_polygon.into_iter().flatten().collect())
    }
}

fn collect_polygons(geometry: Geometry<f64>, out: &mut Vec<Polygon<f64>>) {
    match geometry {
        Geometry::Polygon(p) => out.push(p),
        Geometry::MultiPolygon(mp) => out.extend(mp.0),
        Geometry::GeometryCollection(gc) => {
            for g in gc.0 {
                collect_polygons(g, out);
            }
        }
        Geometry::Rect(r) => out.push(r.to_polygon()),
        Geometry::Triangle(t) => out.push(t.to_polygon()),
        _ => trace!("skipping non-areal geometry"),
    }
}

fn convert(geometry: geojson::Geometry, out: &mut Vec<Polygon<f64>>) -> Result<()> {
    let geom: Geometry<f64> = geometry
        .try_into()
        .map_err(|e: geojson::Error| TriangulationError::GeoJson(e.to_string()))?;
    collect_polygons(geom, out);
    Ok(())
}

/// Reads every areal geometry out of a GeoJSON document.
pub fn geojson_polygons(geojson_str: &str) -> Result<Vec<Polygon<f64>>> {
    let geojson = GeoJson::from_str(geojson_str)
        .map_err(|e| TriangulationError::GeoJson(format!("failed to parse GeoJSON: {}", e)))?;

    let mut polygons = Vec::new();
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in fc.features {
                if let Some(geom) = feature.geometry {
                    convert(geom, &mut polygons)?;
                }
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(geom) = feature.geometry {
                convert(geom, &mut polygons)?;
            }
        }
        GeoJson::Geometry(geometry) => convert(geometry, &mut polygons)?,
    }
    Ok(polygons)
}

/// Triangulates the polygons of a GeoJSON document, returning a
/// FeatureCollection with one triangular Polygon feature per triangle.
pub fn triangulate_geojson(triangulator: &Triangulator, geojson_str: &str) -> Result<String> {
    let polygons = geojson_polygons(geojson_str)?;
    let per_polygon = try_map_ordered(&polygons, |p| triangulator.triangulate_polygon(p))?;

    let features: Vec<Feature> = per_polygon
        .into_iter()
        .flatten()
        .map(|tri| {
            let geometry = geojson::Geometry::new(Value::from(&tri.to_polygon()));
            Feature {
                bbox: None,
                geometry: Some(geometry),
                id: None,
                properties: None,
                foreign_members: None,
            }
        })
        .collect();
    debug!(
        "triangulated {} polygons into {} triangles",
        polygons.len(),
        features.len()
    );

    let fc = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    Ok(fc.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;
    use geo_types::polygon;

    #[test]
    fn test_polygon_contours_orients_rings() {
        // Exterior given CW, hole given CCW; both get reversed.
        let poly = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 0.0, y: 4.0), (x: 4.0, y: 4.0), (x: 4.0, y: 0.0)],
            interiors: [[(x: 1.0, y: 1.0), (x: 2.0, y: 1.0), (x: 2.0, y: 2.0), (x: 1.0, y: 2.0)]],
        );
        let (verts, contours) = polygon_contours(&poly);
        assert_eq!(verts.len(), 8);
        assert_eq!(contours, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]);

        let pts: Vec<Coord<f64>> = verts.iter().map(|&v| to_coord(v)).collect();
        assert!(crate::predicates::twice_contour_area(&pts, &contours[0]) > 0.0);
        assert!(crate::predicates::twice_contour_area(&pts, &contours[1]) < 0.0);
    }

    #[test]
    fn test_triangulate_polygon_area() {
        let poly = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 4.0)],
            interiors: [[(x: 1.0, y: 1.0), (x: 1.0, y: 2.0), (x: 2.0, y: 2.0), (x: 2.0, y: 1.0)]],
        );
        let tris = Triangulator::new().triangulate_polygon(&poly).unwrap();
        // 4 + 4 + 2 vertices in the merged contour
        assert_eq!(tris.len(), 8);
        let area: f64 = tris.iter().map(|t| t.signed_area()).sum();
        assert!((area - 15.0).abs() < 1e-9);
        assert!(tris.iter().all(|t| t.signed_area() > 0.0));
    }

    #[test]
    fn test_triangulate_geojson_feature_collection() {
        let input = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0,0],[2,0],[2,2],[0,2],[0,0]]]
                }},
                {"type": "Feature", "properties": {}, "geometry": {
                    "type": "LineString",
                    "coordinates": [[0,0],[5,5]]
                }}
            ]
        }"#;
        let out = triangulate_geojson(&Triangulator::new(), input).unwrap();
        let parsed = GeoJson::from_str(&out).unwrap();
        match parsed {
            GeoJson::FeatureCollection(fc) => assert_eq!(fc.features.len(), 2),
            other => panic!("expected FeatureCollection, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_geojson_is_reported() {
        let err = triangulate_geojson(&Triangulator::new(), "{not json").unwrap_err();
        assert!(matches!(err, TriangulationError::GeoJson(_)));
    }
}
