use gdal::errors::GdalError;
use gdal::vector::{Feature, Geometry};
use geo::{Area, BoundingRect, Contains, Intersects, MultiPolygon, Point, Polygon};
use log::{info, warn};
use std::collections::BTreeSet;

use crate::bbox::Bbox;

pub mod boundary;
pub use boundary::{BoundaryDataset, RegionError};

/// Analysis area: the merged polygons of the selected administrative units.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    shape: MultiPolygon<f64>,
}

fn polygons_of(geometry: geo::Geometry<f64>) -> Vec<Polygon<f64>> {
    match geometry {
        geo::Geometry::Polygon(polygon) => vec![polygon],
        geo::Geometry::MultiPolygon(multi) => multi.0,
        geo::Geometry::GeometryCollection(collection) => {
            collection.0.into_iter().flat_map(polygons_of).collect()
        }
        // Points and lines left over from clipping carry no area
        _ => Vec::new(),
    }
}

impl Region {
    pub fn new(polygons: Vec<Polygon<f64>>) -> Self {
        Self {
            shape: MultiPolygon::new(
                polygons
                    .into_iter()
                    .filter(|p| p.unsigned_area() > 0.0)
                    .collect(),
            ),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn from_bbox(bbox: &Bbox) -> Self {
        Self::new(vec![bbox.to_rect().to_polygon()])
    }

    /// Polygonal parts of an OGR geometry.
    pub fn from_gdal(geometry: &Geometry) -> Result<Self, GdalError> {
        if geometry.is_empty() {
            return Ok(Self::empty());
        }
        Ok(Self::new(polygons_of(geometry.to_geo()?)))
    }

    pub fn shape(&self) -> &MultiPolygon<f64> {
        &self.shape
    }

    pub fn polygons(&self) -> &[Polygon<f64>] {
        &self.shape.0
    }

    pub fn area(&self) -> f64 {
        self.shape.unsigned_area()
    }

    pub fn is_empty(&self) -> bool {
        self.shape.0.is_empty()
    }

    /// Strictly inside; points on the boundary are outside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.shape.contains(&Point::new(x, y))
    }

    pub fn envelope(&self) -> Option<Bbox> {
        self.shape.bounding_rect().map(Bbox::from)
    }

    pub fn intersects(&self, bbox: &Bbox) -> bool {
        !self.is_empty() && self.shape.intersects(&bbox.to_rect().to_polygon())
    }
}

/// Picks administrative units by name and merges them into a [`Region`].
#[derive(Debug, Clone)]
pub struct RegionSelector {
    admin1_field: String,
    admin1_name: String,
    admin2_field: String,
    admin2_names: BTreeSet<String>,
}

impl RegionSelector {
    pub fn new<I, S>(admin1_name: &str, admin2_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            admin1_field: "ADM1_NAME".to_string(),
            admin1_name: admin1_name.to_string(),
            admin2_field: "ADM2_NAME".to_string(),
            admin2_names: admin2_names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_fields(mut self, admin1_field: &str, admin2_field: &str) -> Self {
        self.admin1_field = admin1_field.to_string();
        self.admin2_field = admin2_field.to_string();
        self
    }

    fn matches(&self, feature: &Feature<'_>) -> Result<bool, GdalError> {
        let admin1 = feature.field_as_string(feature.field_index(&self.admin1_field)?)?;
        if admin1.as_deref() != Some(self.admin1_name.as_str()) {
            return Ok(false);
        }

        let admin2 = feature.field_as_string(feature.field_index(&self.admin2_field)?)?;
        Ok(admin2.is_some_and(|name| self.admin2_names.contains(&name)))
    }

    /// Unknown names select nothing and produce an empty region rather than
    /// an error. A field missing from the dataset schema is an error.
    pub fn select(&self, dataset: &BoundaryDataset, bounds: &Bbox) -> Result<Region, RegionError> {
        let matched = dataset.geometries_where(|feature| self.matches(feature))?;

        let mut merged: Option<Geometry> = None;
        for geometry in &matched {
            merged = Some(match merged {
                None => geometry.clone(),
                Some(acc) => acc.union(geometry).ok_or(RegionError::Geometry("merge"))?,
            });
        }

        let region = match merged {
            Some(geometry) => {
                let window = Geometry::bbox(bounds.xmin, bounds.ymin, bounds.xmax, bounds.ymax)?;
                let clipped = geometry
                    .intersection(&window)
                    .ok_or(RegionError::Geometry("clip"))?;
                Region::from_gdal(&clipped)?
            }
            None => Region::empty(),
        };

        if region.is_empty() {
            warn!(
                "No boundary features matched {}={:?} with {} in {:?} inside the bounds",
                self.admin1_field, self.admin1_name, self.admin2_field, self.admin2_names
            );
        } else {
            info!(
                "Selected {} boundary features ({} polygons, area {:.6})",
                matched.len(),
                region.polygons().len(),
                region.area()
            );
        }

        Ok(region)
    }
}
