use gdal::Dataset;
use gdal::errors::GdalError;
use gdal::vector::{Feature, Geometry, LayerAccess};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    #[error("GDAL error reading boundaries: {0}")]
    Gdal(#[from] GdalError),

    #[error("Could not {0} boundary geometries")]
    Geometry(&'static str),
}

/// Administrative boundaries in any OGR vector format, typically GeoJSON.
pub struct BoundaryDataset {
    dataset: Dataset,
}

impl BoundaryDataset {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RegionError> {
        Ok(Self {
            dataset: Dataset::open(path)?,
        })
    }

    /// Opens a GeoJSON document held in memory.
    pub fn from_geojson(text: &str) -> Result<Self, RegionError> {
        Self::from_file(text.trim())
    }

    pub fn feature_count(&self) -> u64 {
        self.dataset.layers().map(|layer| layer.feature_count()).sum()
    }

    /// Geometries of every feature `keep` accepts, across all layers.
    /// Features without a geometry are skipped.
    pub fn geometries_where<F>(&self, mut keep: F) -> Result<Vec<Geometry>, RegionError>
    where
        F: FnMut(&Feature<'_>) -> Result<bool, GdalError>,
    {
        let mut geometries = Vec::new();

        for mut layer in self.dataset.layers() {
            for feature in layer.features() {
                if !keep(&feature)? {
                    continue;
                }
                if let Some(geometry) = feature.geometry() {
                    geometries.push(geometry.clone());
                }
            }
        }

        Ok(geometries)
    }
}
