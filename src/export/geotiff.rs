use gdal::DriverManager;
use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use log::info;
use std::path::{Path, PathBuf};

use super::{ExportError, Exporter, validate_name};
use crate::raster::RasterProduct;

/// Writes each product as a single-band Float32 GeoTIFF with NaN no-data.
#[derive(Debug, Clone)]
pub struct GeoTiffExporter {
    output_directory: PathBuf,
    epsg: Option<u32>,
}

impl GeoTiffExporter {
    pub fn new<P: AsRef<Path>>(output_directory: P, epsg: Option<u32>) -> Self {
        Self {
            output_directory: output_directory.as_ref().to_path_buf(),
            epsg,
        }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.output_directory.join(format!("{}.tif", name))
    }
}

impl Exporter for GeoTiffExporter {
    fn export(&self, raster: &RasterProduct, scale: f64, name: &str) -> Result<(), ExportError> {
        validate_name(name)?;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ExportError::InvalidScale(scale));
        }

        let resampled;
        let raster = if raster.grid().pixel_width == scale && raster.grid().pixel_height == scale {
            raster
        } else {
            resampled = raster.resampled(scale);
            &resampled
        };

        std::fs::create_dir_all(&self.output_directory)?;
        let filename = self.path_for(name);
        let grid = raster.grid();

        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let mut dataset =
            driver.create_with_band_type::<f32, _>(&filename, grid.width, grid.height, 1)?;
        dataset.set_geo_transform(&grid.geo_transform())?;
        if let Some(epsg) = self.epsg {
            dataset.set_spatial_ref(&SpatialRef::from_epsg(epsg)?)?;
        }

        let mut band = dataset.rasterband(1)?;
        let mut buffer = Buffer::new((grid.width, grid.height), raster.values().to_vec());
        band.write((0, 0), (grid.width, grid.height), &mut buffer)?;
        band.set_no_data_value(Some(f64::NAN))?;

        info!("✓ Saved {} to: {}", name, filename.display());

        Ok(())
    }
}
