use crate::raster::RasterProduct;

pub mod geotiff;
pub use geotiff::GeoTiffExporter;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("invalid output name {0:?}")]
    InvalidName(String),

    #[error("invalid scale {0}")]
    InvalidScale(f64),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persists raster products. `scale` is the ground sample distance in the
/// raster's linear unit; `name` is the output base name. Writing a name twice
/// replaces the earlier output.
pub trait Exporter {
    fn export(&self, raster: &RasterProduct, scale: f64, name: &str) -> Result<(), ExportError>;
}

/// Names end up as file names, so separators and empty names are refused.
pub fn validate_name(name: &str) -> Result<(), ExportError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.chars().any(|c| matches!(c, '/' | '\\' | '\0'));

    if bad {
        return Err(ExportError::InvalidName(name.to_string()));
    }
    Ok(())
}
