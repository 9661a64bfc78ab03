use std::fmt;

use crate::raster::Grid;

pub trait DataReader {
    /// Reads band 1 as floats, with the band's no-data value replaced by NaN.
    fn read_f32(&self) -> Result<Data<f32>, ReadError>;

    /// Reads band 1 as raw 16-bit integers, e.g. a QA bitmask.
    fn read_u16(&self) -> Result<Data<u16>, ReadError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("Unsupported geotransform in {0}")]
    GeoTransform(String),
}

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("unknown raster file type")]
    UnknownFileType,
}

#[derive(Debug)]
pub struct Data<T> {
    pub grid: Grid,
    pub buffer: Vec<T>,
}

pub enum FileType {
    GeoTiff,
}

impl fmt::Display for Data<f32> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let valid = self.buffer.iter().filter(|&&x| !x.is_nan());

        let min_value = valid.clone().fold(f32::NAN, |a, &b| a.min(b));
        let max_value = valid.fold(f32::NAN, |a, &b| a.max(b));

        write!(
            f,
            "Width: {}\nHeight: {}\nBuffer Length: {}\nMin value: {}\nMax value: {}",
            self.grid.width,
            self.grid.height,
            self.buffer.len(),
            min_value,
            max_value,
        )
    }
}
