use gdal::Dataset;
use gdal::raster::GdalType;
use std::path::PathBuf;

use super::{Data, DataReader, ReadError};
use crate::raster::Grid;

pub struct GeoTiffReader {
    pub file_name: PathBuf,
}

impl GeoTiffReader {
    fn read_band<T: GdalType + Copy>(&self) -> Result<(Data<T>, Option<f64>), ReadError> {
        let dataset = Dataset::open(&self.file_name)?;
        let (width, height) = dataset.raster_size();

        let geotransform = dataset.geo_transform()?;
        let grid = Grid::from_geo_transform(geotransform, width, height)
            .ok_or_else(|| ReadError::GeoTransform(self.file_name.display().to_string()))?;

        let band = dataset.rasterband(1)?;
        let buffer = band.read_as::<T>((0, 0), (width, height), (width, height), None)?;

        Ok((
            Data {
                grid,
                buffer: buffer.data().to_vec(),
            },
            band.no_data_value(),
        ))
    }
}

impl DataReader for GeoTiffReader {
    fn read_f32(&self) -> Result<Data<f32>, ReadError> {
        let (mut data, no_data) = self.read_band::<f32>()?;

        if let Some(nd) = no_data {
            let nd = nd as f32;
            for value in data.buffer.iter_mut().filter(|v| **v == nd) {
                *value = f32::NAN;
            }
        }

        Ok(data)
    }

    fn read_u16(&self) -> Result<Data<u16>, ReadError> {
        Ok(self.read_band::<u16>()?.0)
    }
}
