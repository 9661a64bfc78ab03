pub mod geotiff;
pub mod types;
pub mod utils;

pub use geotiff::GeoTiffReader;
pub use types::{Data, DataReader, FileError, FileType, ReadError};
pub use utils::reader_from_filetype;

use std::path::PathBuf;

pub fn create_reader(file_name: PathBuf) -> Result<Box<dyn DataReader>, FileError> {
    match reader_from_filetype(&file_name) {
        Ok(FileType::GeoTiff) => Ok(Box::new(GeoTiffReader { file_name })),
        Err(e) => Err(e),
    }
}
