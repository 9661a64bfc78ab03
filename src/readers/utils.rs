use super::types::{FileError, FileType};
use std::path::Path;

pub fn reader_from_filetype(path: &Path) -> Result<FileType, FileError> {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("tif") | Some("tiff") => Ok(FileType::GeoTiff),
        _ => Err(FileError::UnknownFileType),
    }
}
