use glob::{MatchOptions, Pattern};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{ArchiveError, SceneArchive, mtl};
use crate::readers::{self, Data};
use crate::raster::Grid;
use crate::scene::{Scene, SceneMetadata};

pub const QA_PIXEL: &str = "QA_PIXEL";
pub const QA_RADSAT: &str = "QA_RADSAT";

const MTL_SUFFIX: &str = "_MTL.json";

/// Directory tree of Landsat Collection 2 Level-2 products, one
/// `<PRODUCT_ID>_MTL.json` plus `<PRODUCT_ID>_<BAND>.TIF` files per product.
#[derive(Debug, Clone)]
pub struct LocalArchive {
    root: PathBuf,
    bands: Vec<String>,
}

impl LocalArchive {
    /// Archive loading the given spectral bands alongside the QA bands.
    pub fn new<P: AsRef<Path>>(root: P, bands: &[&str]) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            bands: bands.iter().map(|b| b.to_string()).collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Finds `<id>_<band>.TIF` anywhere below the root, ignoring case.
    fn find_band_file(&self, id: &str, band: &str) -> Result<PathBuf, ArchiveError> {
        let pattern = format!(
            "{}/**/{}_{}.tif",
            Pattern::escape(&self.root.to_string_lossy()),
            Pattern::escape(id),
            Pattern::escape(band)
        );
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };

        glob::glob_with(&pattern, options)?
            .filter_map(Result::ok)
            .next()
            .ok_or_else(|| ArchiveError::MissingBand {
                scene: id.to_string(),
                band: band.to_string(),
            })
    }

    fn read_f32(&self, id: &str, band: &str) -> Result<Data<f32>, ArchiveError> {
        let path = self.find_band_file(id, band)?;
        let data = readers::create_reader(path)?.read_f32()?;
        debug!("{} of {}:\n{}", band, id, data);
        Ok(data)
    }

    fn read_u16(&self, id: &str, band: &str) -> Result<Data<u16>, ArchiveError> {
        let path = self.find_band_file(id, band)?;
        debug!("Reading {} from {}", band, path.display());
        Ok(readers::create_reader(path)?.read_u16()?)
    }
}

fn same_grid(reference: &Grid, other: &Grid, id: &str, band: &str) -> Result<(), ArchiveError> {
    if reference != other {
        return Err(ArchiveError::GridMismatch {
            scene: id.to_string(),
            band: band.to_string(),
        });
    }
    Ok(())
}

impl SceneArchive for LocalArchive {
    fn scenes(&self) -> Result<Vec<SceneMetadata>, ArchiveError> {
        if !self.root.is_dir() {
            return Err(ArchiveError::MissingDirectory(self.root.clone()));
        }

        let mut scenes = Vec::new();

        for entry in WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file()
                || !entry.file_name().to_string_lossy().ends_with(MTL_SUFFIX)
            {
                continue;
            }

            match mtl::read_mtl(entry.path()) {
                Ok(metadata) => scenes.push(metadata),
                Err(e) => warn!("Skipping {}: {}", entry.path().display(), e),
            }
        }

        debug!("Found {} products under {}", scenes.len(), self.root.display());

        Ok(scenes)
    }

    fn load(&self, metadata: &SceneMetadata) -> Result<Scene, ArchiveError> {
        let id = metadata.id.as_str();

        let qa_pixel = self.read_u16(id, QA_PIXEL)?;
        let qa_radsat = self.read_u16(id, QA_RADSAT)?;
        same_grid(&qa_pixel.grid, &qa_radsat.grid, id, QA_RADSAT)?;

        let grid = qa_pixel.grid;
        let mut scene = Scene::new(metadata.clone(), grid, qa_pixel.buffer, qa_radsat.buffer)?;

        for band in &self.bands {
            let data = self.read_f32(id, band)?;
            same_grid(&grid, &data.grid, id, band)?;
            scene = scene.with_band(band, data.buffer)?;
        }

        Ok(scene)
    }
}
