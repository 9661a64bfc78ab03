use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::fmt::Display;

use crate::bbox::Bbox;
use crate::periods::Period;
use crate::raster::Grid;

pub mod qa;

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("band {band} has {found} pixels, grid has {expected}")]
    SizeMismatch {
        band: String,
        expected: usize,
        found: usize,
    },
}

/// What is known about a scene before any pixel is read.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMetadata {
    pub id: String,
    pub acquired: NaiveDate,
    /// Percentage of the scene obscured by cloud, `None` if unknown.
    pub cloud_cover: Option<f32>,
    pub footprint: Bbox,
}

impl SceneMetadata {
    pub fn month(&self) -> u32 {
        self.acquired.month()
    }
}

#[derive(Debug, Clone)]
struct QaBands {
    pixel: Vec<u16>,
    radsat: Vec<u16>,
}

impl QaBands {
    fn validity(&self) -> impl Iterator<Item = bool> + '_ {
        self.pixel
            .iter()
            .zip(&self.radsat)
            .map(|(&pixel, &radsat)| qa::is_valid(pixel, radsat))
    }
}

/// One timestamped observation: spectral bands plus the two QA bitmask bands,
/// all on the same grid. Masking writes NaN into every spectral band and
/// releases the QA bands.
#[derive(Debug, Clone)]
pub struct Scene {
    metadata: SceneMetadata,
    grid: Grid,
    bands: BTreeMap<String, Vec<f32>>,
    qa: Option<QaBands>,
}

fn check_len(band: &str, expected: usize, found: usize) -> Result<(), SceneError> {
    if expected != found {
        return Err(SceneError::SizeMismatch {
            band: band.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

impl Scene {
    pub fn new(
        metadata: SceneMetadata,
        grid: Grid,
        qa_pixel: Vec<u16>,
        qa_radsat: Vec<u16>,
    ) -> Result<Self, SceneError> {
        check_len("QA_PIXEL", grid.len(), qa_pixel.len())?;
        check_len("QA_RADSAT", grid.len(), qa_radsat.len())?;

        Ok(Self {
            metadata,
            grid,
            bands: BTreeMap::new(),
            qa: Some(QaBands {
                pixel: qa_pixel,
                radsat: qa_radsat,
            }),
        })
    }

    pub fn with_band(mut self, name: &str, values: Vec<f32>) -> Result<Self, SceneError> {
        check_len(name, self.grid.len(), values.len())?;
        self.bands.insert(name.to_string(), values);
        Ok(self)
    }

    pub fn metadata(&self) -> &SceneMetadata {
        &self.metadata
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn acquired(&self) -> NaiveDate {
        self.metadata.acquired
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn band(&self, name: &str) -> Option<&[f32]> {
        self.bands.get(name).map(Vec::as_slice)
    }

    pub fn band_names(&self) -> impl Iterator<Item = &str> {
        self.bands.keys().map(String::as_str)
    }

    /// Marks cloudy, shadowed, filled and saturated pixels as no-data in
    /// every spectral band. Pixels are kept so statistics can skip them one
    /// by one.
    pub fn masked(mut self) -> Scene {
        let Some(qa) = self.qa.take() else {
            return self;
        };
        let valid: Vec<bool> = qa.validity().collect();

        for values in self.bands.values_mut() {
            for (value, &ok) in values.iter_mut().zip(&valid) {
                if !ok {
                    *value = f32::NAN;
                }
            }
        }

        self
    }

    pub fn is_masked(&self) -> bool {
        self.qa.is_none()
    }

    /// Pixels passing the QA test, or once masked, pixels with data in
    /// every band.
    pub fn valid_pixel_count(&self) -> usize {
        match &self.qa {
            Some(qa) => qa.validity().filter(|&ok| ok).count(),
            None => (0..self.grid.len())
                .filter(|&i| self.bands.values().all(|values| !values[i].is_nan()))
                .count(),
        }
    }

    /// Crops every band to the pixels overlapping `bbox`.
    pub fn clip(&self, bbox: &Bbox) -> Scene {
        let (col, row, cols, rows) = self.grid.window(bbox);
        let grid = self.grid.subgrid(col, row, cols, rows);

        let width = self.grid.width;
        Scene {
            metadata: self.metadata.clone(),
            grid,
            bands: self
                .bands
                .iter()
                .map(|(name, values)| {
                    (name.clone(), crop_window(values, width, col, row, cols, rows))
                })
                .collect(),
            qa: self.qa.as_ref().map(|qa| QaBands {
                pixel: crop_window(&qa.pixel, width, col, row, cols, rows),
                radsat: crop_window(&qa.radsat, width, col, row, cols, rows),
            }),
        }
    }

    /// Band value of the pixel containing `(x, y)`; `None` outside the scene,
    /// for no-data, or for an unknown band.
    pub fn sample(&self, band: &str, x: f64, y: f64) -> Option<f32> {
        let values = self.bands.get(band)?;
        let value = values[self.grid.index_of(x, y)?];
        (!value.is_nan()).then_some(value)
    }
}

fn crop_window<T: Copy>(
    src: &[T],
    width: usize,
    col: usize,
    row: usize,
    cols: usize,
    rows: usize,
) -> Vec<T> {
    (row..row + rows)
        .flat_map(|r| src[r * width + col..r * width + col + cols].iter().copied())
        .collect()
}

impl Display for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene {{ id: {}, acquired: {}, cloud cover: {:?}, dimensions: {}x{} }}",
            self.metadata.id,
            self.metadata.acquired,
            self.metadata.cloud_cover,
            self.grid.width,
            self.grid.height
        )
    }
}

/// Filtered, masked and clipped scenes. Order carries no meaning.
#[derive(Debug, Clone, Default)]
pub struct SceneCollection {
    scenes: Vec<Scene>,
}

impl SceneCollection {
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self { scenes }
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.iter()
    }

    /// Scenes acquired within `period`, or all of them.
    pub fn within<'a>(
        &'a self,
        period: Option<&'a Period>,
    ) -> impl Iterator<Item = &'a Scene> + 'a {
        self.scenes
            .iter()
            .filter(move |s| period.is_none_or(|p| p.contains(s.acquired())))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn metadata(
        id: &str,
        date: (i32, u32, u32),
        cloud_cover: Option<f32>,
    ) -> SceneMetadata {
        SceneMetadata {
            id: id.to_string(),
            acquired: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            cloud_cover,
            footprint: Bbox::new(0.0, 60.0, 0.0, 60.0).unwrap(),
        }
    }

    fn scene(qa_pixel: Vec<u16>, qa_radsat: Vec<u16>) -> Scene {
        let grid = Grid::new(0.0, 60.0, 30.0, 2, 2);
        Scene::new(metadata("LC08_TEST", (2020, 7, 1), Some(5.0)), grid, qa_pixel, qa_radsat)
            .unwrap()
            .with_band("ST_B10", vec![46000.0, 46100.0, 46200.0, 46300.0])
            .unwrap()
            .with_band("ST_QA", vec![1.0, 2.0, 3.0, 4.0])
            .unwrap()
    }

    #[test]
    fn test_band_size_is_checked() {
        let grid = Grid::new(0.0, 60.0, 30.0, 2, 2);
        let result = Scene::new(metadata("x", (2020, 7, 1), None), grid, vec![0; 3], vec![0; 4]);
        assert!(matches!(result, Err(SceneError::SizeMismatch { .. })));
    }

    #[test]
    fn test_mask_applies_to_every_band() {
        let masked = scene(vec![0, 1 << 3, 0, 0], vec![0, 0, 0, 2]).masked();

        for band in ["ST_B10", "ST_QA"] {
            let values = masked.band(band).unwrap();
            assert!(!values[0].is_nan());
            assert!(values[1].is_nan());
            assert!(!values[2].is_nan());
            assert!(values[3].is_nan());
        }
        assert_eq!(masked.valid_pixel_count(), 2);
    }

    #[test]
    fn test_clip_crops_all_bands() {
        let clipped =
            scene(vec![0, 0, 1, 0], vec![0; 4]).clip(&Bbox::new(0.0, 30.0, 0.0, 60.0).unwrap());

        assert_eq!((clipped.grid().width, clipped.grid().height), (1, 2));
        assert_eq!(clipped.band("ST_B10").unwrap(), &[46000.0, 46200.0]);
        assert_eq!(clipped.valid_pixel_count(), 1);
    }

    #[test]
    fn test_masking_releases_qa_bands() {
        let raw = scene(vec![0, 0, 1, 0], vec![0, 0, 0, 1]);
        assert!(!raw.is_masked());
        assert_eq!(raw.valid_pixel_count(), 2);

        let masked = raw.masked();
        assert!(masked.is_masked());
        assert_eq!(masked.valid_pixel_count(), 2);

        // Masking twice changes nothing
        let again = masked.clone().masked();
        assert_eq!(again.valid_pixel_count(), 2);
        assert_eq!(again.band("ST_QA").unwrap()[..2], [1.0, 2.0]);

        let clipped = masked.clip(&Bbox::new(0.0, 30.0, 0.0, 60.0).unwrap());
        assert!(clipped.is_masked());
        assert_eq!(clipped.valid_pixel_count(), 1);
    }

    #[test]
    fn test_clip_outside_is_empty() {
        let clipped =
            scene(vec![0; 4], vec![0; 4]).clip(&Bbox::new(100.0, 200.0, 0.0, 60.0).unwrap());
        assert!(clipped.grid().is_empty());
        assert_eq!(clipped.sample("ST_B10", 15.0, 15.0), None);
    }

    #[test]
    fn test_sample() {
        let s = scene(vec![0, 0, 0, 1], vec![0; 4]).masked();
        assert_eq!(s.sample("ST_B10", 45.0, 45.0), Some(46100.0));
        assert_eq!(s.sample("ST_B10", 45.0, 15.0), None);
        assert_eq!(s.sample("SR_B4", 15.0, 15.0), None);
    }
}
