use std::fmt;

use crate::bbox::Bbox;
use crate::region::Region;

/// North-up pixel grid. `origin_*` is the outer corner of the upper-left pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub width: usize,
    pub height: usize,
}

impl Grid {
    pub fn new(origin_x: f64, origin_y: f64, pixel_size: f64, width: usize, height: usize) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width: pixel_size,
            pixel_height: pixel_size,
            width,
            height,
        }
    }

    /// Grid from a GDAL geotransform
    /// `[top_left_x, pixel_width, 0, top_left_y, 0, -pixel_height]`.
    /// Rotated transforms are rejected.
    pub fn from_geo_transform(gt: [f64; 6], width: usize, height: usize) -> Option<Self> {
        if gt[2] != 0.0 || gt[4] != 0.0 || gt[1] <= 0.0 || gt[5] >= 0.0 {
            return None;
        }

        Some(Self {
            origin_x: gt[0],
            origin_y: gt[3],
            pixel_width: gt[1],
            pixel_height: -gt[5],
            width,
            height,
        })
    }

    pub fn geo_transform(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            0.0,
            self.origin_y,
            0.0,
            -self.pixel_height,
        ]
    }

    /// Grid of `scale`-sized pixels anchored at the upper-left corner of
    /// `bbox`, covering all of it.
    pub fn covering(bbox: &Bbox, scale: f64) -> Self {
        let width = ((bbox.width() / scale).ceil() as usize).max(1);
        let height = ((bbox.height() / scale).ceil() as usize).max(1);
        Self::new(bbox.xmin, bbox.ymax, scale, width, height)
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn extent(&self) -> Bbox {
        Bbox {
            xmin: self.origin_x,
            xmax: self.origin_x + self.width as f64 * self.pixel_width,
            ymin: self.origin_y - self.height as f64 * self.pixel_height,
            ymax: self.origin_y,
        }
    }

    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.origin_x + (col as f64 + 0.5) * self.pixel_width,
            self.origin_y - (row as f64 + 0.5) * self.pixel_height,
        )
    }

    /// Row-major index of the pixel containing `(x, y)`.
    pub fn index_of(&self, x: f64, y: f64) -> Option<usize> {
        let col = ((x - self.origin_x) / self.pixel_width).floor();
        let row = ((self.origin_y - y) / self.pixel_height).floor();

        if col < 0.0 || row < 0.0 || col >= self.width as f64 || row >= self.height as f64 {
            return None;
        }

        Some(row as usize * self.width + col as usize)
    }

    /// Pixel window `(col, row, cols, rows)` overlapping `bbox`, clamped to
    /// the grid. May be zero-sized.
    pub fn window(&self, bbox: &Bbox) -> (usize, usize, usize, usize) {
        let min_x = ((bbox.xmin - self.origin_x) / self.pixel_width).floor() as i64;
        let max_x = ((bbox.xmax - self.origin_x) / self.pixel_width).ceil() as i64;
        let min_y = ((self.origin_y - bbox.ymax) / self.pixel_height).floor() as i64;
        let max_y = ((self.origin_y - bbox.ymin) / self.pixel_height).ceil() as i64;

        let start_x = min_x.clamp(0, self.width as i64) as usize;
        let end_x = max_x.clamp(0, self.width as i64) as usize;
        let start_y = min_y.clamp(0, self.height as i64) as usize;
        let end_y = max_y.clamp(0, self.height as i64) as usize;

        (
            start_x,
            start_y,
            end_x.saturating_sub(start_x),
            end_y.saturating_sub(start_y),
        )
    }

    pub fn subgrid(&self, col: usize, row: usize, cols: usize, rows: usize) -> Grid {
        Grid {
            origin_x: self.origin_x + col as f64 * self.pixel_width,
            origin_y: self.origin_y - row as f64 * self.pixel_height,
            width: cols,
            height: rows,
            ..*self
        }
    }

    /// Per-pixel flag: does the pixel centre fall inside `region`.
    pub fn region_mask(&self, region: &Region) -> Vec<bool> {
        let envelope = region.envelope();
        (0..self.height)
            .flat_map(|row| (0..self.width).map(move |col| (col, row)))
            .map(|(col, row)| {
                let (x, y) = self.pixel_center(col, row);
                envelope.is_some_and(|env| env.contains(x, y)) && region.contains(x, y)
            })
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("raster has {found} values, grid has {expected} pixels")]
    SizeMismatch { expected: usize, found: usize },
}

/// Single-band derived raster. No-data pixels hold NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterProduct {
    grid: Grid,
    values: Vec<f32>,
}

impl RasterProduct {
    /// Fails unless `values` holds exactly one value per grid pixel.
    pub fn new(grid: Grid, values: Vec<f32>) -> Result<Self, RasterError> {
        if grid.len() != values.len() {
            return Err(RasterError::SizeMismatch {
                expected: grid.len(),
                found: values.len(),
            });
        }
        Ok(Self::from_parts(grid, values))
    }

    /// Callers guarantee one value per grid pixel.
    pub(crate) fn from_parts(grid: Grid, values: Vec<f32>) -> Self {
        debug_assert_eq!(grid.len(), values.len());
        Self { grid, values }
    }

    pub fn no_data(grid: Grid) -> Self {
        Self::from_parts(grid, vec![f32::NAN; grid.len()])
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.grid.width || row >= self.grid.height {
            return None;
        }
        let v = self.values[row * self.grid.width + col];
        (!v.is_nan()).then_some(v)
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// Nearest-neighbour resampling onto a grid of `scale`-sized pixels
    /// over the same extent.
    pub fn resampled(&self, scale: f64) -> RasterProduct {
        let target = Grid::covering(&self.grid.extent(), scale);
        let values = (0..target.height)
            .flat_map(|row| (0..target.width).map(move |col| (col, row)))
            .map(|(col, row)| {
                let (x, y) = target.pixel_center(col, row);
                self.grid
                    .index_of(x, y)
                    .map_or(f32::NAN, |i| self.values[i])
            })
            .collect();

        RasterProduct::from_parts(target, values)
    }

    pub fn summary(&self) -> RasterSummary {
        let valid: Vec<f32> = self.values.iter().copied().filter(|v| !v.is_nan()).collect();

        let (min, max, mean) = if valid.is_empty() {
            (f32::NAN, f32::NAN, f32::NAN)
        } else {
            (
                valid.iter().fold(f32::INFINITY, |a, &b| a.min(b)),
                valid.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b)),
                (valid.iter().map(|&v| v as f64).sum::<f64>() / valid.len() as f64) as f32,
            )
        };

        RasterSummary {
            min,
            max,
            mean,
            valid: valid.len(),
            total: self.values.len(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RasterSummary {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub valid: usize,
    pub total: usize,
}

impl fmt::Display for RasterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let share = if self.total == 0 {
            0.0
        } else {
            100.0 * self.valid as f32 / self.total as f32
        };

        write!(
            f,
            "min {:.2}, max {:.2}, mean {:.2}, valid pixels {} / {} ({:.1}%)",
            self.min, self.max, self.mean, self.valid, self.total, share
        )
    }
}
