use crate::config::Statistic;
use crate::periods::Period;
use crate::raster::{Grid, RasterProduct};
use crate::region::Region;
use crate::scene::SceneCollection;

#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("rasters are on different grids")]
    GridMismatch,
}

/// Reduces scene stacks onto a fixed output grid, restricted to a region.
#[derive(Debug, Clone)]
pub struct Aggregator {
    grid: Grid,
    inside: Vec<bool>,
    band: String,
}

impl Aggregator {
    pub fn new(grid: Grid, region: &Region, band: &str) -> Self {
        Self {
            inside: grid.region_mask(region),
            grid,
            band: band.to_string(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Per-pixel `statistic` over the scenes of `period` (all scenes when
    /// `None`). No-data observations are left out; a pixel with none left,
    /// or outside the region, is no-data.
    pub fn reduce(
        &self,
        collection: &SceneCollection,
        statistic: Statistic,
        period: Option<&Period>,
    ) -> RasterProduct {
        let scenes: Vec<_> = collection.within(period).collect();
        let mut observations = Vec::with_capacity(scenes.len());

        let values = (0..self.grid.height)
            .flat_map(|row| (0..self.grid.width).map(move |col| (col, row)))
            .zip(&self.inside)
            .map(|((col, row), &inside)| {
                if !inside {
                    return f32::NAN;
                }

                let (x, y) = self.grid.pixel_center(col, row);
                observations.clear();
                observations.extend(scenes.iter().filter_map(|s| s.sample(&self.band, x, y)));

                let value = match statistic {
                    Statistic::Mean => mean(&observations),
                    Statistic::Median => median(&mut observations),
                };
                value.map_or(f32::NAN, |v| v as f32)
            })
            .collect();

        RasterProduct::from_parts(self.grid, values)
    }
}

fn mean(values: &[f32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64)
}

fn median(values: &mut [f32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    values.sort_by(f32::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid] as f64)
    } else {
        Some((values[mid - 1] as f64 + values[mid] as f64) / 2.0)
    }
}

/// `product - baseline` pixel by pixel; no-data in either input stays no-data.
pub fn anomaly(
    product: &RasterProduct,
    baseline: &RasterProduct,
) -> Result<RasterProduct, AggregateError> {
    if product.grid() != baseline.grid() {
        return Err(AggregateError::GridMismatch);
    }

    // NaN propagates through the subtraction
    let values = product
        .values()
        .iter()
        .zip(baseline.values())
        .map(|(&p, &b)| p - b)
        .collect();

    Ok(RasterProduct::from_parts(*product.grid(), values))
}
