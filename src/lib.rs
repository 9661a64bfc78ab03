//! Summer land-surface-temperature composites from Landsat 8 Collection 2
//! Level-2 scenes: cloud and saturation masking, per-pixel mean and median
//! over a municipal region, yearly anomalies, and GeoTIFF export.

pub mod aggregate;
pub mod archive;
pub mod bbox;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod periods;
pub mod pipeline;
pub mod projection;
pub mod raster;
pub mod readers;
pub mod region;
pub mod scene;

pub use config::Config;
pub use error::PipelineError;
pub use pipeline::{Pipeline, RunReport};
