use crate::aggregate::AggregateError;
use crate::archive::ArchiveError;
use crate::config::ConfigError;
use crate::region::RegionError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Boundary error: {0}")]
    Region(#[from] RegionError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Reprojection failed: {0}")]
    Projection(#[from] gdal::errors::GdalError),

    #[error("Aggregation failed: {0}")]
    Aggregate(#[from] AggregateError),
}
