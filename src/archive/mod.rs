use std::path::PathBuf;

use crate::readers::{FileError, ReadError};
use crate::scene::{Scene, SceneError, SceneMetadata};

pub mod local;
pub mod mtl;

pub use local::LocalArchive;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Archive directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("Invalid scene metadata in {path}: {source}")]
    Metadata {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Scene {scene} has no {band} band file")]
    MissingBand { scene: String, band: String },

    #[error("Band {band} of scene {scene} is not on the scene grid")]
    GridMismatch { scene: String, band: String },

    #[error("Unknown scene {0}")]
    UnknownScene(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid band file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to read band: {0}")]
    Read(#[from] ReadError),

    #[error("Unsupported band file: {0}")]
    File(#[from] FileError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Read-only source of scenes. Listing only touches metadata so filtering
/// can run before any pixels are loaded.
pub trait SceneArchive {
    fn scenes(&self) -> Result<Vec<SceneMetadata>, ArchiveError>;

    fn load(&self, metadata: &SceneMetadata) -> Result<Scene, ArchiveError>;
}

/// Scenes held in memory, e.g. synthetic inputs.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    scenes: Vec<Scene>,
}

impl MemoryArchive {
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self { scenes }
    }
}

impl SceneArchive for MemoryArchive {
    fn scenes(&self) -> Result<Vec<SceneMetadata>, ArchiveError> {
        Ok(self.scenes.iter().map(|s| s.metadata().clone()).collect())
    }

    fn load(&self, metadata: &SceneMetadata) -> Result<Scene, ArchiveError> {
        self.scenes
            .iter()
            .find(|s| s.id() == metadata.id)
            .cloned()
            .ok_or_else(|| ArchiveError::UnknownScene(metadata.id.clone()))
    }
}
