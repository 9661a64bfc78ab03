use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::archive::{ArchiveError, SceneArchive};
use crate::bbox::Bbox;
use crate::config::{Config, MonthRange};
use crate::region::Region;
use crate::scene::{SceneCollection, SceneMetadata};

/// Metadata predicates a scene must pass before its pixels are read.
#[derive(Debug, Clone)]
pub struct SceneFilter {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub months: MonthRange,
    pub max_cloud_cover: f32,
    pub include_unknown_cloud_cover: bool,
}

impl SceneFilter {
    pub fn from_config(config: &Config) -> Self {
        Self {
            start: config.start_date(),
            end: config.end_date(),
            months: config.months(),
            max_cloud_cover: config.max_cloud_cover(),
            include_unknown_cloud_cover: config.include_unknown_cloud_cover(),
        }
    }

    fn rejection(&self, metadata: &SceneMetadata, region: &Region) -> Option<&'static str> {
        if metadata.acquired < self.start || metadata.acquired >= self.end {
            return Some("outside date range");
        }

        if !self.months.contains(metadata.month()) {
            return Some("outside month window");
        }

        match metadata.cloud_cover {
            Some(cover) if cover >= self.max_cloud_cover => return Some("too cloudy"),
            None if !self.include_unknown_cloud_cover => return Some("unknown cloud cover"),
            _ => {}
        }

        if !region.intersects(&metadata.footprint) {
            return Some("footprint misses region");
        }

        None
    }

    pub fn accepts(&self, metadata: &SceneMetadata, region: &Region) -> bool {
        self.rejection(metadata, region).is_none()
    }

    /// Loads every accepted scene, masks invalid pixels and clips it to
    /// `bounds`. Scenes that fail to load are skipped.
    pub fn collect<A>(
        &self,
        archive: &A,
        region: &Region,
        bounds: &Bbox,
    ) -> Result<SceneCollection, ArchiveError>
    where
        A: SceneArchive + ?Sized,
    {
        let candidates = archive.scenes()?;
        let total = candidates.len();
        let mut scenes = Vec::new();

        for metadata in candidates {
            if let Some(reason) = self.rejection(&metadata, region) {
                debug!("Rejected {}: {}", metadata.id, reason);
                continue;
            }

            match archive.load(&metadata) {
                Ok(scene) => scenes.push(scene.masked().clip(bounds)),
                Err(e) => warn!("Could not load {}: {}", metadata.id, e),
            }
        }

        if scenes.is_empty() {
            warn!("No scenes passed the filter ({} candidates)", total);
        } else {
            info!("{} of {} scenes in collection", scenes.len(), total);
        }

        Ok(SceneCollection::new(scenes))
    }
}
