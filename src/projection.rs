use gdal::errors::GdalError;
use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use gdal::vector::ToGdal;

use crate::bbox::Bbox;
use crate::region::Region;

/// Points added along each bbox edge so curved projected edges stay inside
/// the projected envelope.
const EDGE_DENSITY: i32 = 21;

/// Reprojects WGS84 longitude/latitude geometry into a target EPSG CRS.
pub struct Projector {
    transform: CoordTransform,
}

impl Projector {
    pub fn from_wgs84(epsg: u32) -> Result<Self, GdalError> {
        let mut source = SpatialRef::from_epsg(4326)?;
        source.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);

        let mut target = SpatialRef::from_epsg(epsg)?;
        target.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);

        Ok(Self {
            transform: CoordTransform::new(&source, &target)?,
        })
    }

    /// Envelope of the projected box outline.
    pub fn project_bbox(&self, bbox: &Bbox) -> Result<Bbox, GdalError> {
        let [xmin, ymin, xmax, ymax] = self
            .transform
            .transform_bounds(&[bbox.xmin, bbox.ymin, bbox.xmax, bbox.ymax], EDGE_DENSITY)?;

        Bbox::new(xmin, xmax, ymin, ymax).map_err(GdalError::BadArgument)
    }

    pub fn project_region(&self, region: &Region) -> Result<Region, GdalError> {
        if region.is_empty() {
            return Ok(Region::empty());
        }

        let projected = region.shape().to_gdal()?.transform(&self.transform)?;
        Region::from_gdal(&projected)
    }
}
