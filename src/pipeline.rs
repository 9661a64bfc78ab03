use chrono::Datelike;
use log::{info, warn};

use crate::aggregate::{Aggregator, anomaly};
use crate::archive::SceneArchive;
use crate::bbox::Bbox;
use crate::config::{Config, Statistic};
use crate::error::PipelineError;
use crate::export::{ExportError, Exporter};
use crate::filter::SceneFilter;
use crate::periods::Period;
use crate::projection::Projector;
use crate::raster::{Grid, RasterProduct};
use crate::region::{BoundaryDataset, Region, RegionSelector};
use crate::scene::SceneCollection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductKind {
    /// Statistic over the whole date range.
    Overall(Statistic),
    /// Yearly mean minus the overall mean.
    Anomaly(Period),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSpec {
    pub name: String,
    pub kind: ProductKind,
}

/// Products a run exports, in export order.
pub fn plan_products(config: &Config) -> Vec<ProductSpec> {
    let first = config.start_date().year();
    let last = config.period_generator().last_year().unwrap_or(first);
    let prefix = config.name_prefix();

    let mut statistics = config.statistics().to_vec();
    statistics.sort();
    statistics.dedup();

    let mut products: Vec<ProductSpec> = statistics
        .into_iter()
        .map(|statistic| ProductSpec {
            name: match statistic {
                Statistic::Mean => format!("{}_{}_{}", prefix, first, last),
                Statistic::Median => format!("{}_median_{}_{}", prefix, first, last),
            },
            kind: ProductKind::Overall(statistic),
        })
        .collect();

    if config.yearly_anomalies() {
        products.extend(config.periods().into_iter().map(|period| ProductSpec {
            name: format!("{}_summer{}", prefix, period),
            kind: ProductKind::Anomaly(period),
        }));
    }

    products
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub scene_count: usize,
    pub exported: Vec<String>,
    pub failures: Vec<(String, ExportError)>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Region selection, scene filtering, aggregation and export for one
/// configuration. Holds no state between runs.
pub struct Pipeline<'a> {
    config: &'a Config,
    archive: &'a dyn SceneArchive,
    exporter: &'a dyn Exporter,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a Config,
        archive: &'a dyn SceneArchive,
        exporter: &'a dyn Exporter,
    ) -> Self {
        Self {
            config,
            archive,
            exporter,
        }
    }

    /// The analysis region and bounding box, both in the archive CRS.
    pub fn select_region(
        &self,
        boundaries: &BoundaryDataset,
    ) -> Result<(Region, Bbox), PipelineError> {
        let selector = RegionSelector::new(self.config.admin1_name(), self.config.admin2_names())
            .with_fields(self.config.admin1_field(), self.config.admin2_field());
        let region = selector.select(boundaries, self.config.bbox())?;

        match self.config.epsg() {
            Some(epsg) => {
                let projector = Projector::from_wgs84(epsg)?;
                Ok((
                    projector.project_region(&region)?,
                    projector.project_bbox(self.config.bbox())?,
                ))
            }
            None => Ok((region, *self.config.bbox())),
        }
    }

    pub fn collect_scenes(
        &self,
        region: &Region,
        bounds: &Bbox,
    ) -> Result<SceneCollection, PipelineError> {
        let filter = SceneFilter::from_config(self.config);
        Ok(filter.collect(self.archive, region, bounds)?)
    }

    /// Computes every planned product. The overall mean is always computed
    /// since anomalies are taken against it.
    pub fn compute(
        &self,
        collection: &SceneCollection,
        region: &Region,
        bounds: &Bbox,
    ) -> Result<Vec<(ProductSpec, RasterProduct)>, PipelineError> {
        let grid = Grid::covering(bounds, self.config.scale());
        let aggregator = Aggregator::new(grid, region, self.config.thermal_band());
        let baseline = aggregator.reduce(collection, Statistic::Mean, None);

        let mut products = Vec::new();
        for spec in plan_products(self.config) {
            let product = match spec.kind {
                ProductKind::Overall(Statistic::Mean) => baseline.clone(),
                ProductKind::Overall(statistic) => aggregator.reduce(collection, statistic, None),
                ProductKind::Anomaly(period) => {
                    let yearly = aggregator.reduce(collection, Statistic::Mean, Some(&period));
                    anomaly(&yearly, &baseline)?
                }
            };

            info!("{}: {}", spec.name, product.summary());
            products.push((spec, product));
        }

        Ok(products)
    }

    pub fn run(&self, boundaries: &BoundaryDataset) -> Result<RunReport, PipelineError> {
        info!("Processing {}", self.config.collection());

        let (region, bounds) = self.select_region(boundaries)?;
        let collection = self.collect_scenes(&region, &bounds)?;
        let products = self.compute(&collection, &region, &bounds)?;

        let mut report = RunReport {
            scene_count: collection.len(),
            ..RunReport::default()
        };

        // One failed export does not stop the others
        for (spec, product) in products {
            match self
                .exporter
                .export(&product, self.config.scale(), &spec.name)
            {
                Ok(()) => report.exported.push(spec.name),
                Err(e) => {
                    warn!("✗ Export of {} failed: {}", spec.name, e);
                    report.failures.push((spec.name, e));
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MemoryArchive;
    use crate::export::GeoTiffExporter;

    const KINGS_LONLAT: &str = r#"{ "type": "FeatureCollection", "features": [{
        "type": "Feature",
        "properties": { "ADM1_NAME": "New York", "ADM2_NAME": "Kings" },
        "geometry": { "type": "Polygon", "coordinates": [[
            [-74.05, 40.57], [-73.85, 40.57], [-73.85, 40.74], [-74.05, 40.74], [-74.05, 40.57]
        ]] }
    }] }"#;

    #[test]
    fn test_default_plan_matches_nyc_outputs() {
        let names: Vec<String> = plan_products(&Config::default())
            .into_iter()
            .map(|p| p.name)
            .collect();

        assert_eq!(names.len(), 11);
        assert_eq!(names[0], "surfacetemperature_2014_2022");
        assert_eq!(names[1], "surfacetemperature_median_2014_2022");
        assert_eq!(names[2], "surfacetemperature_summer2014");
        assert_eq!(names[10], "surfacetemperature_summer2022");
    }

    #[test]
    fn test_mean_only_without_anomalies() {
        let config =
            Config::from_json(r#"{ "statistics": ["mean"], "yearly_anomalies": false }"#).unwrap();
        let plan = plan_products(&config);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].kind, ProductKind::Overall(Statistic::Mean));
    }

    #[test]
    fn test_duplicate_statistics_are_planned_once() {
        let config = Config::from_json(
            r#"{ "statistics": ["median", "mean", "median"], "yearly_anomalies": false }"#,
        )
        .unwrap();
        let kinds: Vec<ProductKind> = plan_products(&config).into_iter().map(|p| p.kind).collect();

        assert_eq!(
            kinds,
            vec![
                ProductKind::Overall(Statistic::Mean),
                ProductKind::Overall(Statistic::Median)
            ]
        );
    }

    #[test]
    fn test_anomalies_follow_explicit_periods() {
        let config = Config::from_json(
            r#"{ "statistics": ["median"], "periods": [2018, 2020], "name_prefix": "lst" }"#,
        )
        .unwrap();
        let plan = plan_products(&config);

        assert_eq!(plan.len(), 3);
        assert_eq!(plan[1].name, "lst_summer2018");
        assert_eq!(plan[2].kind, ProductKind::Anomaly(Period::year(2020)));
    }

    #[test]
    fn test_select_region_projects_to_archive_crs() {
        let config = Config::default();
        assert_eq!(config.epsg(), Some(32618));

        let archive = MemoryArchive::new(Vec::new());
        let exporter = GeoTiffExporter::new(std::env::temp_dir(), config.epsg());
        let pipeline = Pipeline::new(&config, &archive, &exporter);
        let boundaries = BoundaryDataset::from_geojson(KINGS_LONLAT).unwrap();

        let (region, bounds) = pipeline.select_region(&boundaries).unwrap();
        assert!(bounds.xmin > 555_000.0 && bounds.xmax < 625_000.0, "{:?}", bounds);
        assert!(bounds.ymin > 4_470_000.0 && bounds.ymax < 4_545_000.0, "{:?}", bounds);

        assert!(!region.is_empty());
        let envelope = region.envelope().unwrap();
        assert!(envelope.xmin >= bounds.xmin && envelope.xmax <= bounds.xmax);
        assert!(envelope.ymin >= bounds.ymin && envelope.ymax <= bounds.ymax);
    }
}
