use log::{error, info, warn};
use std::path::Path;

use surftemp::Config;
use surftemp::archive::LocalArchive;
use surftemp::export::GeoTiffExporter;
use surftemp::pipeline::Pipeline;
use surftemp::region::BoundaryDataset;

const DEFAULT_CONFIG: &str = "./data/config/nyc_summer.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting land surface temperature processing...");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());

    let config = if Path::new(&config_path).exists() {
        Config::from_file(&config_path)?
    } else {
        warn!("{} not found, using built-in defaults", config_path);
        Config::default()
    };

    let boundaries = BoundaryDataset::from_file(config.boundaries())?;
    let archive = LocalArchive::new(config.archive_directory(), &[config.thermal_band()]);
    let exporter = GeoTiffExporter::new(config.output_directory(), config.epsg());

    let report = Pipeline::new(&config, &archive, &exporter).run(&boundaries)?;

    info!(
        "Scenes: {}, exported: {}, failed: {}",
        report.scene_count,
        report.exported.len(),
        report.failures.len()
    );

    if !report.is_success() {
        for (name, e) in &report.failures {
            error!("{}: {}", name, e);
        }
        return Err(format!("{} exports failed", report.failures.len()).into());
    }

    Ok(())
}
