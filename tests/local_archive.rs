use gdal::DriverManager;
use gdal::raster::{Buffer, GdalType};
use std::path::Path;
use tempfile::tempdir;

use surftemp::archive::{LocalArchive, SceneArchive};
use surftemp::export::{Exporter, GeoTiffExporter};
use surftemp::raster::{Grid, RasterProduct};
use surftemp::readers::{DataReader, GeoTiffReader};

const PRODUCT_ID: &str = "LC08_L2SP_014032_20200716_20200911_02_T1";
const GEO_TRANSFORM: [f64; 6] = [0.0, 30.0, 0.0, 60.0, 0.0, -30.0];

fn write_band<T: GdalType + Copy>(path: &Path, values: Vec<T>, no_data: Option<f64>) {
    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let mut dataset = driver.create_with_band_type::<T, _>(path, 2, 2, 1).unwrap();
    dataset.set_geo_transform(&GEO_TRANSFORM).unwrap();

    let mut band = dataset.rasterband(1).unwrap();
    let mut buffer = Buffer::new((2, 2), values);
    band.write((0, 0), (2, 2), &mut buffer).unwrap();
    if no_data.is_some() {
        band.set_no_data_value(no_data).unwrap();
    }
}

fn write_mtl(dir: &Path, cloud_cover: &str) {
    let mtl = format!(
        r#"{{
            "LANDSAT_METADATA_FILE": {{
                "PRODUCT_CONTENTS": {{ "LANDSAT_PRODUCT_ID": "{}" }},
                "IMAGE_ATTRIBUTES": {{ "DATE_ACQUIRED": "2020-07-16", "CLOUD_COVER": "{}" }},
                "PROJECTION_ATTRIBUTES": {{
                    "CORNER_UL_PROJECTION_X_PRODUCT": "0.000",
                    "CORNER_UL_PROJECTION_Y_PRODUCT": "60.000",
                    "CORNER_LR_PROJECTION_X_PRODUCT": "60.000",
                    "CORNER_LR_PROJECTION_Y_PRODUCT": "0.000"
                }}
            }}
        }}"#,
        PRODUCT_ID, cloud_cover
    );
    std::fs::write(dir.join(format!("{}_MTL.json", PRODUCT_ID)), mtl).unwrap();
}

/// One 2x2 product: pixel 1 is cloudy, pixel 2 is saturated, pixel 3 is fill.
fn write_product(root: &Path) {
    let dir = root.join(PRODUCT_ID);
    std::fs::create_dir_all(&dir).unwrap();

    write_mtl(&dir, "12.5");
    write_band::<u16>(
        &dir.join(format!("{}_ST_B10.TIF", PRODUCT_ID)),
        vec![46000, 46100, 46200, 0],
        Some(0.0),
    );
    write_band::<u16>(
        &dir.join(format!("{}_QA_PIXEL.TIF", PRODUCT_ID)),
        vec![21824, 21824 | 0b1000, 21824, 1],
        None,
    );
    write_band::<u16>(
        &dir.join(format!("{}_QA_RADSAT.TIF", PRODUCT_ID)),
        vec![0, 0, 0b10_0000_0000, 0],
        None,
    );
}

#[test]
fn test_discovers_product_metadata() {
    let dir = tempdir().unwrap();
    write_product(dir.path());

    let archive = LocalArchive::new(dir.path(), &["ST_B10"]);
    let scenes = archive.scenes().unwrap();

    assert_eq!(scenes.len(), 1);
    assert_eq!(scenes[0].id, PRODUCT_ID);
    assert_eq!(scenes[0].cloud_cover, Some(12.5));
    assert_eq!(scenes[0].footprint.xmax, 60.0);
}

#[test]
fn test_loads_and_masks_bands() {
    let dir = tempdir().unwrap();
    write_product(dir.path());

    let archive = LocalArchive::new(dir.path(), &["ST_B10"]);
    let metadata = archive.scenes().unwrap().remove(0);
    let scene = archive.load(&metadata).unwrap();

    assert_eq!(scene.grid(), &Grid::new(0.0, 60.0, 30.0, 2, 2));
    assert_eq!(scene.valid_pixel_count(), 1);

    let raw = scene.band("ST_B10").unwrap();
    assert_eq!(raw[0], 46000.0);
    assert_eq!(raw[1], 46100.0);
    assert!(raw[3].is_nan());

    let masked = scene.masked();
    let values = masked.band("ST_B10").unwrap();
    assert_eq!(values[0], 46000.0);
    assert!(values[1..].iter().all(|v| v.is_nan()));
}

#[test]
fn test_missing_band_fails_load() {
    let dir = tempdir().unwrap();
    write_product(dir.path());

    let archive = LocalArchive::new(dir.path(), &["ST_B10", "ST_QA"]);
    let metadata = archive.scenes().unwrap().remove(0);

    assert!(archive.load(&metadata).is_err());
}

#[test]
fn test_geotiff_export_round_trip() {
    let dir = tempdir().unwrap();
    let exporter = GeoTiffExporter::new(dir.path().join("output"), Some(32618));
    let product = RasterProduct::new(
        Grid::new(0.0, 60.0, 30.0, 2, 2),
        vec![300.5, f32::NAN, 301.0, 302.0],
    )
    .unwrap();

    exporter.export(&product, 30.0, "surfacetemperature_2020_2020").unwrap();

    let path = exporter.path_for("surfacetemperature_2020_2020");
    assert!(path.exists());

    let data = GeoTiffReader { file_name: path }.read_f32().unwrap();
    assert_eq!(data.grid, *product.grid());
    assert_eq!(data.buffer[0], 300.5);
    assert!(data.buffer[1].is_nan());
    assert_eq!(data.buffer[3], 302.0);
}

#[test]
fn test_export_overwrites_and_resamples() {
    let dir = tempdir().unwrap();
    let exporter = GeoTiffExporter::new(dir.path(), None);
    let grid = Grid::new(0.0, 60.0, 30.0, 2, 2);

    exporter
        .export(&RasterProduct::new(grid, vec![1.0; 4]).unwrap(), 30.0, "lst")
        .unwrap();
    exporter
        .export(&RasterProduct::new(grid, vec![1.0, 2.0, 3.0, 4.0]).unwrap(), 15.0, "lst")
        .unwrap();

    let data = GeoTiffReader {
        file_name: exporter.path_for("lst"),
    }
    .read_f32()
    .unwrap();

    assert_eq!(data.grid, Grid::new(0.0, 60.0, 15.0, 4, 4));
    assert_eq!(&data.buffer[..4], &[1.0, 1.0, 2.0, 2.0]);
    assert_eq!(&data.buffer[12..], &[3.0, 3.0, 4.0, 4.0]);
}

#[test]
fn test_export_rejects_bad_names() {
    let dir = tempdir().unwrap();
    let exporter = GeoTiffExporter::new(dir.path(), None);
    let product = RasterProduct::no_data(Grid::new(0.0, 60.0, 30.0, 2, 2));

    assert!(exporter.export(&product, 30.0, "../escape").is_err());
    assert!(exporter.export(&product, 0.0, "lst").is_err());
}
