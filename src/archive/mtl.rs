//! Landsat Collection 2 `_MTL.json` product metadata.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::bbox::Bbox;
use crate::scene::SceneMetadata;

use super::ArchiveError;

#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct MtlFile {
    landsat_metadata_file: MetadataFile,
}

#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct MetadataFile {
    product_contents: ProductContents,
    image_attributes: ImageAttributes,
    projection_attributes: ProjectionAttributes,
}

#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct ProductContents {
    landsat_product_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct ImageAttributes {
    date_acquired: NaiveDate,
    #[serde(default, deserialize_with = "optional_number")]
    cloud_cover: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct ProjectionAttributes {
    #[serde(deserialize_with = "number")]
    corner_ul_projection_x_product: f64,
    #[serde(deserialize_with = "number")]
    corner_ul_projection_y_product: f64,
    #[serde(deserialize_with = "number")]
    corner_lr_projection_x_product: f64,
    #[serde(deserialize_with = "number")]
    corner_lr_projection_y_product: f64,
}

// MTL values are written as strings, e.g. "CLOUD_COVER": "12.34".
fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_number(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected a number, found {}", value)))
}

fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_number))
}

pub fn parse_mtl(text: &str) -> Result<SceneMetadata, serde_json::Error> {
    let mtl: MtlFile = serde_json::from_str(text)?;
    Ok(to_metadata(mtl.landsat_metadata_file))
}

pub fn read_mtl(path: &Path) -> Result<SceneMetadata, ArchiveError> {
    let metadata_error = |source| ArchiveError::Metadata {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path)?;
    let mtl: MtlFile = serde_json::from_reader(BufReader::new(file)).map_err(metadata_error)?;
    Ok(to_metadata(mtl.landsat_metadata_file))
}

fn to_metadata(file: MetadataFile) -> SceneMetadata {
    let projection = file.projection_attributes;
    let footprint = Bbox {
        xmin: projection
            .corner_ul_projection_x_product
            .min(projection.corner_lr_projection_x_product),
        xmax: projection
            .corner_ul_projection_x_product
            .max(projection.corner_lr_projection_x_product),
        ymin: projection
            .corner_lr_projection_y_product
            .min(projection.corner_ul_projection_y_product),
        ymax: projection
            .corner_lr_projection_y_product
            .max(projection.corner_ul_projection_y_product),
    };

    SceneMetadata {
        id: file.product_contents.landsat_product_id,
        acquired: file.image_attributes.date_acquired,
        // Negative cover marks a scene where it could not be computed
        cloud_cover: file
            .image_attributes
            .cloud_cover
            .filter(|c| *c >= 0.0)
            .map(|c| c as f32),
        footprint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_MTL: &str = r#"
    {
        "LANDSAT_METADATA_FILE": {
            "PRODUCT_CONTENTS": {
                "LANDSAT_PRODUCT_ID": "LC08_L2SP_014032_20200716_20200911_02_T1",
                "PROCESSING_LEVEL": "L2SP"
            },
            "IMAGE_ATTRIBUTES": {
                "SPACECRAFT_ID": "LANDSAT_8",
                "DATE_ACQUIRED": "2020-07-16",
                "CLOUD_COVER": "12.34"
            },
            "PROJECTION_ATTRIBUTES": {
                "UTM_ZONE": "18",
                "CORNER_UL_PROJECTION_X_PRODUCT": "492585.000",
                "CORNER_UL_PROJECTION_Y_PRODUCT": "4660515.000",
                "CORNER_LR_PROJECTION_X_PRODUCT": "723615.000",
                "CORNER_LR_PROJECTION_Y_PRODUCT": 4426785.0
            }
        }
    }
    "#;

    #[test]
    fn test_parse_mtl() {
        let metadata = parse_mtl(SAMPLE_MTL).unwrap();

        assert_eq!(metadata.id, "LC08_L2SP_014032_20200716_20200911_02_T1");
        assert_eq!(
            metadata.acquired,
            NaiveDate::from_ymd_opt(2020, 7, 16).unwrap()
        );
        assert_eq!(metadata.cloud_cover, Some(12.34));
        assert_eq!(metadata.footprint.xmin, 492585.0);
        assert_eq!(metadata.footprint.ymin, 4426785.0);
        assert_eq!(metadata.footprint.ymax, 4660515.0);
    }

    #[test]
    fn test_unknown_cloud_cover() {
        let negative = SAMPLE_MTL.replace("\"12.34\"", "\"-1\"");
        assert_eq!(parse_mtl(&negative).unwrap().cloud_cover, None);

        let missing = SAMPLE_MTL.replace("\"CLOUD_COVER\": \"12.34\"", "\"CLOUD_QUALITY\": \"9\"");
        assert_eq!(parse_mtl(&missing).unwrap().cloud_cover, None);
    }

    #[test]
    fn test_bad_corner_is_an_error() {
        let broken = SAMPLE_MTL.replace("\"492585.000\"", "\"west\"");
        assert!(parse_mtl(&broken).is_err());
    }
}
