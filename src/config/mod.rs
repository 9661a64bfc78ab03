use chrono::NaiveDate;

use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::bbox::Bbox;
use crate::periods::{Period, PeriodGenerator};

pub mod error;
pub use error::ConfigError;

pub mod statistic;
pub use statistic::{MonthRange, Statistic};

/// Run parameters. Every field has a default reproducing the New York City
/// summer analysis, so a JSON file only needs to name what differs.
#[derive(Debug, Clone)]
pub struct Config {
    collection: String,
    archive_directory: PathBuf,
    boundaries: PathBuf,
    output_directory: PathBuf,
    start_date: NaiveDate,
    end_date: NaiveDate,
    months: MonthRange,
    max_cloud_cover: f32,
    include_unknown_cloud_cover: bool,
    admin1_field: String,
    admin1_name: String,
    admin2_field: String,
    admin2_names: Vec<String>,
    bbox: Bbox,
    epsg: Option<u32>,
    thermal_band: String,
    statistics: Vec<Statistic>,
    yearly_anomalies: bool,
    periods: Option<Vec<i32>>,
    scale: f64,
    name_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collection: "LANDSAT/LC08/C02/T1_L2".to_string(),
            archive_directory: PathBuf::from("./data/landsat8"),
            boundaries: PathBuf::from("./data/boundaries/gaul_level2.geojson"),
            output_directory: PathBuf::from("./output"),
            start_date: NaiveDate::from_ymd_opt(2014, 5, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2022, 10, 1).unwrap_or_default(),
            months: MonthRange { start: 6, end: 9 },
            max_cloud_cover: 40.0,
            include_unknown_cloud_cover: false,
            admin1_field: "ADM1_NAME".to_string(),
            admin1_name: "New York".to_string(),
            admin2_field: "ADM2_NAME".to_string(),
            admin2_names: ["Kings", "Richmond", "New York", "Queens", "Bronx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            bbox: Bbox {
                xmin: -74.28,
                xmax: -73.65,
                ymin: 40.47,
                ymax: 40.95,
            },
            epsg: Some(32618),
            thermal_band: "ST_B10".to_string(),
            statistics: vec![Statistic::Mean, Statistic::Median],
            yearly_anomalies: true,
            periods: None,
            scale: 30.0,
            name_prefix: "surfacetemperature".to_string(),
        }
    }
}

// This function deserializes a Config object from a deserializer. Missing fields fall back to
// the defaults, and the dates, months, thresholds and bbox are validated.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct ConfigHelper {
            collection: Option<String>,
            archive_directory: Option<PathBuf>,
            boundaries: Option<PathBuf>,
            output_directory: Option<PathBuf>,
            start_date: Option<String>,
            end_date: Option<String>,
            months: Option<MonthRange>,
            max_cloud_cover: Option<f32>,
            include_unknown_cloud_cover: Option<bool>,
            admin1_field: Option<String>,
            admin1_name: Option<String>,
            admin2_field: Option<String>,
            admin2_names: Option<Vec<String>>,
            bbox: Option<BboxHelper>,
            // Double option: absent keeps the default CRS, null disables reprojection
            #[serde(default, deserialize_with = "explicit_option")]
            epsg: Option<Option<u32>>,
            thermal_band: Option<String>,
            statistics: Option<Vec<Statistic>>,
            yearly_anomalies: Option<bool>,
            periods: Option<Vec<i32>>,
            scale: Option<f64>,
            name_prefix: Option<String>,
        }

        #[derive(Deserialize)]
        struct BboxHelper {
            xmin: f64,
            xmax: f64,
            ymin: f64,
            ymax: f64,
        }

        fn explicit_option<'a, D>(deserializer: D) -> Result<Option<Option<u32>>, D::Error>
        where
            D: Deserializer<'a>,
        {
            Option::<u32>::deserialize(deserializer).map(Some)
        }

        fn parse_date<E: Error>(value: &str, field: &str) -> Result<NaiveDate, E> {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map_err(|e| E::custom(format!("Invalid {} format: {}", field, e)))
        }

        let helper = ConfigHelper::deserialize(deserializer)?;
        let defaults = Config::default();

        let start_date = match helper.start_date {
            Some(s) => parse_date(&s, "start_date")?,
            None => defaults.start_date,
        };

        let end_date = match helper.end_date {
            Some(s) => parse_date(&s, "end_date")?,
            None => defaults.end_date,
        };

        // The range is half-open, so it must not be empty
        if start_date >= end_date {
            return Err(D::Error::custom(ConfigError::DateOrder));
        }

        let months = match helper.months {
            Some(m) => MonthRange::new(m.start, m.end)
                .ok_or_else(|| D::Error::custom(ConfigError::Months))?,
            None => defaults.months,
        };

        let max_cloud_cover = helper.max_cloud_cover.unwrap_or(defaults.max_cloud_cover);
        if !(0.0..=100.0).contains(&max_cloud_cover) {
            return Err(D::Error::custom(ConfigError::CloudCover));
        }

        let scale = helper.scale.unwrap_or(defaults.scale);
        if !(scale.is_finite() && scale > 0.0) {
            return Err(D::Error::custom(ConfigError::Scale));
        }

        let statistics = helper.statistics.unwrap_or(defaults.statistics);
        if statistics.is_empty() {
            return Err(D::Error::custom(ConfigError::NoStatistics));
        }

        let epsg = helper.epsg.unwrap_or(defaults.epsg);

        // Geographic bounds are only required when they get reprojected
        let bbox = match helper.bbox {
            Some(b) => {
                let bbox = if epsg.is_some() {
                    Bbox::geographic(b.xmin, b.xmax, b.ymin, b.ymax)
                } else {
                    Bbox::new(b.xmin, b.xmax, b.ymin, b.ymax)
                };
                bbox.map_err(|e| D::Error::custom(ConfigError::Bbox(e)))?
            }
            None => defaults.bbox,
        };

        Ok(Config {
            collection: helper.collection.unwrap_or(defaults.collection),
            archive_directory: helper.archive_directory.unwrap_or(defaults.archive_directory),
            boundaries: helper.boundaries.unwrap_or(defaults.boundaries),
            output_directory: helper.output_directory.unwrap_or(defaults.output_directory),
            start_date,
            end_date,
            months,
            max_cloud_cover,
            include_unknown_cloud_cover: helper
                .include_unknown_cloud_cover
                .unwrap_or(defaults.include_unknown_cloud_cover),
            admin1_field: helper.admin1_field.unwrap_or(defaults.admin1_field),
            admin1_name: helper.admin1_name.unwrap_or(defaults.admin1_name),
            admin2_field: helper.admin2_field.unwrap_or(defaults.admin2_field),
            admin2_names: helper.admin2_names.unwrap_or(defaults.admin2_names),
            bbox,
            epsg,
            thermal_band: helper.thermal_band.unwrap_or(defaults.thermal_band),
            statistics,
            yearly_anomalies: helper.yearly_anomalies.unwrap_or(defaults.yearly_anomalies),
            periods: helper.periods.or(defaults.periods),
            scale,
            name_prefix: helper.name_prefix.unwrap_or(defaults.name_prefix),
        })
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: Config = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Config, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn archive_directory(&self) -> &Path {
        &self.archive_directory
    }

    pub fn boundaries(&self) -> &Path {
        &self.boundaries
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn months(&self) -> MonthRange {
        self.months
    }

    pub fn max_cloud_cover(&self) -> f32 {
        self.max_cloud_cover
    }

    pub fn include_unknown_cloud_cover(&self) -> bool {
        self.include_unknown_cloud_cover
    }

    pub fn admin1_field(&self) -> &str {
        &self.admin1_field
    }

    pub fn admin1_name(&self) -> &str {
        &self.admin1_name
    }

    pub fn admin2_field(&self) -> &str {
        &self.admin2_field
    }

    pub fn admin2_names(&self) -> &[String] {
        &self.admin2_names
    }

    pub fn bbox(&self) -> &Bbox {
        &self.bbox
    }

    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    pub fn thermal_band(&self) -> &str {
        &self.thermal_band
    }

    pub fn statistics(&self) -> &[Statistic] {
        &self.statistics
    }

    pub fn yearly_anomalies(&self) -> bool {
        self.yearly_anomalies
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn name_prefix(&self) -> &str {
        &self.name_prefix
    }

    pub fn period_generator(&self) -> PeriodGenerator {
        PeriodGenerator::new(self.start_date, self.end_date)
    }

    /// Explicitly listed periods, otherwise every year the date range touches.
    pub fn periods(&self) -> Vec<Period> {
        match &self.periods {
            Some(years) => years.iter().copied().map(Period::year).collect(),
            None => self.period_generator().generate_period_series(),
        }
    }
}
