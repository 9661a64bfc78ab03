#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("end_date must be later than start_date")]
    DateOrder,

    #[error("Failed to parse date: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("months should be between 1 and 12")]
    Months,

    #[error("max_cloud_cover should be between 0 and 100")]
    CloudCover,

    #[error("scale should be a positive ground sample distance")]
    Scale,

    #[error("at least one statistic is required")]
    NoStatistics,

    #[error("Invalid bbox: {0}")]
    Bbox(String),
}
