use serde::Deserialize;
use std::fmt;

/// Per-pixel reduction applied across a scene stack.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Statistic {
    #[serde(rename(deserialize = "mean"))]
    Mean,
    #[serde(rename(deserialize = "median"))]
    Median,
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Statistic::Mean => write!(f, "mean"),
            Statistic::Median => write!(f, "median"),
        }
    }
}

/// Inclusive month-of-year window. A start after the end wraps over the
/// new year, e.g. November to February.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub start: u32,
    pub end: u32,
}

impl MonthRange {
    pub fn new(start: u32, end: u32) -> Option<Self> {
        let valid = 1..=12;
        (valid.contains(&start) && valid.contains(&end)).then_some(Self { start, end })
    }

    pub fn contains(&self, month: u32) -> bool {
        if self.start <= self.end {
            (self.start..=self.end).contains(&month)
        } else {
            month >= self.start || month <= self.end
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summer_months() {
        let summer = MonthRange::new(6, 9).unwrap();
        assert!(!summer.contains(5));
        assert!(summer.contains(6));
        assert!(summer.contains(9));
        assert!(!summer.contains(10));
    }

    #[test]
    fn test_wrapping_months() {
        let winter = MonthRange::new(11, 2).unwrap();
        assert!(winter.contains(12));
        assert!(winter.contains(1));
        assert!(!winter.contains(6));
    }

    #[test]
    fn test_invalid_months() {
        assert!(MonthRange::new(0, 9).is_none());
        assert!(MonthRange::new(6, 13).is_none());
    }

    #[test]
    fn test_deserialize_statistic() {
        let stats: Vec<Statistic> = serde_json::from_str(r#"["median", "mean"]"#).unwrap();
        assert_eq!(stats, vec![Statistic::Median, Statistic::Mean]);
        assert!(serde_json::from_str::<Statistic>(r#""mode""#).is_err());
    }
}
