use chrono::{Datelike, Duration, NaiveDate};
use std::fmt;

/// One year of observations, from January 1st up to but excluding
/// December 31st.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period {
    year: i32,
}

impl Period {
    pub fn year(year: i32) -> Self {
        Self { year }
    }

    pub fn value(&self) -> i32 {
        self.year
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && (date.month(), date.day()) != (12, 31)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.year)
    }
}

/// Yields the calendar years touched by the half-open range `[start, end)`.
#[derive(Debug, Clone)]
pub struct PeriodGenerator {
    start: NaiveDate,
    end: NaiveDate,
}

impl PeriodGenerator {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Year of the last day inside the range, `None` for an empty range.
    pub fn last_year(&self) -> Option<i32> {
        (self.start < self.end).then(|| (self.end - Duration::days(1)).year())
    }

    pub fn first_year(&self) -> Option<i32> {
        (self.start < self.end).then(|| self.start.year())
    }

    pub fn generate_period_series(&self) -> Vec<Period> {
        match (self.first_year(), self.last_year()) {
            (Some(first), Some(last)) => (first..=last).map(Period::year).collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_generate_period_series() {
        let generator = PeriodGenerator::new(date(2014, 5, 1), date(2022, 10, 1));
        let series = generator.generate_period_series();

        assert_eq!(series.len(), 9);
        assert_eq!(series.first(), Some(&Period::year(2014)));
        assert_eq!(series.last(), Some(&Period::year(2022)));
    }

    #[test]
    fn test_exclusive_end_on_new_year() {
        let generator = PeriodGenerator::new(date(2019, 6, 1), date(2021, 1, 1));
        assert_eq!(generator.last_year(), Some(2020));
        assert_eq!(
            generator.generate_period_series(),
            vec![Period::year(2019), Period::year(2020)]
        );
    }

    #[test]
    fn test_empty_range() {
        let generator = PeriodGenerator::new(date(2020, 1, 1), date(2020, 1, 1));
        assert!(generator.generate_period_series().is_empty());
    }

    #[test]
    fn test_period_contains() {
        let period = Period::year(2020);
        assert!(period.contains(date(2020, 1, 1)));
        assert!(period.contains(date(2020, 12, 30)));
        assert!(!period.contains(date(2021, 1, 1)));
        assert!(!period.contains(date(2019, 12, 31)));
        assert_eq!(period.to_string(), "2020");
    }

    #[test]
    fn test_period_excludes_new_years_eve() {
        assert!(!Period::year(2020).contains(date(2020, 12, 31)));
        assert!(!Period::year(2021).contains(date(2021, 12, 31)));
        assert!(Period::year(2021).contains(date(2021, 12, 30)));
    }
}
