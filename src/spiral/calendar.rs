use serde::{Deserialize, Serialize};
use time::{Date, Month, OffsetDateTime};

use super::error::{SpiralError, SpiralResult};

pub const MONTHS_PER_YEAR: usize = 12;

pub const MONTH_NAMES: [&str; MONTHS_PER_YEAR] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Short English name for a zero-based month index.
#[must_use]
pub fn month_name(month_index: usize) -> Option<&'static str> {
    MONTH_NAMES.get(month_index).copied()
}

/// Inclusive range of calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeRange {
    pub start_year: i32,
    pub end_year: i32,
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::new(2000, 2032)
    }
}

impl TimeRange {
    #[must_use]
    pub const fn new(start_year: i32, end_year: i32) -> Self {
        Self {
            start_year,
            end_year,
        }
    }

    pub fn validate(&self) -> SpiralResult<()> {
        if self.start_year > self.end_year {
            return Err(SpiralError::InvalidRange {
                start_year: self.start_year,
                end_year: self.end_year,
            });
        }
        Ok(())
    }

    /// Number of years covered. Zero for an inverted range.
    #[must_use]
    pub fn years(&self) -> usize {
        let span = i64::from(self.end_year) - i64::from(self.start_year) + 1;
        usize::try_from(span).unwrap_or(0)
    }

    #[must_use]
    pub fn month_count(&self) -> usize {
        self.years() * MONTHS_PER_YEAR
    }

    /// Every month in the range, oldest first.
    pub fn months(&self) -> impl Iterator<Item = CalendarMonth> + '_ {
        (0..self.month_count()).map(move |i| CalendarMonth {
            year: self.start_year + (i / MONTHS_PER_YEAR) as i32,
            month_index: i % MONTHS_PER_YEAR,
        })
    }

    /// Position of `(year, month_index)` in [`TimeRange::months`].
    #[must_use]
    pub fn ordinal_of(&self, year: i32, month_index: usize) -> Option<usize> {
        if month_index >= MONTHS_PER_YEAR || year < self.start_year || year > self.end_year {
            return None;
        }
        let year_offset = usize::try_from(year - self.start_year).ok()?;
        Some(year_offset * MONTHS_PER_YEAR + month_index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub year: i32,
    /// Zero-based, January is 0.
    pub month_index: usize,
}

impl CalendarMonth {
    #[must_use]
    pub fn of_date(date: Date) -> Self {
        Self {
            year: date.year(),
            month_index: usize::from(u8::from(date.month()) - 1),
        }
    }

    /// Month containing the current UTC date.
    #[must_use]
    pub fn current() -> Self {
        Self::of_date(OffsetDateTime::now_utc().date())
    }

    #[must_use]
    pub fn month(&self) -> Month {
        Month::January.nth_next(self.month_index as u8)
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        month_name(self.month_index).unwrap_or("???")
    }

    #[must_use]
    pub fn days(&self) -> u8 {
        time::util::days_in_year_month(self.year, self.month())
    }

    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.name(), self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn months_are_chronological() {
        let range = TimeRange::new(1999, 2000);
        let months: Vec<_> = range.months().collect();
        assert_eq!(months.len(), 24);
        assert_eq!(months[0], CalendarMonth { year: 1999, month_index: 0 });
        assert_eq!(months[11], CalendarMonth { year: 1999, month_index: 11 });
        assert_eq!(months[12], CalendarMonth { year: 2000, month_index: 0 });
        assert_eq!(range.ordinal_of(2000, 3), Some(15));
        assert_eq!(range.ordinal_of(2001, 0), None);
        assert_eq!(range.ordinal_of(2000, 12), None);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let range = TimeRange::new(2010, 2009);
        assert_eq!(range.years(), 0);
        assert!(matches!(
            range.validate(),
            Err(SpiralError::InvalidRange { start_year: 2010, end_year: 2009 })
        ));
        assert!(TimeRange::new(2010, 2010).validate().is_ok());
    }

    #[test]
    fn day_counts_follow_leap_years() {
        assert_eq!(CalendarMonth { year: 2000, month_index: 1 }.days(), 29);
        assert_eq!(CalendarMonth { year: 1900, month_index: 1 }.days(), 28);
        assert_eq!(CalendarMonth { year: 2023, month_index: 3 }.days(), 30);
        assert_eq!(CalendarMonth { year: 2023, month_index: 11 }.days(), 31);
    }

    #[test]
    fn labels_and_dates() {
        let month = CalendarMonth::of_date(date!(2024 - 03 - 17));
        assert_eq!(month, CalendarMonth { year: 2024, month_index: 2 });
        assert_eq!(month.month(), Month::March);
        assert_eq!(month.label(), "Mar 2024");
        assert_eq!(month_name(12), None);
    }
}
