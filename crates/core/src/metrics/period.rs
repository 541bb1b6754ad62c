//! Period selection and time-bucketed series.
//!
//! Daily, monthly and quarterly buckets follow calendar boundaries. Weekly
//! buckets are rolling seven-day windows ending on the reference day.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::dates::Dated;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Quarterly,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
        }
    }

    /// Number of buckets in a generated series.
    pub fn bucket_count(&self) -> u32 {
        match self {
            Self::Daily => 7,
            Self::Weekly => 4,
            Self::Monthly => 6,
            Self::Quarterly => 4,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            other => Err(DomainError::InvalidPeriod(other.to_string())),
        }
    }
}

/// An inclusive date range with its display label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BucketRange {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BucketRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeriesBucket {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total: f64,
    pub count: usize,
}

/// Zero-based quarter of the year: January-March is 0.
pub fn quarter_index(date: NaiveDate) -> u32 {
    date.month0() / 3
}

/// Whether `date` lies in the current bucket of `period` relative to `today`.
pub fn in_current_bucket(date: NaiveDate, period: Period, today: NaiveDate) -> bool {
    match period {
        Period::Daily => date == today,
        Period::Weekly => match today.checked_sub_days(Days::new(6)) {
            Some(window_start) => window_start <= date && date <= today,
            None => date <= today,
        },
        Period::Monthly => date.year() == today.year() && date.month() == today.month(),
        Period::Quarterly => {
            date.year() == today.year() && quarter_index(date) == quarter_index(today)
        }
    }
}

/// Records whose date falls in the current bucket. Undated records are dropped.
pub fn filter_current<T: Dated>(records: &[T], period: Period, today: NaiveDate) -> Vec<&T> {
    records
        .iter()
        .filter(|record| {
            record.record_date().is_some_and(|date| in_current_bucket(date, period, today))
        })
        .collect()
}

/// Sum of `value_of` over the records in the current bucket.
pub fn sum_current<T: Dated>(
    records: &[T],
    period: Period,
    today: NaiveDate,
    value_of: impl Fn(&T) -> f64,
) -> f64 {
    filter_current(records, period, today).into_iter().map(value_of).sum()
}

/// The trailing buckets of `period` ending at `today`, oldest first.
pub fn bucket_ranges(period: Period, today: NaiveDate) -> Vec<BucketRange> {
    (0..period.bucket_count()).rev().filter_map(|back| bucket_range(period, today, back)).collect()
}

fn bucket_range(period: Period, today: NaiveDate, back: u32) -> Option<BucketRange> {
    match period {
        Period::Daily => {
            let day = today.checked_sub_days(Days::new(u64::from(back)))?;
            Some(BucketRange { label: day.format("%a").to_string(), start: day, end: day })
        }
        Period::Weekly => {
            let end = today.checked_sub_days(Days::new(7 * u64::from(back)))?;
            let start = end.checked_sub_days(Days::new(6))?;
            let number = Period::Weekly.bucket_count() - back;
            Some(BucketRange { label: format!("Week {number}"), start, end })
        }
        Period::Monthly => {
            let start = today.with_day(1)?.checked_sub_months(Months::new(back))?;
            let end = last_day_of_month(start)?;
            Some(BucketRange { label: start.format("%b").to_string(), start, end })
        }
        Period::Quarterly => {
            let current_quarter_start =
                NaiveDate::from_ymd_opt(today.year(), quarter_index(today) * 3 + 1, 1)?;
            let start = current_quarter_start.checked_sub_months(Months::new(3 * back))?;
            let end = start.checked_add_months(Months::new(3))?.pred_opt()?;
            let label = format!("Q{} {}", quarter_index(start) + 1, start.year());
            Some(BucketRange { label, start, end })
        }
    }
}

pub(crate) fn last_day_of_month(first: NaiveDate) -> Option<NaiveDate> {
    first.with_day(1)?.checked_add_months(Months::new(1))?.pred_opt()
}

/// Sums `value_of` per bucket over the trailing buckets of `period`.
pub fn series<T: Dated>(
    records: &[T],
    period: Period,
    today: NaiveDate,
    value_of: impl Fn(&T) -> f64,
) -> Vec<SeriesBucket> {
    let dated: Vec<(NaiveDate, &T)> = records
        .iter()
        .filter_map(|record| record.record_date().map(|date| (date, record)))
        .collect();

    bucket_ranges(period, today)
        .into_iter()
        .map(|range| {
            let (total, count) = dated
                .iter()
                .filter(|(date, _)| range.contains(*date))
                .fold((0.0, 0), |(total, count), (_, record)| {
                    (total + value_of(*record), count + 1)
                });
            SeriesBucket { label: range.label, start: range.start, end: range.end, total, count }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{
        bucket_ranges, filter_current, in_current_bucket, quarter_index, series, sum_current,
        Period,
    };
    use crate::domain::dates::{parse_record_date, Dated};

    struct Entry {
        date: &'static str,
        litres: f64,
    }

    impl Dated for Entry {
        fn record_date(&self) -> Option<NaiveDate> {
            parse_record_date(self.date)
        }
    }

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn period_parses_case_insensitively() {
        assert_eq!("Weekly".parse::<Period>().expect("weekly"), Period::Weekly);
        assert_eq!(" QUARTERLY ".parse::<Period>().expect("quarterly"), Period::Quarterly);
        assert!("yearly".parse::<Period>().is_err());
    }

    #[test]
    fn quarter_index_groups_months_by_three() {
        assert_eq!(quarter_index(day(2025, 1, 1)), 0);
        assert_eq!(quarter_index(day(2025, 3, 31)), 0);
        assert_eq!(quarter_index(day(2025, 4, 1)), 1);
        assert_eq!(quarter_index(day(2025, 12, 31)), 3);
    }

    #[test]
    fn weekly_is_rolling_while_monthly_is_calendar_aligned() {
        let today = day(2025, 7, 2);

        assert!(in_current_bucket(day(2025, 6, 26), Period::Weekly, today));
        assert!(!in_current_bucket(day(2025, 6, 25), Period::Weekly, today));
        assert!(!in_current_bucket(day(2025, 7, 3), Period::Weekly, today));

        assert!(!in_current_bucket(day(2025, 6, 30), Period::Monthly, today));
        assert!(in_current_bucket(day(2025, 7, 31), Period::Monthly, today));
        assert!(!in_current_bucket(day(2024, 7, 2), Period::Monthly, today));
    }

    #[test]
    fn quarterly_requires_same_year_and_quarter() {
        let today = day(2025, 5, 15);
        assert!(in_current_bucket(day(2025, 4, 1), Period::Quarterly, today));
        assert!(!in_current_bucket(day(2025, 3, 31), Period::Quarterly, today));
        assert!(!in_current_bucket(day(2024, 5, 15), Period::Quarterly, today));
    }

    #[test]
    fn invalid_dates_are_silently_excluded() {
        let today = day(2025, 6, 26);
        let entries = vec![
            Entry { date: "2025-06-26", litres: 10.0 },
            Entry { date: "garbage", litres: 99.0 },
            Entry { date: "", litres: 99.0 },
        ];

        assert_eq!(filter_current(&entries, Period::Daily, today).len(), 1);
        assert_eq!(sum_current(&entries, Period::Monthly, today, |entry| entry.litres), 10.0);
    }

    #[test]
    fn bucket_ranges_have_expected_counts_and_labels() {
        let today = day(2025, 6, 26);

        let daily = bucket_ranges(Period::Daily, today);
        assert_eq!(daily.len(), 7);
        assert_eq!(daily.last().map(|range| range.label.as_str()), Some("Thu"));

        let weekly = bucket_ranges(Period::Weekly, today);
        assert_eq!(weekly.len(), 4);
        assert_eq!(weekly[0].label, "Week 1");
        assert_eq!(weekly[3].end, today);
        assert_eq!(weekly[3].start, day(2025, 6, 20));

        let monthly = bucket_ranges(Period::Monthly, today);
        let labels: Vec<&str> = monthly.iter().map(|range| range.label.as_str()).collect();
        assert_eq!(labels, vec!["Jan", "Feb", "Mar", "Apr", "May", "Jun"]);
        assert_eq!(monthly[1].end, day(2025, 2, 28));

        let quarterly = bucket_ranges(Period::Quarterly, today);
        let labels: Vec<&str> = quarterly.iter().map(|range| range.label.as_str()).collect();
        assert_eq!(labels, vec!["Q3 2024", "Q4 2024", "Q1 2025", "Q2 2025"]);
        assert_eq!(quarterly[3].end, day(2025, 6, 30));
    }

    #[test]
    fn series_buckets_never_overlap() {
        let today = day(2025, 6, 26);
        for period in [Period::Daily, Period::Weekly, Period::Monthly, Period::Quarterly] {
            let ranges = bucket_ranges(period, today);
            for pair in ranges.windows(2) {
                assert!(pair[0].end < pair[1].start, "{period} buckets overlap: {pair:?}");
            }
        }
    }

    #[test]
    fn monthly_series_sums_per_calendar_month() {
        let today = day(2025, 6, 26);
        let entries = vec![
            Entry { date: "2025-06-01", litres: 120.0 },
            Entry { date: "2025-06-26T06:00:00Z", litres: 80.0 },
            Entry { date: "2025-05-31", litres: 50.0 },
            Entry { date: "2024-12-31", litres: 500.0 },
            Entry { date: "bogus", litres: 1000.0 },
        ];

        let buckets = series(&entries, Period::Monthly, today, |entry| entry.litres);

        assert_eq!(buckets.len(), 6);
        let june = &buckets[5];
        assert_eq!(june.label, "Jun");
        assert_eq!(june.total, 200.0);
        assert_eq!(june.count, 2);
        assert_eq!(buckets[4].total, 50.0);
        assert_eq!(buckets.iter().map(|bucket| bucket.count).sum::<usize>(), 3);
    }
}
