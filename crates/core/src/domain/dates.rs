use chrono::{DateTime, NaiveDate};

/// Parses a stored record date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps, and any text whose first ten
/// characters form a calendar date (`2025-06-26 08:30:00`). Anything else
/// yields `None`, which every period comparison treats as "not in bucket".
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.date_naive());
    }

    trimmed.get(..10).and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// A record that carries the date it is bucketed by.
pub trait Dated {
    fn record_date(&self) -> Option<NaiveDate>;
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::parse_record_date;

    #[test]
    fn parses_plain_calendar_dates() {
        assert_eq!(parse_record_date("2025-06-26"), NaiveDate::from_ymd_opt(2025, 6, 26));
    }

    #[test]
    fn parses_timestamps_by_their_date_part() {
        assert_eq!(
            parse_record_date("2025-06-26T23:10:00+05:30"),
            NaiveDate::from_ymd_opt(2025, 6, 26)
        );
        assert_eq!(parse_record_date("2025-06-26 08:30:00"), NaiveDate::from_ymd_opt(2025, 6, 26));
    }

    #[test]
    fn rejects_garbage_without_error() {
        assert_eq!(parse_record_date(""), None);
        assert_eq!(parse_record_date("not-a-date"), None);
        assert_eq!(parse_record_date("2025-13-40"), None);
    }
}
