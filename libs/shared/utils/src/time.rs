use chrono::NaiveTime;

/// Parses a 24-hour `HH:MM` string as submitted by booking and schedule
/// forms. Seconds are rejected; time-of-day comparisons across the API are
/// plain minute-of-day comparisons with no timezone conversion.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// Formats a time back to `HH:MM:SS` for PostgREST `time` columns.
pub fn to_db_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_24_hour_times() {
        assert_eq!(
            parse_hhmm("09:30"),
            Some(NaiveTime::from_hms_opt(9, 30, 0).unwrap())
        );
        assert_eq!(
            parse_hhmm("23:59"),
            Some(NaiveTime::from_hms_opt(23, 59, 0).unwrap())
        );
    }

    #[test]
    fn rejects_malformed_times() {
        assert_eq!(parse_hhmm("25:00"), None);
        assert_eq!(parse_hhmm("9am"), None);
        assert_eq!(parse_hhmm(""), None);
    }

    #[test]
    fn formats_for_time_columns() {
        let time = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        assert_eq!(to_db_time(time), "17:00:00");
    }
}
