use crate::error::{ProcessingError, Result};
use crate::utils::constants::OBSERVATION_TIME_FORMAT;
use chrono::{Duration, NaiveDateTime};

const INSTANT_FORMATS: [&str; 4] = [
    OBSERVATION_TIME_FORMAT,
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parse an instant given on the command line or in configuration
///
/// # Examples
/// ```
/// use eclipse_obs::utils::parse_instant;
///
/// let instant = parse_instant("2017-08-21T17:30").unwrap();
/// assert_eq!(instant.to_string(), "2017-08-21 17:30:00");
/// ```
pub fn parse_instant(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();

    for format in INSTANT_FORMATS {
        if let Ok(instant) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(instant);
        }
    }

    Err(ProcessingError::InvalidFormat(format!(
        "Invalid instant: '{}'. Expected format: 'YYYY-MM-DD HH:MM'",
        value
    )))
}

/// Parse an observation timestamp, mapping anything unparseable to `None`
pub fn parse_observation_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), OBSERVATION_TIME_FORMAT).ok()
}

/// Build a duration from minutes, rejecting values chrono cannot represent
pub fn checked_minutes(name: &'static str, minutes: i64) -> Result<Duration> {
    Duration::try_minutes(minutes).ok_or(ProcessingError::InvalidDuration {
        name,
        seconds: minutes.saturating_mul(60),
    })
}

/// Build a duration from minutes, rejecting negative or out-of-range values
pub fn non_negative_minutes(name: &'static str, minutes: i64) -> Result<Duration> {
    let duration = checked_minutes(name, minutes)?;
    ensure_non_negative(name, duration)?;
    Ok(duration)
}

pub fn ensure_non_negative(name: &'static str, duration: Duration) -> Result<()> {
    if duration < Duration::zero() {
        return Err(ProcessingError::InvalidDuration {
            name,
            seconds: duration.num_seconds(),
        });
    }
    Ok(())
}

/// clap value parser for instants
pub fn instant_arg(value: &str) -> std::result::Result<NaiveDateTime, String> {
    parse_instant(value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 8, 21)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_instant_formats() {
        assert_eq!(parse_instant("2017-08-21 15:00").unwrap(), at(15, 0));
        assert_eq!(parse_instant("2017-08-21T15:10").unwrap(), at(15, 10));
        assert_eq!(parse_instant(" 2017-08-21 16:20:00 ").unwrap(), at(16, 20));
        assert!(parse_instant("21/08/2017 15:00").is_err());
    }

    #[test]
    fn test_parse_observation_time() {
        assert_eq!(parse_observation_time("2017-08-21 17:05"), Some(at(17, 5)));
        assert_eq!(parse_observation_time("valid"), None);
        assert_eq!(parse_observation_time(""), None);
        assert_eq!(parse_observation_time("2017-08-21T17:05"), None);
    }

    #[test]
    fn test_non_negative_minutes() {
        assert_eq!(non_negative_minutes("span", 60).unwrap(), Duration::hours(1));
        assert_eq!(non_negative_minutes("tolerance", 0).unwrap(), Duration::zero());
        assert!(matches!(
            non_negative_minutes("tolerance", -5),
            Err(ProcessingError::InvalidDuration { name: "tolerance", seconds: -300 })
        ));
    }

    #[test]
    fn test_out_of_range_minutes_are_rejected() {
        assert!(matches!(
            non_negative_minutes("span", i64::MAX / 2),
            Err(ProcessingError::InvalidDuration { name: "span", .. })
        ));
        assert!(matches!(
            checked_minutes("step", i64::MIN),
            Err(ProcessingError::InvalidDuration { name: "step", seconds: i64::MIN })
        ));
        assert_eq!(checked_minutes("step", -10).unwrap(), Duration::minutes(-10));
    }
}
