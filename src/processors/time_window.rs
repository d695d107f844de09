use crate::error::Result;
use crate::models::Observation;
use crate::utils::time::ensure_non_negative;
use chrono::{Duration, NaiveDateTime};

/// Closed interval `[center - tolerance, center + tolerance]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    center: NaiveDateTime,
    tolerance: Duration,
}

impl TimeWindow {
    pub fn new(center: NaiveDateTime, tolerance: Duration) -> Result<Self> {
        ensure_non_negative("tolerance", tolerance)?;
        Ok(Self::from_validated(center, tolerance))
    }

    /// Caller guarantees a non-negative tolerance
    pub(crate) fn from_validated(center: NaiveDateTime, tolerance: Duration) -> Self {
        Self { center, tolerance }
    }

    pub fn center(&self) -> NaiveDateTime {
        self.center
    }

    pub fn tolerance(&self) -> Duration {
        self.tolerance
    }

    pub fn start(&self) -> NaiveDateTime {
        self.center
            .checked_sub_signed(self.tolerance)
            .unwrap_or(NaiveDateTime::MIN)
    }

    pub fn end(&self) -> NaiveDateTime {
        self.center
            .checked_add_signed(self.tolerance)
            .unwrap_or(NaiveDateTime::MAX)
    }

    pub fn contains(&self, instant: &NaiveDateTime) -> bool {
        *instant >= self.start() && *instant <= self.end()
    }

    /// An observation without a timestamp is never inside a window
    pub fn contains_observation(&self, observation: &Observation) -> bool {
        observation
            .valid
            .as_ref()
            .is_some_and(|valid| self.contains(valid))
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start() <= other.end() && other.start() <= self.end()
    }

    /// Rows inside the window, in input order
    pub fn select<'a>(&self, observations: &'a [Observation]) -> Vec<&'a Observation> {
        let (start, end) = (self.start(), self.end());
        observations
            .iter()
            .filter(|o| o.valid.is_some_and(|valid| valid >= start && valid <= end))
            .collect()
    }
}

/// Select every observation within `tolerance` of `center`
pub fn select_within(
    observations: &[Observation],
    center: NaiveDateTime,
    tolerance: Duration,
) -> Result<Vec<&Observation>> {
    Ok(TimeWindow::new(center, tolerance)?.select(observations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 8, 21)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn obs(station: &str, valid: Option<NaiveDateTime>) -> Observation {
        Observation::new(station, valid, Some(-90.0), Some(38.0), Some(75.0))
    }

    #[test]
    fn test_select_within_inclusive_bounds() {
        let observations = vec![
            obs("A", Some(at(15, 49))),
            obs("B", Some(at(15, 50))),
            obs("C", Some(at(16, 0))),
            obs("D", Some(at(16, 10))),
            obs("E", Some(at(16, 11))),
            obs("F", None),
        ];

        let selected = select_within(&observations, at(16, 0), Duration::minutes(10)).unwrap();
        let stations: Vec<&str> = selected.iter().map(|o| o.station.as_str()).collect();

        assert_eq!(stations, ["B", "C", "D"]);
    }

    #[test]
    fn test_select_within_sound_and_complete() {
        // One observation per minute over three hours, every second one duplicated
        let mut observations = Vec::new();
        for minute in 0..180 {
            let valid = at(15, 0) + Duration::minutes(minute);
            observations.push(obs("A", Some(valid)));
            if minute % 2 == 0 {
                observations.push(obs("B", Some(valid)));
            }
        }
        observations.push(obs("NULL", None));

        for tolerance in [0, 1, 5, 10, 30] {
            let center = at(16, 0);
            let tolerance = Duration::minutes(tolerance);
            let selected = select_within(&observations, center, tolerance).unwrap();

            // Soundness
            for o in &selected {
                let valid = o.valid.unwrap();
                assert!(valid >= center - tolerance && valid <= center + tolerance);
            }

            // Completeness
            let expected = observations
                .iter()
                .filter(|o| {
                    o.valid
                        .map(|v| v >= center - tolerance && v <= center + tolerance)
                        .unwrap_or(false)
                })
                .count();
            assert_eq!(selected.len(), expected);
        }
    }

    #[test]
    fn test_zero_tolerance_is_point_match() {
        let observations = vec![
            obs("A", Some(at(16, 0))),
            obs("B", Some(at(16, 1))),
            obs("C", Some(at(16, 0))),
        ];

        let selected = select_within(&observations, at(16, 0), Duration::zero()).unwrap();
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|o| o.valid == Some(at(16, 0))));

        let none = select_within(&observations, at(15, 59), Duration::zero()).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let result = select_within(&[], at(16, 0), Duration::minutes(-1));
        assert!(matches!(
            result,
            Err(ProcessingError::InvalidDuration { name: "tolerance", .. })
        ));
    }

    #[test]
    fn test_window_overlap() {
        let early = TimeWindow::new(at(15, 0), Duration::minutes(10)).unwrap();
        let late = TimeWindow::new(at(16, 0), Duration::minutes(10)).unwrap();
        assert!(!early.overlaps(&late));

        let wide = TimeWindow::new(at(15, 0), Duration::minutes(30)).unwrap();
        let wide_late = TimeWindow::new(at(16, 0), Duration::minutes(30)).unwrap();
        assert!(wide.overlaps(&wide_late));
        assert!(wide.contains_observation(&obs("A", Some(at(15, 30)))));
        assert!(!wide.contains_observation(&obs("A", None)));
    }
}
