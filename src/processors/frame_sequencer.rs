use crate::error::{ProcessingError, Result};
use chrono::{Duration, NaiveDateTime};

/// Animation instants `start, start + step, ...` up to and including `end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSequence {
    start: NaiveDateTime,
    end: NaiveDateTime,
    step: Duration,
}

impl FrameSequence {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, step: Duration) -> Result<Self> {
        if step <= Duration::zero() {
            return Err(ProcessingError::InvalidDuration {
                name: "step",
                seconds: step.num_seconds(),
            });
        }

        Ok(Self { start, end, step })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn iter(&self) -> FrameInstants {
        FrameInstants {
            next: Some(self.start),
            end: self.end,
            step: self.step,
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn instants(&self) -> Vec<NaiveDateTime> {
        self.iter().collect()
    }
}

impl IntoIterator for &FrameSequence {
    type Item = NaiveDateTime;
    type IntoIter = FrameInstants;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct FrameInstants {
    next: Option<NaiveDateTime>,
    end: NaiveDateTime,
    step: Duration,
}

impl Iterator for FrameInstants {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|t| *t <= self.end)?;
        self.next = current.checked_add_signed(self.step);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 8, 21)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_inclusive_end_on_step_boundary() {
        let sequence = FrameSequence::new(at(15, 0), at(16, 0), Duration::minutes(10)).unwrap();

        assert_eq!(
            sequence.instants(),
            vec![
                at(15, 0),
                at(15, 10),
                at(15, 20),
                at(15, 30),
                at(15, 40),
                at(15, 50),
                at(16, 0)
            ]
        );
        assert_eq!(sequence.len(), 7);
    }

    #[test]
    fn test_end_off_boundary() {
        let sequence = FrameSequence::new(at(15, 0), at(15, 25), Duration::minutes(10)).unwrap();
        assert_eq!(sequence.instants(), vec![at(15, 0), at(15, 10), at(15, 20)]);
    }

    #[test]
    fn test_single_and_empty_sequences() {
        let single = FrameSequence::new(at(15, 0), at(15, 0), Duration::minutes(10)).unwrap();
        assert_eq!(single.instants(), vec![at(15, 0)]);

        let empty = FrameSequence::new(at(16, 0), at(15, 0), Duration::minutes(10)).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.len(), 0);
    }

    #[test]
    fn test_non_positive_step_rejected() {
        assert!(FrameSequence::new(at(15, 0), at(16, 0), Duration::zero()).is_err());
        assert!(FrameSequence::new(at(15, 0), at(16, 0), Duration::minutes(-10)).is_err());
    }

    #[test]
    fn test_full_eclipse_day() {
        let sequence = FrameSequence::new(at(15, 0), at(21, 0), Duration::minutes(10)).unwrap();
        let instants: Vec<NaiveDateTime> = (&sequence).into_iter().collect();

        assert_eq!(instants.len(), 37);
        assert_eq!(instants.last(), Some(&at(21, 0)));
    }
}
