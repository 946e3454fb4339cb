//! Event lifecycle derived from wall-clock time.
//!
//! Nothing here is stored. Status is recomputed from `(start, end, now)` on
//! every tick, so the same inputs always give the same answer.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventState {
    Upcoming,
    Ongoing,
    Finished,
    /// Start or end is missing; the event can never leave this state.
    InfoMissing,
}

impl EventState {
    pub fn label(self) -> &'static str {
        match self {
            EventState::Upcoming => "Upcoming",
            EventState::Ongoing => "Ongoing",
            EventState::Finished => "Finished",
            EventState::InfoMissing => "Info missing",
        }
    }

    pub fn is_finished(self) -> bool {
        self == EventState::Finished
    }
}

impl fmt::Display for EventState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Time left in an ongoing event, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Remaining(u64);

impl Remaining {
    pub fn from_secs(secs: u64) -> Self {
        Remaining(secs)
    }

    pub fn as_secs(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Remaining {
    /// `HH:MM:SS`, zero padded. Hours are not wrapped at 24.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / 3600;
        let minutes = (self.0 % 3600) / 60;
        let seconds = self.0 % 60;
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub state: EventState,
    /// Only set while the event is ongoing.
    pub remaining: Option<Remaining>,
}

impl StatusReport {
    fn without_countdown(state: EventState) -> Self {
        StatusReport {
            state,
            remaining: None,
        }
    }
}

/// Classify an event at instant `now`.
///
/// `now == start` is already ongoing. Once `end - now` is zero or less the
/// event is finished, so `now == end` reports `Finished`.
pub fn compute_status(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> StatusReport {
    let (Some(start), Some(end)) = (start, end) else {
        return StatusReport::without_countdown(EventState::InfoMissing);
    };

    if now < start {
        return StatusReport::without_countdown(EventState::Upcoming);
    }

    let diff = end - now;
    if diff <= Duration::zero() {
        return StatusReport::without_countdown(EventState::Finished);
    }

    StatusReport {
        state: EventState::Ongoing,
        remaining: Some(Remaining::from_secs(diff.num_seconds().max(0) as u64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_missing_instants_are_info_missing() {
        let n = now();
        for (start, end) in [(None, Some(n)), (Some(n), None), (None, None)] {
            let report = compute_status(start, end, n);
            assert_eq!(report.state, EventState::InfoMissing);
            assert_eq!(report.remaining, None);
        }
    }

    #[test]
    fn test_before_start_is_upcoming() {
        let n = now();
        let report = compute_status(Some(n + Duration::seconds(1)), Some(n + Duration::hours(1)), n);
        assert_eq!(report.state, EventState::Upcoming);
        assert_eq!(report.remaining, None);
    }

    #[test]
    fn test_start_instant_is_ongoing() {
        let n = now();
        let report = compute_status(Some(n), Some(n + Duration::minutes(90)), n);
        assert_eq!(report.state, EventState::Ongoing);
        assert_eq!(report.remaining.unwrap().to_string(), "01:30:00");
    }

    #[test]
    fn test_end_instant_is_finished() {
        let n = now();
        let report = compute_status(Some(n - Duration::hours(1)), Some(n), n);
        assert_eq!(report.state, EventState::Finished);
        assert_eq!(report.remaining, None);
    }

    #[test]
    fn test_ongoing_with_countdown() {
        let n = now();
        let report = compute_status(
            Some(n - Duration::minutes(10)),
            Some(n + Duration::minutes(5)),
            n,
        );
        assert_eq!(report.state, EventState::Ongoing);
        assert_eq!(report.remaining.unwrap().to_string(), "00:05:00");
    }

    #[test]
    fn test_sub_second_remainder_truncated() {
        let n = now();
        let report = compute_status(
            Some(n - Duration::minutes(1)),
            Some(n + Duration::milliseconds(1500)),
            n,
        );
        assert_eq!(report.state, EventState::Ongoing);
        assert_eq!(report.remaining.unwrap().to_string(), "00:00:01");

        let last_moment = compute_status(
            Some(n - Duration::minutes(1)),
            Some(n + Duration::milliseconds(400)),
            n,
        );
        assert_eq!(last_moment.state, EventState::Ongoing);
        assert_eq!(last_moment.remaining.unwrap().to_string(), "00:00:00");
    }

    #[test]
    fn test_after_end_is_finished() {
        let n = now();
        let report = compute_status(Some(n - Duration::hours(2)), Some(n - Duration::seconds(1)), n);
        assert_eq!(report.state, EventState::Finished);
        assert_eq!(report.remaining, None);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let n = now();
        let start = Some(n - Duration::minutes(3));
        let end = Some(n + Duration::seconds(42));
        assert_eq!(compute_status(start, end, n), compute_status(start, end, n));
    }

    #[test]
    fn test_remaining_format() {
        assert_eq!(Remaining::from_secs(0).to_string(), "00:00:00");
        assert_eq!(Remaining::from_secs(3_661).to_string(), "01:01:01");
        assert_eq!(Remaining::from_secs(100 * 3600 + 5).to_string(), "100:00:05");
    }
}
