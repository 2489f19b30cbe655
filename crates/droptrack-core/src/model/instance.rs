use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::{InstanceId, Timestamp};

/// Fields of a freshly announced instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInstance {
    pub correlation_id: String,
    pub name: String,
    pub difficulty: i64,
    pub start: Timestamp,
}

/// One dungeon run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: InstanceId,
    /// Protocol-assigned identifier, unique across all runs.
    pub correlation_id: String,
    pub name: String,
    pub difficulty: i64,
    pub start: Timestamp,
    pub end: Option<Timestamp>,
}

impl Instance {
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Whether `time` falls inside the run's window.
    pub fn contains(&self, time: Timestamp) -> bool {
        self.start <= time && self.end.is_none_or(|end| time <= end)
    }

    /// Set the end time once; later calls leave it untouched.
    pub fn close(&mut self, time: Timestamp) -> bool {
        if self.end.is_some() {
            return false;
        }
        self.end = Some(time);
        true
    }

    /// Elapsed time, measured to `now` while the run is open.
    pub fn duration(&self, now: Timestamp) -> Duration {
        self.end.unwrap_or(now) - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn instance() -> Instance {
        Instance {
            id: 1,
            correlation_id: "abc".to_string(),
            name: "Crypt".to_string(),
            difficulty: 2,
            start: Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap(),
            end: None,
        }
    }

    #[test]
    fn test_close_only_once() {
        let mut inst = instance();
        let first = Utc.with_ymd_and_hms(2025, 1, 1, 10, 30, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2025, 1, 1, 11, 0, 0).unwrap();

        assert!(inst.close(first));
        assert!(!inst.close(second));
        assert_eq!(inst.end, Some(first));
    }

    #[test]
    fn test_contains() {
        let mut inst = instance();
        let before = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let during = Utc.with_ymd_and_hms(2025, 1, 1, 10, 10, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();

        assert!(!inst.contains(before));
        assert!(inst.contains(during));
        assert!(inst.contains(after));

        inst.close(Utc.with_ymd_and_hms(2025, 1, 1, 11, 0, 0).unwrap());
        assert!(!inst.contains(after));
    }

    #[test]
    fn test_duration() {
        let mut inst = instance();
        inst.close(Utc.with_ymd_and_hms(2025, 1, 1, 10, 12, 30).unwrap());
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(inst.duration(now).num_seconds(), 750);
    }
}
