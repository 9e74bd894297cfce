//! Per-request timing state.
//!
//! # Responsibilities
//! - Remember when the request started
//! - Accumulate database time reported by the query timer
//! - Derive duration, db and view time for the access record
//!
//! # Design Decisions
//! - Methods take `now` explicitly so a single clock reading serves every
//!   derived value of one record
//! - "Unknown" is `None`; a zero duration or zero db time also counts as
//!   unknown when deriving view time

/// Timing collected over the life of one request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RequestTiming {
    request_start: Option<f64>,
    db_time: Option<f64>,
}

impl RequestTiming {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the request start. Only the first call has any effect.
    pub fn mark_start(&mut self, now: f64) {
        if self.request_start.is_none() {
            self.request_start = Some(now);
        }
    }

    pub fn request_start(&self) -> Option<f64> {
        self.request_start
    }

    /// Add time spent in one database query.
    ///
    /// Negative deltas (wall clock stepped backwards) are discarded so the
    /// accumulated value never decreases.
    pub fn record_db_time(&mut self, delta: f64) {
        if delta.is_nan() || delta < 0.0 {
            return;
        }
        *self.db_time.get_or_insert(0.0) += delta;
    }

    /// Elapsed milliseconds since `mark_start`, if it ever ran.
    pub fn duration(&self, now: f64) -> Option<f64> {
        self.request_start.map(|start| now - start)
    }

    pub fn db_time(&self) -> Option<f64> {
        self.db_time
    }

    /// Freeze every derived value against one clock reading.
    pub fn snapshot(&self, now: f64) -> TimingSnapshot {
        TimingSnapshot {
            duration: self.duration(now),
            db: self.db_time(),
        }
    }
}

/// Timing values as they go into one access record.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimingSnapshot {
    pub duration: Option<f64>,
    pub db: Option<f64>,
}

impl TimingSnapshot {
    /// `duration - db`, only when both are known and non-zero.
    pub fn view(&self) -> Option<f64> {
        match (self.duration, self.db) {
            (Some(duration), Some(db)) if duration != 0.0 && db != 0.0 => Some(duration - db),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_unknown_without_start() {
        let timing = RequestTiming::new();
        assert_eq!(timing.duration(100.0), None);
    }

    #[test]
    fn mark_start_keeps_first_value() {
        let mut timing = RequestTiming::new();
        timing.mark_start(10.0);
        timing.mark_start(50.0);
        assert_eq!(timing.request_start(), Some(10.0));
        assert_eq!(timing.duration(15.0), Some(5.0));
    }

    #[test]
    fn db_time_accumulates() {
        let mut timing = RequestTiming::new();
        assert_eq!(timing.db_time(), None);
        timing.record_db_time(1.5);
        timing.record_db_time(2.0);
        assert_eq!(timing.db_time(), Some(3.5));
    }

    #[test]
    fn db_time_never_decreases() {
        let mut timing = RequestTiming::new();
        timing.record_db_time(4.0);
        timing.record_db_time(-3.0);
        timing.record_db_time(f64::NAN);
        assert_eq!(timing.db_time(), Some(4.0));
    }

    #[test]
    fn view_is_duration_minus_db() {
        let snapshot = TimingSnapshot {
            duration: Some(1.0),
            db: Some(0.1),
        };
        assert_eq!(snapshot.view(), Some(0.9));
    }

    #[test]
    fn view_unknown_when_either_side_is_zero_or_missing() {
        let cases = [
            (Some(0.0), Some(0.1)),
            (Some(1.0), Some(0.0)),
            (None, Some(0.1)),
            (Some(1.0), None),
        ];
        for (duration, db) in cases {
            let snapshot = TimingSnapshot { duration, db };
            assert_eq!(snapshot.view(), None, "duration={duration:?} db={db:?}");
        }
    }

    #[test]
    fn snapshot_uses_single_reading() {
        let mut timing = RequestTiming::new();
        timing.mark_start(100.0);
        timing.record_db_time(3.0);
        let snapshot = timing.snapshot(110.0);
        assert_eq!(snapshot.duration, Some(10.0));
        assert_eq!(snapshot.db, Some(3.0));
        assert_eq!(snapshot.view(), Some(7.0));
    }
}
