//! Timestamp source consumed by the model when notes and outputs are appended.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// Deterministic clock for tests and replays. Time only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
  current: Mutex<DateTime<Utc>>,
}

impl ManualClock {
  pub fn new(start: DateTime<Utc>) -> Self {
    Self { current: Mutex::new(start) }
  }

  pub fn advance(&self, by: Duration) {
    let mut cur = self.current.lock().unwrap_or_else(|p| p.into_inner());
    *cur += by;
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    *self.current.lock().unwrap_or_else(|p| p.into_inner())
  }
}

/// Next stamp for an append-only sequence: `now`, unless that would not be
/// strictly after `last`, in which case one microsecond past `last`.
pub fn next_stamp(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
  match last {
    Some(prev) if now <= prev => prev + Duration::microseconds(1),
    _ => now,
  }
}
