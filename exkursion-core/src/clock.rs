//! Time source for record timestamps.

use chrono::{DateTime, Utc};

/// Supplies the current time to the stores.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that advances one second on every reading.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct SteppingClock {
    next: std::sync::Mutex<DateTime<Utc>>,
}

#[cfg(test)]
impl SteppingClock {
    pub(crate) fn starting_at(start: &str) -> Self {
        let start = DateTime::parse_from_rfc3339(start)
            .unwrap()
            .with_timezone(&Utc);
        Self {
            next: std::sync::Mutex::new(start),
        }
    }
}

#[cfg(test)]
impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().unwrap();
        let current = *next;
        *next = current + chrono::Duration::seconds(1);
        current
    }
}
