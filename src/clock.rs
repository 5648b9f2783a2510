//! Source of the current time.

use chrono::{DateTime, Local, TimeZone};

/// Supplies "now" together with the time zone used to read dates,
/// weekdays and times of day from it.
pub trait Clock {
    type Zone: TimeZone;

    fn now(&self) -> DateTime<Self::Zone>;
}

/// Local time of the machine (or browser) the app runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    type Zone = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
