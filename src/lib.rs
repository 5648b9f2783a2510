use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Timelike,
};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

pub mod clock;
pub mod countdown;
pub mod presets;

use presets::PresetTable;

/// Default engine parameters
pub mod defaults {
    /// Offset of the target set at startup, in minutes.
    pub const DURATION_MINUTES: u32 = 60;
    /// Message rendered once the countdown has run out.
    pub const EXPIRED_MESSAGE: &str = "Times Up!";
}

static TIME_OF_DAY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeOfDayError {
    Empty,
    Format(String),
    Hour(u32),
    Minute(u32),
    Second(u32),
}

impl fmt::Display for TimeOfDayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeOfDayError::Empty => write!(f, "Time cannot be empty"),
            TimeOfDayError::Format(input) => {
                write!(f, "Invalid time '{}'. Use HH:MM or HH:MM:SS", input)
            }
            TimeOfDayError::Hour(h) => write!(f, "Invalid hour: {} (must be 0-23)", h),
            TimeOfDayError::Minute(m) => write!(f, "Invalid minute: {} (must be 0-59)", m),
            TimeOfDayError::Second(s) => write!(f, "Invalid second: {} (must be 0-59)", s),
        }
    }
}

impl std::error::Error for TimeOfDayError {}

/// A wall-clock time with whole seconds, without a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Build a time of day, rejecting out-of-range fields instead of
    /// rolling them over into the neighbouring field.
    pub fn new(hour: u32, minute: u32, second: u32) -> Result<Self, TimeOfDayError> {
        if hour > 23 {
            return Err(TimeOfDayError::Hour(hour));
        }
        if minute > 59 {
            return Err(TimeOfDayError::Minute(minute));
        }
        if second > 59 {
            return Err(TimeOfDayError::Second(second));
        }
        NaiveTime::from_hms_opt(hour, minute, second)
            .map(TimeOfDay)
            .ok_or(TimeOfDayError::Second(second))
    }

    /// Shorthand for `new(hour, minute, 0)`.
    pub fn hms(hour: u32, minute: u32) -> Result<Self, TimeOfDayError> {
        Self::new(hour, minute, 0)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn second(&self) -> u32 {
        self.0.second()
    }

    /// The instant this time of day has on `date` in `tz`.
    /// See [`resolve_local`] for times skipped or repeated by DST changes.
    pub fn on<Tz: TimeZone>(&self, date: NaiveDate, tz: &Tz) -> DateTime<Tz> {
        resolve_local(tz, date.and_time(self.0))
    }
}

impl From<TimeOfDay> for NaiveTime {
    fn from(t: TimeOfDay) -> Self {
        t.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M:%S"))
    }
}

/// Parses `H:MM`, `HH:MM` or `HH:MM:SS`.
impl FromStr for TimeOfDay {
    type Err = TimeOfDayError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TimeOfDayError::Empty);
        }

        let captures = TIME_OF_DAY_REGEX
            .captures(trimmed)
            .ok_or_else(|| TimeOfDayError::Format(trimmed.to_string()))?;
        let field = |i: usize| -> Result<u32, TimeOfDayError> {
            match captures.get(i) {
                Some(m) => m
                    .as_str()
                    .parse()
                    .map_err(|_| TimeOfDayError::Format(trimmed.to_string())),
                None => Ok(0),
            }
        };

        TimeOfDay::new(field(1)?, field(2)?, field(3)?)
    }
}

/// Outcome of a single evaluation of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    Remaining { minutes: u64, seconds: u64 },
    /// `should_alert` is only set on the first expired tick after the
    /// target was (re)set.
    Expired { should_alert: bool },
}

impl TickResult {
    pub fn is_expired(&self) -> bool {
        matches!(self, TickResult::Expired { .. })
    }
}

/// Renders `MM:SS` while counting and the expiry message afterwards.
impl fmt::Display for TickResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickResult::Remaining { minutes, seconds } => {
                write!(f, "{:02}:{:02}", minutes, seconds)
            }
            TickResult::Expired { .. } => f.write_str(defaults::EXPIRED_MESSAGE),
        }
    }
}

/// How far back to look for the offset in effect before a DST gap.
const GAP_LOOKBACK_HOURS: i64 = 3;

/// Map a local wall-clock time in `tz` to an instant.
///
/// A repeated local time (clocks going back) resolves to its earlier
/// instant. A skipped local time (clocks going forward) keeps the offset
/// from before the jump, so 02:30 in a 02:00 to 03:00 gap becomes 03:30.
pub fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(t) => t,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            let before = local - Duration::hours(GAP_LOOKBACK_HOURS);
            let offset_secs = tz
                .offset_from_local_datetime(&before)
                .earliest()
                .map(|o| o.fix().local_minus_utc())
                .unwrap_or(0);
            tz.from_utc_datetime(&(local - Duration::seconds(i64::from(offset_secs))))
        }
    }
}

/// Zero the seconds and sub-second part of `t`.
fn truncate_to_minute<Tz: TimeZone>(t: DateTime<Tz>) -> DateTime<Tz> {
    let seconds = Duration::seconds(i64::from(t.second()));
    let nanos = Duration::nanoseconds(i64::from(t.nanosecond()));
    t - seconds - nanos
}

/// Owns the countdown target and evaluates remaining time against an
/// externally supplied "now".
///
/// The target is an absolute instant, so remaining time stays correct across
/// DST changes. It always falls on the local date of "now": a time earlier
/// than now is kept as an already-expired target rather than moved to the
/// next day.
#[derive(Debug, Clone)]
pub struct TimerEngine<Tz: TimeZone> {
    target: DateTime<Tz>,
    alert_pending: bool,
}

impl<Tz: TimeZone> TimerEngine<Tz> {
    /// Start with a target `defaults::DURATION_MINUTES` from `now`, seconds truncated.
    pub fn new(now: DateTime<Tz>) -> Self {
        let mut engine = TimerEngine {
            target: now.clone(),
            alert_pending: true,
        };
        engine.set_from_duration(defaults::DURATION_MINUTES, true, now);
        engine
    }

    pub fn target(&self) -> DateTime<Tz> {
        self.target.clone()
    }

    pub fn alert_pending(&self) -> bool {
        self.alert_pending
    }

    fn arm(&mut self, target: DateTime<Tz>) {
        self.target = target;
        self.alert_pending = true;
    }

    /// Count down to `time` on the local date of `now`.
    pub fn set_from_time_of_day(&mut self, time: TimeOfDay, now: DateTime<Tz>) {
        debug!("Target set to {} (time of day)", time);
        self.arm(time.on(now.date_naive(), &now.timezone()));
    }

    pub fn set_from_hms(
        &mut self,
        hour: u32,
        minute: u32,
        second: u32,
        now: DateTime<Tz>,
    ) -> Result<(), TimeOfDayError> {
        let time = TimeOfDay::new(hour, minute, second)?;
        self.set_from_time_of_day(time, now);
        Ok(())
    }

    /// Count down `minutes` from `now`. With `truncate_seconds` the target
    /// drops its seconds, landing up to 59 seconds earlier.
    pub fn set_from_duration(&mut self, minutes: u32, truncate_seconds: bool, now: DateTime<Tz>) {
        let mut end = now.clone() + Duration::minutes(i64::from(minutes));
        if truncate_seconds {
            end = truncate_to_minute(end);
        }
        // Past midnight only the time of day survives, re-anchored to today.
        if end.date_naive() != now.date_naive() {
            end = resolve_local(&now.timezone(), now.date_naive().and_time(end.naive_local().time()));
        }
        debug!(
            "Target set to {} ({} minutes, truncate_seconds={})",
            end.naive_local().format("%H:%M:%S"),
            minutes,
            truncate_seconds
        );
        self.arm(end);
    }

    /// Select the first preset for today's weekday that lies strictly after
    /// `now`. Returns `false` and keeps the current target if none qualifies.
    pub fn select_best_preset(&mut self, table: &PresetTable, now: DateTime<Tz>) -> bool {
        let weekday = now.weekday();
        let today = now.date_naive();
        let tz = now.timezone();
        match table.presets(weekday).find(|p| p.time().on(today, &tz) > now) {
            Some(preset) => {
                debug!("Best preset for {}: {}", weekday, preset);
                self.set_from_time_of_day(preset.time(), now);
                true
            }
            None => {
                debug!("No preset left for {} after {}", weekday, now.naive_local().time());
                false
            }
        }
    }

    /// Evaluate the remaining time at `now`.
    pub fn tick(&mut self, now: DateTime<Tz>) -> TickResult {
        let remaining_ms = self.target.clone().signed_duration_since(now).num_milliseconds();
        if remaining_ms > 0 {
            // Round half up so the display does not reach 00:00 early.
            let total_seconds = (remaining_ms as u64 + 500) / 1000;
            return TickResult::Remaining {
                minutes: total_seconds / 60,
                seconds: total_seconds % 60,
            };
        }

        let should_alert = std::mem::replace(&mut self.alert_pending, false);
        if should_alert {
            info!(
                "Countdown to {} expired",
                self.target.naive_local().format("%H:%M:%S")
            );
        }
        TickResult::Expired { should_alert }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::Preset;
    use chrono::{Utc, Weekday};
    use chrono_tz::Europe::Berlin;
    use chrono_tz::Tz;

    // 2024-01-15 is a Monday.
    fn at(h: u32, m: u32, s: u32, ms: u32) -> DateTime<Utc> {
        let naive = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_milli_opt(h, m, s, ms)
            .unwrap();
        Utc.from_utc_datetime(&naive)
    }

    fn berlin(month: u32, day: u32, h: u32, m: u32) -> DateTime<Tz> {
        Berlin.with_ymd_and_hms(2024, month, day, h, m, 0).single().unwrap()
    }

    fn monday_table() -> PresetTable {
        PresetTable::new().with_day(
            Weekday::Mon,
            vec![
                Some(Preset::new("A", TimeOfDay::hms(9, 0).unwrap()).unwrap()),
                None,
                Some(Preset::new("B", TimeOfDay::hms(10, 0).unwrap()).unwrap()),
            ],
        )
    }

    #[test]
    fn time_of_day_rejects_out_of_range_fields() {
        assert_eq!(TimeOfDay::new(24, 0, 0), Err(TimeOfDayError::Hour(24)));
        assert_eq!(TimeOfDay::new(12, 60, 0), Err(TimeOfDayError::Minute(60)));
        assert_eq!(TimeOfDay::new(12, 0, 60), Err(TimeOfDayError::Second(60)));
        assert!(TimeOfDay::new(23, 59, 59).is_ok());
    }

    #[test]
    fn time_of_day_parses_supported_formats() {
        assert_eq!("9:05".parse(), TimeOfDay::hms(9, 5));
        assert_eq!(" 12:00 ".parse(), TimeOfDay::hms(12, 0));
        assert_eq!("07:30:15".parse(), TimeOfDay::new(7, 30, 15));
        assert_eq!("".parse::<TimeOfDay>(), Err(TimeOfDayError::Empty));
        assert_eq!(
            "noon".parse::<TimeOfDay>(),
            Err(TimeOfDayError::Format("noon".to_string()))
        );
        assert_eq!("25:00".parse::<TimeOfDay>(), Err(TimeOfDayError::Hour(25)));
        assert_eq!(TimeOfDay::new(7, 3, 9).unwrap().to_string(), "07:03:09");
    }

    #[test]
    fn new_engine_targets_an_hour_ahead_on_the_minute() {
        let engine = TimerEngine::new(at(8, 15, 42, 300));
        assert_eq!(engine.target(), at(9, 15, 0, 0));
        assert!(engine.alert_pending());
    }

    #[test]
    fn zero_remaining_is_expired_with_alert() {
        for (h, m, sec) in [(0, 0, 0), (14, 30, 5), (23, 59, 59)] {
            let mut engine = TimerEngine::new(at(8, 0, 0, 0));
            engine.set_from_hms(h, m, sec, at(8, 0, 0, 0)).unwrap();
            assert_eq!(engine.target(), at(h, m, sec, 0));
            assert_eq!(
                engine.tick(engine.target()),
                TickResult::Expired { should_alert: true },
                "{:02}:{:02}:{:02}",
                h,
                m,
                sec
            );
        }
    }

    #[test]
    fn truncation_discards_seconds_without_rounding() {
        let now = at(10, 20, 59, 900);
        let mut engine = TimerEngine::new(now);
        engine.set_from_duration(5, true, now);
        assert_eq!(engine.target(), at(10, 25, 0, 0));

        engine.set_from_duration(5, false, now);
        assert_eq!(engine.target(), at(10, 25, 59, 900));
    }

    #[test]
    fn duration_past_midnight_stays_on_today() {
        let now = at(23, 30, 0, 0);
        let mut engine = TimerEngine::new(now);
        engine.set_from_duration(60, true, now);
        assert_eq!(engine.target(), at(0, 30, 0, 0));
        assert!(engine.tick(now).is_expired());
    }

    #[test]
    fn alert_fires_once_until_rearmed() {
        let now = at(12, 0, 0, 0);
        let mut engine = TimerEngine::new(now);
        engine.set_from_hms(12, 0, 1, now).unwrap();

        assert_eq!(
            engine.tick(now),
            TickResult::Remaining { minutes: 0, seconds: 1 }
        );
        assert_eq!(
            engine.tick(at(12, 0, 1, 0)),
            TickResult::Expired { should_alert: true }
        );
        for later in [at(12, 0, 1, 250), at(12, 0, 2, 0), at(12, 5, 0, 0)] {
            assert_eq!(engine.tick(later), TickResult::Expired { should_alert: false });
        }

        engine.set_from_hms(12, 0, 1, at(12, 5, 0, 0)).unwrap();
        assert_eq!(
            engine.tick(at(12, 5, 0, 250)),
            TickResult::Expired { should_alert: true }
        );
    }

    #[test]
    fn remaining_time_rounds_to_nearest_second() {
        let now = at(12, 0, 0, 0);
        let mut engine = TimerEngine::new(now);
        engine.set_from_duration(0, false, at(12, 0, 1, 500));
        assert_eq!(
            engine.tick(now),
            TickResult::Remaining { minutes: 0, seconds: 2 }
        );
        assert_eq!(
            engine.tick(at(12, 0, 0, 501)),
            TickResult::Remaining { minutes: 0, seconds: 1 }
        );

        engine.set_from_hms(13, 2, 3, now).unwrap();
        assert_eq!(
            engine.tick(now),
            TickResult::Remaining { minutes: 62, seconds: 3 }
        );
    }

    #[test]
    fn best_preset_skips_past_presets_and_ties() {
        let now = at(9, 0, 0, 0);
        let mut engine = TimerEngine::new(now);
        assert!(engine.select_best_preset(&monday_table(), now));
        assert_eq!(engine.target(), at(10, 0, 0, 0));
    }

    #[test]
    fn best_preset_leaves_target_when_nothing_qualifies() {
        let now = at(10, 0, 1, 0);
        let mut engine = TimerEngine::new(now);
        let before = engine.target();
        assert!(!engine.select_best_preset(&monday_table(), now));
        assert_eq!(engine.target(), before);

        // Tuesday has no entry at all.
        let tuesday = Utc.with_ymd_and_hms(2024, 1, 16, 6, 0, 0).unwrap();
        assert!(!engine.select_best_preset(&monday_table(), tuesday));
        assert_eq!(engine.target(), before);
    }

    #[test]
    fn selecting_a_preset_rearms_the_alert() {
        let now = at(8, 0, 0, 0);
        let mut engine = TimerEngine::new(now);
        engine.set_from_hms(7, 0, 0, now).unwrap();
        assert!(engine.tick(now).is_expired());
        assert!(!engine.alert_pending());

        assert!(engine.select_best_preset(&monday_table(), now));
        assert!(engine.alert_pending());
        assert_eq!(engine.target(), at(9, 0, 0, 0));
    }

    #[test]
    fn remaining_time_counts_real_time_across_spring_forward() {
        // Berlin skips 02:00 to 03:00 on 2024-03-31.
        let now = berlin(3, 31, 1, 30);
        let mut engine = TimerEngine::new(now);
        engine.set_from_hms(3, 30, 0, now).unwrap();
        assert_eq!(
            engine.tick(now),
            TickResult::Remaining { minutes: 60, seconds: 0 }
        );

        engine.set_from_duration(90, true, now);
        assert_eq!(engine.target(), berlin(3, 31, 4, 0));
        assert_eq!(
            engine.tick(now),
            TickResult::Remaining { minutes: 90, seconds: 0 }
        );
    }

    #[test]
    fn skipped_local_time_lands_after_the_gap() {
        let now = berlin(3, 31, 1, 30);
        let mut engine = TimerEngine::new(now);
        engine.set_from_hms(2, 30, 0, now).unwrap();
        assert_eq!(engine.target(), berlin(3, 31, 3, 30));
        assert_eq!(
            engine.tick(now),
            TickResult::Remaining { minutes: 60, seconds: 0 }
        );
    }

    #[test]
    fn repeated_local_time_uses_the_earlier_instant() {
        // Berlin repeats 02:00 to 03:00 on 2024-10-27.
        let now = berlin(10, 27, 1, 30);
        let mut engine = TimerEngine::new(now);
        engine.set_from_hms(2, 30, 0, now).unwrap();
        assert_eq!(
            engine.target(),
            Utc.with_ymd_and_hms(2024, 10, 27, 0, 30, 0).unwrap()
        );
        assert_eq!(
            engine.tick(now),
            TickResult::Remaining { minutes: 60, seconds: 0 }
        );

        engine.set_from_hms(3, 30, 0, now).unwrap();
        assert_eq!(
            engine.tick(now),
            TickResult::Remaining { minutes: 180, seconds: 0 }
        );
    }

    #[test]
    fn tick_result_formats_for_display() {
        let remaining = TickResult::Remaining { minutes: 4, seconds: 7 };
        assert_eq!(remaining.to_string(), "04:07");
        assert_eq!(
            TickResult::Remaining { minutes: 125, seconds: 0 }.to_string(),
            "125:00"
        );
        assert_eq!(
            TickResult::Expired { should_alert: false }.to_string(),
            "Times Up!"
        );
    }
}
