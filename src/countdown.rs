//! Engine plus its collaborators: a clock, a display and an alert sound.
//!
//! `Countdown` does not schedule itself. Whoever owns it calls
//! [`Countdown::tick`] at a fixed cadence and stops by no longer calling it.

use crate::clock::Clock;
use crate::presets::PresetTable;
use crate::{TickResult, TimeOfDay, TimeOfDayError, TimerEngine};
use chrono::DateTime;

/// Receives every tick result, e.g. to render `MM:SS`.
pub trait DisplaySink {
    fn show(&mut self, result: &TickResult);
}

/// Plays the alert sound.
pub trait AudioSink {
    fn play(&mut self);
}

pub struct Countdown<C: Clock, D, A> {
    engine: TimerEngine<C::Zone>,
    clock: C,
    display: D,
    audio: A,
    sound_enabled: bool,
}

impl<C: Clock, D: DisplaySink, A: AudioSink> Countdown<C, D, A> {
    /// Sound starts disabled.
    pub fn new(clock: C, display: D, audio: A) -> Self {
        let engine = TimerEngine::new(clock.now());
        Countdown {
            engine,
            clock,
            display,
            audio,
            sound_enabled: false,
        }
    }

    pub fn engine(&self) -> &TimerEngine<C::Zone> {
        &self.engine
    }

    pub fn target(&self) -> DateTime<C::Zone> {
        self.engine.target()
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
    }

    pub fn set_from_duration(&mut self, minutes: u32, truncate_seconds: bool) {
        let now = self.clock.now();
        self.engine.set_from_duration(minutes, truncate_seconds, now);
    }

    pub fn set_from_time_of_day(&mut self, time: TimeOfDay) {
        let now = self.clock.now();
        self.engine.set_from_time_of_day(time, now);
    }

    pub fn set_from_hms(&mut self, hour: u32, minute: u32, second: u32) -> Result<(), TimeOfDayError> {
        let now = self.clock.now();
        self.engine.set_from_hms(hour, minute, second, now)
    }

    pub fn select_best_preset(&mut self, table: &PresetTable) -> bool {
        let now = self.clock.now();
        self.engine.select_best_preset(table, now)
    }

    /// Evaluate the countdown once and push the result to the collaborators.
    pub fn tick(&mut self) -> TickResult {
        let result = self.engine.tick(self.clock.now());
        self.display.show(&result);
        if let TickResult::Expired { should_alert: true } = result {
            if self.sound_enabled {
                self.audio.play();
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::Preset;
    use chrono::{Duration, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Clone)]
    struct ManualClock(Rc<Cell<NaiveDateTime>>);

    impl ManualClock {
        fn advance(&self, ms: i64) {
            self.0.set(self.0.get() + Duration::milliseconds(ms));
        }
    }

    impl Clock for ManualClock {
        type Zone = Utc;

        fn now(&self) -> DateTime<Utc> {
            Utc.from_utc_datetime(&self.0.get())
        }
    }

    #[derive(Clone, Default)]
    struct Screen(Rc<RefCell<Vec<String>>>);

    impl DisplaySink for Screen {
        fn show(&mut self, result: &TickResult) {
            self.0.borrow_mut().push(result.to_string());
        }
    }

    #[derive(Clone, Default)]
    struct Speaker(Rc<Cell<usize>>);

    impl AudioSink for Speaker {
        fn play(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn setup(h: u32, m: u32, s: u32) -> (ManualClock, Screen, Speaker, Countdown<ManualClock, Screen, Speaker>) {
        // A Wednesday.
        let start = NaiveDate::from_ymd_opt(2024, 5, 15)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap();
        let clock = ManualClock(Rc::new(Cell::new(start)));
        let screen = Screen::default();
        let speaker = Speaker::default();
        let countdown = Countdown::new(clock.clone(), screen.clone(), speaker.clone());
        (clock, screen, speaker, countdown)
    }

    #[test]
    fn every_tick_reaches_the_display() {
        let (clock, screen, _, mut countdown) = setup(10, 0, 0);
        countdown.set_from_duration(1, false);

        countdown.tick();
        clock.advance(59_400);
        countdown.tick();
        clock.advance(600);
        countdown.tick();

        assert_eq!(*screen.0.borrow(), vec!["01:00", "00:01", "Times Up!"]);
    }

    #[test]
    fn sound_plays_once_when_enabled() {
        let (clock, _, speaker, mut countdown) = setup(10, 0, 0);
        countdown.set_sound_enabled(true);
        countdown.set_from_hms(10, 0, 1).unwrap();

        for _ in 0..12 {
            countdown.tick();
            clock.advance(250);
        }
        assert_eq!(speaker.0.get(), 1);

        countdown.set_from_duration(0, true);
        countdown.tick();
        assert_eq!(speaker.0.get(), 2);
    }

    #[test]
    fn disabled_sound_still_consumes_the_alert() {
        let (clock, _, speaker, mut countdown) = setup(10, 0, 0);
        countdown.set_from_hms(9, 0, 0).unwrap();
        assert_eq!(countdown.tick(), TickResult::Expired { should_alert: true });

        countdown.set_sound_enabled(true);
        clock.advance(250);
        assert_eq!(countdown.tick(), TickResult::Expired { should_alert: false });
        assert_eq!(speaker.0.get(), 0);
    }

    #[test]
    fn preset_selection_uses_the_clock_weekday() {
        let (_, _, _, mut countdown) = setup(11, 0, 0);
        let before = countdown.target();
        let table = PresetTable::new().with_day(
            Weekday::Wed,
            vec![Some(Preset::new("Lunch", TimeOfDay::hms(12, 5).unwrap()).unwrap())],
        );

        assert!(countdown.select_best_preset(&table));
        assert_eq!(countdown.target().format("%H:%M:%S").to_string(), "12:05:00");

        let monday_only = PresetTable::new().with_day(
            Weekday::Mon,
            vec![Some(Preset::new("Lunch", TimeOfDay::hms(12, 5).unwrap()).unwrap())],
        );
        countdown.set_from_duration(60, true);
        assert_eq!(countdown.target(), before);
        assert!(!countdown.select_best_preset(&monday_only));
        assert_eq!(countdown.target(), before);
    }

    #[test]
    fn invalid_time_of_day_keeps_the_target() {
        let (_, _, _, mut countdown) = setup(10, 0, 0);
        let before = countdown.target();
        assert_eq!(countdown.set_from_hms(10, 75, 0), Err(TimeOfDayError::Minute(75)));
        assert_eq!(countdown.target(), before);
    }
}
