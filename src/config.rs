//! Application-level configuration constants.

// Scheduling
pub const TICK_INTERVAL_MS: u32 = 250;

// Startup behaviour
pub const AUTO_SELECT_PRESET: bool = true;
pub const SOUND_ENABLED_BY_DEFAULT: bool = false;

// Page
pub const APP_TITLE: &str = "CountDown";
pub const ALERT_SOUND_SRC: &str = "alarm.mp3";

// Default values for input fields
pub const DEFAULT_DURATION_MIN: u32 = 5;

// Min/Max limits for input fields
pub const MIN_DURATION_MIN: u32 = 1;
pub const MAX_DURATION_MIN: u32 = 24 * 60;

// Quick-select buttons, in minutes
pub const QUICK_DURATIONS_MIN: [u32; 6] = [1, 5, 10, 15, 30, 60];
