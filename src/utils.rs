use crate::config::{MAX_DURATION_MIN, MIN_DURATION_MIN};
use chrono::NaiveDateTime;
use countdown::TimeOfDay;

/// Generic numeric input validation
pub fn validate_numeric_input<T>(
    input: &str,
    min: Option<T>,
    max: Option<T>,
    field_name: &str,
) -> Result<T, String>
where
    T: std::str::FromStr + std::fmt::Display + PartialOrd,
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", field_name));
    }

    match trimmed.parse::<T>() {
        Ok(val) => {
            if let Some(min_val) = min {
                if val < min_val {
                    return Err(format!("{} must be at least {}", field_name, min_val));
                }
            }
            if let Some(max_val) = max {
                if val > max_val {
                    return Err(format!("{} cannot exceed {}", field_name, max_val));
                }
            }
            Ok(val)
        }
        Err(_) => Err(format!("{} must be a valid number", field_name)),
    }
}

/// Validate the duration field, in whole minutes.
pub fn validate_duration(input: &str) -> Result<u32, String> {
    validate_numeric_input(input, Some(MIN_DURATION_MIN), Some(MAX_DURATION_MIN), "Duration")
}

/// Validate the "end at" field.
pub fn validate_end_at(input: &str) -> Result<TimeOfDay, String> {
    input.parse::<TimeOfDay>().map_err(|e| e.to_string())
}

/// Canonical text for the "end at" field.
pub fn format_end_at(target: NaiveDateTime) -> String {
    target.format("%H:%M:%S").to_string()
}

/// Short label for a preset button, e.g. `09:30`.
pub fn format_preset_time(time: TimeOfDay) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}
