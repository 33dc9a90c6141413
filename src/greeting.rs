//! Clock and greeting helpers

use chrono::{Local, Timelike};

/// Greeting for an hour of the day (0-23)
pub fn greeting_for_hour(hour: u32) -> &'static str {
    if hour < 12 {
        "Good Morning"
    } else if hour < 18 {
        "Good Afternoon"
    } else {
        "Good Evening"
    }
}

/// Greeting for the current local time, addressed to `display_name` if set
pub fn greeting(display_name: &str) -> String {
    let text = greeting_for_hour(Local::now().hour());
    let name = display_name.trim();
    if name.is_empty() {
        text.to_string()
    } else {
        format!("{}, {}", text, name)
    }
}

/// Format a time as `HH:MM:SS` or `hh:MM:SS AM`
pub fn format_time<T: Timelike>(time: &T, use_24_hour: bool) -> String {
    if use_24_hour {
        return format!(
            "{:02}:{:02}:{:02}",
            time.hour(),
            time.minute(),
            time.second()
        );
    }

    let (pm, hour) = time.hour12();
    format!(
        "{:02}:{:02}:{:02} {}",
        hour,
        time.minute(),
        time.second(),
        if pm { "PM" } else { "AM" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_greeting_boundaries() {
        assert_eq!(greeting_for_hour(0), "Good Morning");
        assert_eq!(greeting_for_hour(11), "Good Morning");
        assert_eq!(greeting_for_hour(12), "Good Afternoon");
        assert_eq!(greeting_for_hour(17), "Good Afternoon");
        assert_eq!(greeting_for_hour(18), "Good Evening");
        assert_eq!(greeting_for_hour(23), "Good Evening");
    }

    #[test]
    fn test_greeting_with_name() {
        assert!(greeting("  Ada ").ends_with(", Ada"));
        assert!(!greeting("").contains(','));
    }

    #[test]
    fn test_format_time() {
        let morning = NaiveTime::from_hms_opt(9, 5, 3).unwrap();
        let evening = NaiveTime::from_hms_opt(21, 45, 0).unwrap();
        let midnight = NaiveTime::from_hms_opt(0, 0, 59).unwrap();

        assert_eq!(format_time(&morning, true), "09:05:03");
        assert_eq!(format_time(&morning, false), "09:05:03 AM");
        assert_eq!(format_time(&evening, true), "21:45:00");
        assert_eq!(format_time(&evening, false), "09:45:00 PM");
        assert_eq!(format_time(&midnight, false), "12:00:59 AM");
    }
}
