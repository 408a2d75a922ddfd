use std::time::SystemTime;

use chrono::{Duration, Local, NaiveDateTime, NaiveTime};

/// Cinetree publishes a new build during the night, which moves the payload documents.
const REFRESH_HOUR: u32 = 1;
const REFRESH_MINUTE: u32 = 30;

pub fn next_refresh(now: NaiveDateTime) -> NaiveDateTime {
    let refresh_time = NaiveTime::from_hms_opt(REFRESH_HOUR, REFRESH_MINUTE, 0).unwrap_or_default();
    let today = now.date().and_time(refresh_time);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

pub fn expiry_time() -> SystemTime {
    let now = Local::now().naive_local();
    let diff = next_refresh(now) - now;
    SystemTime::now() + diff.to_std().unwrap_or_default()
}
