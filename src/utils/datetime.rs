use std::time::SystemTime;

use chrono::Utc;

pub type DateTime = chrono::DateTime<Utc>;

pub fn now() -> DateTime {
    Utc::now()
}

pub fn from_system_time(time: SystemTime) -> DateTime {
    DateTime::from(time)
}
