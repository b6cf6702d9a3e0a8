use std::marker::PhantomData;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::models::{Bgl, EventTiming, Measurement, User};

/// A timestamp in July 2024
pub fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 7, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .unwrap()
}

/// A live BGL record for `user_id` at `record_time`
pub fn sample(user_id: &str, record_time: NaiveDateTime) -> Measurement<Bgl> {
    let now = Utc::now();
    Measurement {
        id: Uuid::new_v4().simple().to_string(),
        user_id: user_id.to_string(),
        value: 120.0,
        event_timing: EventTiming::AfterMeal,
        record_time,
        sunao_food: None,
        is_deleted: false,
        created_at: now,
        updated_at: now,
        kind: PhantomData,
    }
}

/// A registered user who has not agreed to the terms yet
pub fn sample_user(id: &str) -> User {
    let now = Utc::now();
    User {
        id: id.to_string(),
        term_agreed_at: None,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    }
}
