use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::entities::{EventTiming, SunaoFood};

/// Request payload for creating a new measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreateMeasurement {
    /// Owner of the measurement
    #[validate(custom = "not_blank")]
    pub user_id: String,

    /// Measured value
    #[validate(range(min = 0.0, message = "Value must not be negative"))]
    pub value: f64,

    pub event_timing: EventTiming,

    pub record_time: NaiveDateTime,

    pub sunao_food: Option<SunaoFood>,
}

/// Request payload for updating an existing measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct UpdateMeasurement {
    /// Measured value
    #[validate(range(min = 0.0, message = "Value must not be negative"))]
    pub value: f64,

    pub event_timing: EventTiming,

    pub record_time: NaiveDateTime,

    pub sunao_food: Option<SunaoFood>,
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("User ID must not be empty".into());
        return Err(error);
    }
    Ok(())
}
