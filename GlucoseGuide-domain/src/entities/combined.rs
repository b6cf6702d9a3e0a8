use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::entities::{EventTiming, SunaoFood};

/// One entry of the merged BGL/HbA1c feed.
///
/// A fused entry carries both sides; a solo entry has `None` for the side
/// that had no reading at that instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedReading {
    /// Fresh id, distinct from both source records
    pub id: String,
    pub record_time: NaiveDateTime,
    pub event_timing: EventTiming,
    pub sunao_food: Option<SunaoFood>,
    pub bgl_id: Option<String>,
    pub bgl_value: Option<f64>,
    pub hba1c_id: Option<String>,
    pub hba1c_value: Option<f64>,
}
