use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use glucose_guide_data::models::record_time;
use glucose_guide_domain::entities::{CombinedReading, EventTiming, SunaoFood};

/// Public representation of one entry of the merged BGL/HbA1c feed.
///
/// The side without a reading is `null`, never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedReadingResponse {
    pub id: String,
    #[serde(with = "record_time")]
    pub record_time: NaiveDateTime,
    pub event_timing: EventTiming,
    pub sunao_food: Option<SunaoFood>,
    pub bgl_id: Option<String>,
    pub bgl_value: Option<f64>,
    pub hba1c_id: Option<String>,
    pub hba1c_value: Option<f64>,
}

impl From<CombinedReading> for CombinedReadingResponse {
    fn from(entry: CombinedReading) -> Self {
        Self {
            id: entry.id,
            record_time: entry.record_time,
            event_timing: entry.event_timing,
            sunao_food: entry.sunao_food,
            bgl_id: entry.bgl_id,
            bgl_value: entry.bgl_value,
            hba1c_id: entry.hba1c_id,
            hba1c_value: entry.hba1c_value,
        }
    }
}
