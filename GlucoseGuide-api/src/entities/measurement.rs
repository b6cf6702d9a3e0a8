use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use glucose_guide_data::models::record_time;
use glucose_guide_domain::entities::{
    CreateMeasurement, DataSet, EventTiming, Measurement, SunaoFood, UpdateMeasurement,
};

/// Public representation of a BGL or HbA1c measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementResponse {
    pub id: String,
    pub user_id: String,
    pub value: f64,
    pub event_timing: EventTiming,
    #[serde(with = "record_time")]
    pub record_time: NaiveDateTime,
    pub sunao_food: Option<SunaoFood>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<K: DataSet> From<Measurement<K>> for MeasurementResponse {
    fn from(item: Measurement<K>) -> Self {
        Self {
            id: item.id,
            user_id: item.user_id,
            value: item.value,
            event_timing: item.event_timing,
            record_time: item.record_time,
            sunao_food: item.sunao_food,
            is_deleted: item.is_deleted,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// Request body for creating a measurement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeasurementBody {
    pub user_id: String,
    pub value: f64,
    pub event_timing: EventTiming,
    #[serde(with = "record_time")]
    pub record_time: NaiveDateTime,
    #[serde(default)]
    pub sunao_food: Option<SunaoFood>,
}

impl From<CreateMeasurementBody> for CreateMeasurement {
    fn from(body: CreateMeasurementBody) -> Self {
        Self {
            user_id: body.user_id,
            value: body.value,
            event_timing: body.event_timing,
            record_time: body.record_time,
            sunao_food: body.sunao_food,
        }
    }
}

/// Request body for updating a measurement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeasurementBody {
    pub value: f64,
    pub event_timing: EventTiming,
    #[serde(with = "record_time")]
    pub record_time: NaiveDateTime,
    #[serde(default)]
    pub sunao_food: Option<SunaoFood>,
}

impl From<UpdateMeasurementBody> for UpdateMeasurement {
    fn from(body: UpdateMeasurementBody) -> Self {
        Self {
            value: body.value,
            event_timing: body.event_timing,
            record_time: body.record_time,
            sunao_food: body.sunao_food,
        }
    }
}
