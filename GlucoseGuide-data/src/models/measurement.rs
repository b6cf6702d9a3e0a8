use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::record_time;

/// Marker for one of the measurement data sets kept by the application.
///
/// Both data sets share the same record shape; the marker keeps them apart
/// at the type level and names the table each one lives in.
pub trait DataSet: fmt::Debug + Clone + Copy + PartialEq + Send + Sync + 'static {
    /// Human readable name used in log and error messages
    const NAME: &'static str;

    /// Storage table holding this data set
    const TABLE: &'static str;
}

/// Blood glucose level readings (mg/dL)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bgl;

impl DataSet for Bgl {
    const NAME: &'static str = "BGL";
    const TABLE: &'static str = "bgl_readings";
}

/// HbA1c readings (%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hba1c;

impl DataSet for Hba1c {
    const NAME: &'static str = "HbA1c";
    const TABLE: &'static str = "hba1c_readings";
}

/// Raised when a stored or submitted enum label is not part of the closed set
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    /// Which enumeration rejected the value
    pub kind: &'static str,
    /// The rejected label
    pub value: String,
}

/// When, relative to the user's day, a measurement was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTiming {
    #[serde(alias = "食前")]
    BeforeMeal,
    #[serde(alias = "食後")]
    AfterMeal,
    #[serde(alias = "空腹時")]
    EmptyStomach,
    #[serde(alias = "運動前")]
    BeforeExercise,
    #[serde(alias = "運動後")]
    AfterExercise,
    #[serde(alias = "起床")]
    WakeUp,
    #[serde(alias = "就寝前")]
    Bedtime,
    #[serde(alias = "深夜")]
    LateNight,
    #[serde(alias = "その他")]
    Other,
}

impl EventTiming {
    /// Label used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            EventTiming::BeforeMeal => "before_meal",
            EventTiming::AfterMeal => "after_meal",
            EventTiming::EmptyStomach => "empty_stomach",
            EventTiming::BeforeExercise => "before_exercise",
            EventTiming::AfterExercise => "after_exercise",
            EventTiming::WakeUp => "wake_up",
            EventTiming::Bedtime => "bedtime",
            EventTiming::LateNight => "late_night",
            EventTiming::Other => "other",
        }
    }
}

impl FromStr for EventTiming {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "before_meal" | "食前" => Ok(EventTiming::BeforeMeal),
            "after_meal" | "食後" => Ok(EventTiming::AfterMeal),
            "empty_stomach" | "空腹時" => Ok(EventTiming::EmptyStomach),
            "before_exercise" | "運動前" => Ok(EventTiming::BeforeExercise),
            "after_exercise" | "運動後" => Ok(EventTiming::AfterExercise),
            "wake_up" | "起床" => Ok(EventTiming::WakeUp),
            "bedtime" | "就寝前" => Ok(EventTiming::Bedtime),
            "late_night" | "深夜" => Ok(EventTiming::LateNight),
            "other" | "その他" => Ok(EventTiming::Other),
            _ => Err(UnknownVariant {
                kind: "event_timing",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for EventTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SUNAO product eaten around the measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SunaoFood {
    #[serde(alias = "パスタ")]
    Pasta,
    #[serde(alias = "ビスケット")]
    Biscuit,
    #[serde(alias = "アイス")]
    IceCream,
    #[serde(alias = "チョコレート")]
    Chocolate,
    #[serde(alias = "パン")]
    Bread,
    #[serde(alias = "その他")]
    Other,
}

impl SunaoFood {
    /// Label used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            SunaoFood::Pasta => "pasta",
            SunaoFood::Biscuit => "biscuit",
            SunaoFood::IceCream => "ice_cream",
            SunaoFood::Chocolate => "chocolate",
            SunaoFood::Bread => "bread",
            SunaoFood::Other => "other",
        }
    }
}

impl FromStr for SunaoFood {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pasta" | "パスタ" => Ok(SunaoFood::Pasta),
            "biscuit" | "ビスケット" => Ok(SunaoFood::Biscuit),
            "ice_cream" | "アイス" => Ok(SunaoFood::IceCream),
            "chocolate" | "チョコレート" => Ok(SunaoFood::Chocolate),
            "bread" | "パン" => Ok(SunaoFood::Bread),
            "other" | "その他" => Ok(SunaoFood::Other),
            _ => Err(UnknownVariant {
                kind: "sunao_food",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SunaoFood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage model for a single measurement of data set `K`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Measurement<K: DataSet> {
    /// Unique identifier, assigned on creation and never changed
    pub id: String,

    /// Owner of the measurement; partition key in storage
    pub user_id: String,

    /// Measured value (mg/dL for BGL, % for HbA1c)
    pub value: f64,

    /// When in the day the measurement was taken
    pub event_timing: EventTiming,

    /// When the measurement was taken; sort key within the user's partition
    #[serde(with = "record_time")]
    pub record_time: NaiveDateTime,

    /// Optional SUNAO product eaten around the measurement
    pub sunao_food: Option<SunaoFood>,

    /// Soft-delete flag
    pub is_deleted: bool,

    /// When the record was first stored
    pub created_at: DateTime<Utc>,

    /// When the record was last written
    pub updated_at: DateTime<Utc>,

    #[serde(skip)]
    pub kind: PhantomData<K>,
}

impl<K: DataSet> Measurement<K> {
    /// Storage key of this record
    pub fn key(&self) -> ItemKey {
        ItemKey {
            user_id: self.user_id.clone(),
            record_time: self.record_time,
            id: self.id.clone(),
        }
    }
}

/// Location of a record in a store.
///
/// Records are partitioned by `user_id` and ordered by `record_time`; the id
/// breaks ties so that two records sharing a timestamp never overwrite each
/// other.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemKey {
    pub user_id: String,
    pub record_time: NaiveDateTime,
    pub id: String,
}

/// Input data for creating a new measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMeasurementRequest {
    pub user_id: String,
    pub value: f64,
    pub event_timing: EventTiming,
    #[serde(with = "record_time")]
    pub record_time: NaiveDateTime,
    #[serde(default)]
    pub sunao_food: Option<SunaoFood>,
}

/// Input data for replacing the mutable fields of a measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMeasurementRequest {
    pub value: f64,
    pub event_timing: EventTiming,
    #[serde(with = "record_time")]
    pub record_time: NaiveDateTime,
    #[serde(default)]
    pub sunao_food: Option<SunaoFood>,
}
