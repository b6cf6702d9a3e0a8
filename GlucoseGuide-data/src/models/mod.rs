// Storage models: the two measurement data sets and users
pub mod measurement;
pub mod record_time;
pub mod user;

pub use measurement::{
    Bgl, CreateMeasurementRequest, DataSet, EventTiming, Hba1c, ItemKey, Measurement,
    SunaoFood, UnknownVariant, UpdateMeasurementRequest,
};
pub use user::{CreateUserRequest, User};
