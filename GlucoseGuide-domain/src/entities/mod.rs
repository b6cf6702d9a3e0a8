// Domain entities and value objects
pub mod combined;
pub mod conversions;
pub mod measurement;
pub mod user;

// Re-export common types for easier imports
pub use combined::CombinedReading;
pub use measurement::{CreateMeasurement, UpdateMeasurement};
pub use user::CreateUser;
pub use glucose_guide_data::models::{
    Bgl, DataSet, EventTiming, Hba1c, Measurement, SunaoFood, User,
};
