// Public entities for the GlucoseGuide API
// JSON shapes exchanged with clients, all camelCase

pub mod combined;
pub mod common;
pub mod measurement;
pub mod user;

pub use combined::CombinedReadingResponse;
pub use common::RangeQuery;
pub use measurement::{CreateMeasurementBody, MeasurementResponse, UpdateMeasurementBody};
pub use user::{CreateUserBody, UserResponse};
