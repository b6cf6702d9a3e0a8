pub mod combined;
pub mod date_range;
pub mod measurement;
pub mod merge;
pub mod user;

// Domain services
// This module contains business logic implementations.

// Re-export service traits and factory functions
pub use combined::CombinedFeedService;
pub use date_range::{DateRange, DateRangeError};
pub use measurement::{
    create_in_memory_measurement_service, create_measurement_service, MeasurementService,
    MeasurementServiceError, MeasurementServiceTrait,
};
pub use merge::merge_feeds;
pub use user::{
    create_in_memory_user_service, create_user_service, UserService, UserServiceError,
    UserServiceTrait,
};
