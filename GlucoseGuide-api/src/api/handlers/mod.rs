pub mod combined;
pub mod health;
pub mod measurement;
pub mod user;

// Re-export handlers for easier imports
pub use combined::query_combined_feed;
pub use health::health_check;
pub use measurement::{
    create_measurement, delete_measurement, get_measurement, list_measurements,
    query_measurements, update_measurement,
};
pub use user::{agree_to_terms, create_user, get_user, list_users};
