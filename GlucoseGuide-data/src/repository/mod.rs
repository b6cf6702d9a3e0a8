// Repository module structure
pub mod errors;
mod in_memory;
mod measurement;
mod storage;
mod store;
mod user;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use in_memory::{InMemoryStore, InMemoryUserStore};
pub use measurement::{MeasurementRepository, MeasurementRepositoryTrait};
pub use storage::{SqliteStore, SqliteUserStore};
pub use store::{MeasurementStore, ScanFilter, UserStore};
pub use user::{UserRepository, UserRepositoryTrait};
