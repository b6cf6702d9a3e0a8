// GlucoseGuide Domain
// Business rules: input validation, date ranges, the combined feed

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Re-export the data crate modules the API layer wires together
pub use glucose_guide_data::{database, repository};
