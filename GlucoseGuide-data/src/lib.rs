// GlucoseGuide Data
// Storage models, SQLite persistence and the measurement repositories

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
