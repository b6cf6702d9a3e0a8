// GlucoseGuide-api lib.rs
//
// HTTP surface of GlucoseGuide: router, handlers, request/response shapes
// and process configuration.

pub mod api;
pub mod config;
pub mod entities;
