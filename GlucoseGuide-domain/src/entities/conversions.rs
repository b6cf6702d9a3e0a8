use glucose_guide_data::models::{CreateMeasurementRequest, CreateUserRequest, UpdateMeasurementRequest};

use crate::entities::{CreateMeasurement, CreateUser, UpdateMeasurement};

// Conversion functions between domain entities and data models.
// Named `convert_to_[target_layer]_[model_name]`.

/// Convert from domain entity to data model for create request
pub fn convert_to_data_create_request(domain_request: CreateMeasurement) -> CreateMeasurementRequest {
    CreateMeasurementRequest {
        user_id: domain_request.user_id.trim().to_string(),
        value: domain_request.value,
        event_timing: domain_request.event_timing,
        record_time: domain_request.record_time,
        sunao_food: domain_request.sunao_food,
    }
}

/// Convert from domain entity to data model for update request
pub fn convert_to_data_update_request(domain_request: UpdateMeasurement) -> UpdateMeasurementRequest {
    UpdateMeasurementRequest {
        value: domain_request.value,
        event_timing: domain_request.event_timing,
        record_time: domain_request.record_time,
        sunao_food: domain_request.sunao_food,
    }
}

/// Convert from domain entity to data model for user registration
pub fn convert_to_data_create_user_request(domain_request: CreateUser) -> CreateUserRequest {
    CreateUserRequest {
        id: domain_request.id.trim().to_string(),
    }
}
