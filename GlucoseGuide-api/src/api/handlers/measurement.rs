use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Path, Query, State,
    },
    http::StatusCode,
};
use tracing::{info, instrument};

use glucose_guide_domain::entities::{DataSet, Measurement};
use glucose_guide_domain::services::MeasurementServiceTrait;

use crate::api::error::ApiError;
use crate::entities::{CreateMeasurementBody, MeasurementResponse, RangeQuery, UpdateMeasurementBody};

/// Service type for dependency injection
pub type MeasurementService<K> = Arc<dyn MeasurementServiceTrait<K>>;

fn respond<K: DataSet>(items: Vec<Measurement<K>>) -> Json<Vec<MeasurementResponse>> {
    Json(items.into_iter().map(MeasurementResponse::from).collect())
}

/// List every live measurement
#[instrument(skip(service), fields(data_set = K::NAME))]
pub async fn list_measurements<K: DataSet>(
    State(service): State<MeasurementService<K>>,
) -> Result<Json<Vec<MeasurementResponse>>, ApiError> {
    let items = service.find_all().await?;
    Ok(respond(items))
}

/// Create a measurement
#[instrument(skip(service, payload), fields(data_set = K::NAME))]
pub async fn create_measurement<K: DataSet>(
    State(service): State<MeasurementService<K>>,
    payload: Result<Json<CreateMeasurementBody>, JsonRejection>,
) -> Result<(StatusCode, Json<MeasurementResponse>), ApiError> {
    let Json(body) = payload?;
    let created = service.create_one(body.into()).await?;
    info!("Created {} measurement {}", K::NAME, created.id);
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Measurements of one user between two `YYYYMMDD` days
#[instrument(skip(service, query), fields(data_set = K::NAME))]
pub async fn query_measurements<K: DataSet>(
    State(service): State<MeasurementService<K>>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<Vec<MeasurementResponse>>, ApiError> {
    let Query(query) = query?;
    let items = service
        .find_many_by_user_id(&query.user_id, &query.from, &query.to)
        .await?;
    Ok(respond(items))
}

/// Get a single measurement
#[instrument(skip(service), fields(data_set = K::NAME))]
pub async fn get_measurement<K: DataSet>(
    State(service): State<MeasurementService<K>>,
    Path(id): Path<String>,
) -> Result<Json<MeasurementResponse>, ApiError> {
    let item = service.find_one(&id).await?;
    Ok(Json(item.into()))
}

/// Replace the mutable fields of a measurement
#[instrument(skip(service, payload), fields(data_set = K::NAME))]
pub async fn update_measurement<K: DataSet>(
    State(service): State<MeasurementService<K>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateMeasurementBody>, JsonRejection>,
) -> Result<Json<MeasurementResponse>, ApiError> {
    let Json(body) = payload?;
    let updated = service.update_one(&id, body.into()).await?;
    Ok(Json(updated.into()))
}

/// Soft-delete a measurement; answers both PATCH and DELETE
#[instrument(skip(service), fields(data_set = K::NAME))]
pub async fn delete_measurement<K: DataSet>(
    State(service): State<MeasurementService<K>>,
    Path(id): Path<String>,
) -> Result<Json<MeasurementResponse>, ApiError> {
    let deleted = service.delete_one(&id).await?;
    Ok(Json(deleted.into()))
}
