use std::sync::Arc;

use axum::extract::{rejection::QueryRejection, Json, Query, State};
use tracing::instrument;

use glucose_guide_domain::services::CombinedFeedService;

use crate::api::error::ApiError;
use crate::entities::{CombinedReadingResponse, RangeQuery};

/// Merged BGL and HbA1c feed of one user between two `YYYYMMDD` days
#[instrument(skip(service, query))]
pub async fn query_combined_feed(
    State(service): State<Arc<CombinedFeedService>>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<Vec<CombinedReadingResponse>>, ApiError> {
    let Query(query) = query?;
    let feed = service
        .combined_feed(&query.user_id, &query.from, &query.to)
        .await?;
    Ok(Json(feed.into_iter().map(CombinedReadingResponse::from).collect()))
}
