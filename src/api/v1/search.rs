//! Search endpoint handlers

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use tracing::{debug, info};

use crate::api::middleware::ClientIdentity;
use crate::api::state::AppState;
use crate::api::types::{
    insert_rate_limit_headers, ApiError, Json, RecentSearchItem, RecentSearchesResponse,
    SearchBody, SearchResponse,
};

/// POST /v1/search
pub async fn search(
    State(state): State<AppState>,
    ClientIdentity(client_id): ClientIdentity,
    Json(body): Json<SearchBody>,
) -> Result<Response, ApiError> {
    let request = body.into_request()?;

    debug!(
        client_id = %client_id,
        radius = request.radius_meters(),
        categories = ?request.categories(),
        "Search request"
    );

    let result = state.search_service.resolve(&client_id, &request).await?;

    let mut headers = HeaderMap::new();
    if let Some(decision) = result.rate_limit.as_ref() {
        insert_rate_limit_headers(&mut headers, decision);
    }

    info!(
        client_id = %client_id,
        source = %result.source,
        results = result.results.len(),
        "Search resolved"
    );

    Ok((headers, Json(SearchResponse::from(result))).into_response())
}

/// GET /v1/search/recent
pub async fn recent_searches(
    State(state): State<AppState>,
    ClientIdentity(client_id): ClientIdentity,
) -> Json<RecentSearchesResponse> {
    let entries = state.search_service.recent_searches(&client_id).await;

    debug!(client_id = %client_id, count = entries.len(), "Listing recent searches");

    Json(RecentSearchesResponse {
        data: entries.into_iter().map(RecentSearchItem::from).collect(),
    })
}
