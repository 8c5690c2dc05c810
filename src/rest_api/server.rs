//! # Organization Routes
//!
//! Axum router for the `/organizations` endpoints. Path segments are taken as
//! raw strings so that malformed ids go through the same validation errors
//! as every other parameter.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    routing::{get, post},
    Json, Router,
};

use super::errors::{RestError, ValidationError};
use super::handler::OrganizationHandler;
use super::response::{OrganizationDetail, OrganizationSummary};

/// Shared state type
type RouteState = Arc<OrganizationHandler>;

type ListResult = Result<Json<Vec<OrganizationSummary>>, RestError>;

type PathSegment = Result<Path<String>, PathRejection>;

/// Build the organization router
pub fn organization_routes(handler: OrganizationHandler) -> Router {
    Router::new()
        .route("/organizations/", get(list_handler))
        .route("/organizations", get(list_handler))
        .route("/organizations/building/:building_id", get(building_handler))
        .route("/organizations/activity/:activity_id", get(activity_handler))
        .route("/organizations/search/radius", post(radius_handler))
        .route("/organizations/search/rectangle", post(rectangle_handler))
        .route("/organizations/:organization_id", get(detail_handler))
        .with_state(Arc::new(handler))
}

/// List organizations, optionally filtered by name
async fn list_handler(
    State(handler): State<RouteState>,
    Query(params): Query<HashMap<String, String>>,
) -> ListResult {
    Ok(Json(handler.by_name(&params).await?))
}

async fn building_handler(
    State(handler): State<RouteState>,
    building_id: PathSegment,
) -> ListResult {
    let building_id = segment(&handler, "building_id", building_id)?;
    Ok(Json(handler.by_building(&building_id).await?))
}

async fn activity_handler(
    State(handler): State<RouteState>,
    activity_id: PathSegment,
) -> ListResult {
    let activity_id = segment(&handler, "activity_id", activity_id)?;
    Ok(Json(handler.by_activity(&activity_id).await?))
}

/// Radius search; parameters come from the query string
async fn radius_handler(
    State(handler): State<RouteState>,
    Query(params): Query<HashMap<String, String>>,
) -> ListResult {
    Ok(Json(handler.within_radius(&params).await?))
}

/// Rectangle search; parameters come from the query string
async fn rectangle_handler(
    State(handler): State<RouteState>,
    Query(params): Query<HashMap<String, String>>,
) -> ListResult {
    Ok(Json(handler.within_rectangle(&params).await?))
}

async fn detail_handler(
    State(handler): State<RouteState>,
    organization_id: PathSegment,
) -> Result<Json<OrganizationDetail>, RestError> {
    let organization_id = segment(&handler, "organization_id", organization_id)?;
    Ok(Json(handler.detail(&organization_id).await?))
}

/// Undecodable segments (e.g. invalid UTF-8) fail like any other bad id
fn segment(
    handler: &OrganizationHandler,
    field: &'static str,
    extracted: PathSegment,
) -> Result<String, RestError> {
    extracted.map(|Path(value)| value).map_err(|rejection| {
        handler.reject(ValidationError::WrongType {
            field,
            expected: "integer",
            value: rejection.body_text(),
        })
    })
}
