//! Group handlers for the Web API.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::blog::BlogService;
use crate::web::dto::{ApiResponse, GroupResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /api/groups - List all groups.
pub async fn list_groups(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<GroupResponse>>>, ApiError> {
    let service = BlogService::new(&state.db, &state.listing);
    let groups = service.list_groups().await?;

    let responses: Vec<GroupResponse> = groups
        .into_iter()
        .map(|g| GroupResponse {
            id: g.id,
            title: g.title,
            slug: g.slug,
            description: g.description,
            created_at: g.created_at,
        })
        .collect();

    Ok(Json(ApiResponse::new(responses)))
}

/// GET /api/groups/:slug - Get group details.
pub async fn get_group(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<GroupResponse>>, ApiError> {
    let service = BlogService::new(&state.db, &state.listing);
    let group = service.get_group(&slug).await?;

    let response = GroupResponse {
        id: group.id,
        title: group.title,
        slug: group.slug,
        description: group.description,
        created_at: group.created_at,
    };

    Ok(Json(ApiResponse::new(response)))
}
