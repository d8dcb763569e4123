use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::errors::{ApiError, ApiResult};
use crate::api::extract::{AppJson, AppPath};
use crate::api::middleware::{AdminUser, AuthUser};
use crate::api::state::AppState;
use crate::domain::errors::validate_length;
use crate::domain::wardrobe::item::optional_text;
use crate::domain::wardrobe::{TaxonomyEntry, TaxonomyKind};

#[derive(Debug, Deserialize)]
pub struct TaxonomyRequest {
    pub name: String,
    pub description: Option<String>,
}

impl TaxonomyRequest {
    fn normalize(self) -> Result<(String, Option<String>), ApiError> {
        validate_length("Name", &self.name, 1, 50)?;
        let description = optional_text("Description", self.description, 500)?;
        Ok((self.name.trim().to_string(), description))
    }
}

fn parse_kind(kind: &str) -> Result<TaxonomyKind, ApiError> {
    kind.parse().map_err(ApiError::bad_request)
}

/// GET /api/taxonomy/:kind
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    AppPath(kind): AppPath<String>,
) -> ApiResult<Json<Vec<TaxonomyEntry>>> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.taxonomy.list(kind).await?))
}

/// POST /api/admin/taxonomy/:kind
pub async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppPath(kind): AppPath<String>,
    AppJson(req): AppJson<TaxonomyRequest>,
) -> ApiResult<(StatusCode, Json<TaxonomyEntry>)> {
    let kind = parse_kind(&kind)?;
    let (name, description) = req.normalize()?;
    let entry = state
        .taxonomy
        .create(kind, &name, description.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /api/admin/taxonomy/:kind/:id
pub async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppPath((kind, id)): AppPath<(String, Uuid)>,
    AppJson(req): AppJson<TaxonomyRequest>,
) -> ApiResult<Json<TaxonomyEntry>> {
    let kind = parse_kind(&kind)?;
    let (name, description) = req.normalize()?;
    let entry = state
        .taxonomy
        .update(kind, id, &name, description.as_deref())
        .await?;
    Ok(Json(entry))
}

/// DELETE /api/admin/taxonomy/:kind/:id
pub async fn delete(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppPath((kind, id)): AppPath<(String, Uuid)>,
) -> ApiResult<StatusCode> {
    let kind = parse_kind(&kind)?;
    state.taxonomy.delete(kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
