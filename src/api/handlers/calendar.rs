use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use uuid::Uuid;

use crate::api::errors::{ApiError, ApiResult};
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::domain::calendar::{CalendarEvent, CalendarEventDraft, DateRange};
use crate::domain::wardrobe::TaxonomyKind;

async fn check_references(
    state: &AppState,
    user_id: Uuid,
    draft: &CalendarEventDraft,
) -> ApiResult<()> {
    if let Some(occasion) = draft.occasion_id {
        if state
            .taxonomy
            .count_existing(TaxonomyKind::Occasion, &[occasion])
            .await?
            != 1
        {
            return Err(ApiError::bad_request("Unknown occasion"));
        }
    }
    if !draft.outfit_ids.is_empty()
        && state.outfits.count_owned(user_id, &draft.outfit_ids).await?
            != draft.outfit_ids.len() as i64
    {
        return Err(ApiError::bad_request("Outfits must be your own"));
    }
    Ok(())
}

/// GET /api/calendar?from=&to=
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(range): AppQuery<DateRange>,
) -> ApiResult<Json<Vec<CalendarEvent>>> {
    let range = range.validate()?;
    Ok(Json(state.calendar.list(auth.id(), range).await?))
}

/// POST /api/calendar
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(draft): AppJson<CalendarEventDraft>,
) -> ApiResult<(StatusCode, Json<CalendarEvent>)> {
    let draft = draft.normalize()?;
    check_references(&state, auth.id(), &draft).await?;

    let event = draft.into_event(auth.id(), Utc::now());
    state.calendar.create(&event).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/calendar/:id
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(draft): AppJson<CalendarEventDraft>,
) -> ApiResult<Json<CalendarEvent>> {
    let mut event = state
        .calendar
        .find_by_id(auth.id(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;
    let draft = draft.normalize()?;
    check_references(&state, auth.id(), &draft).await?;

    event.name = draft.name;
    event.occasion_id = draft.occasion_id;
    event.event_date = draft.event_date;
    event.note = draft.note;
    event.outfit_ids = draft.outfit_ids;
    event.updated_at = Utc::now();

    state.calendar.update(&event).await?;
    Ok(Json(event))
}

/// DELETE /api/calendar/:id
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.calendar.delete(auth.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
