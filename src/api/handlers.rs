use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{
        Activity, CurrentUser, MessageResponse, PageParams, TitleQueryParams, UserList, UserTitle,
    },
};

use super::{AppState, ValidQuery};

// Response bodies

#[derive(Debug, Serialize)]
pub struct TitlesResponse {
    pub title: Vec<UserTitle>,
}

#[derive(Debug, Serialize)]
pub struct GenresResponse {
    pub genres: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<UserTitle>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchLaterResponse {
    pub watch_later: Vec<UserTitle>,
}

#[derive(Debug, Serialize)]
pub struct ActivitiesResponse {
    pub activities: Vec<Activity>,
}

fn parse_title_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::InvalidInput(format!("'{}' is not a valid title id", raw)))
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Filtered, paginated catalog
pub async fn get_titles(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    user: CurrentUser,
    ValidQuery(params): ValidQuery<TitleQueryParams>,
) -> AppResult<Json<TitlesResponse>> {
    tracing::debug!(request_id = %request_id, ?params, "Listing titles");

    let title = state.catalog.titles(&params, &user).await?;
    Ok(Json(TitlesResponse { title }))
}

/// Every genre present in the catalog
pub async fn get_genres(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<Json<GenresResponse>> {
    let genres = state.catalog.genres().await?;
    Ok(Json(GenresResponse { genres }))
}

pub async fn get_favorites(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidQuery(params): ValidQuery<PageParams>,
) -> AppResult<Json<FavoritesResponse>> {
    let favorites = state
        .catalog
        .list(UserList::Favorites, params.page.as_deref(), &user)
        .await?;
    Ok(Json(FavoritesResponse { favorites }))
}

pub async fn add_favorite(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let title_id = parse_title_id(&id)?;
    tracing::info!(request_id = %request_id, title_id = %title_id, "Adding favorite");

    let response = state
        .catalog
        .mark(UserList::Favorites, title_id, &user)
        .await?;
    Ok(Json(response))
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let title_id = parse_title_id(&id)?;
    tracing::info!(request_id = %request_id, title_id = %title_id, "Removing favorite");

    let response = state
        .catalog
        .unmark(UserList::Favorites, title_id, &user)
        .await?;
    Ok(Json(response))
}

pub async fn get_watch_later(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidQuery(params): ValidQuery<PageParams>,
) -> AppResult<Json<WatchLaterResponse>> {
    let watch_later = state
        .catalog
        .list(UserList::WatchLater, params.page.as_deref(), &user)
        .await?;
    Ok(Json(WatchLaterResponse { watch_later }))
}

pub async fn add_watch_later(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let title_id = parse_title_id(&id)?;
    tracing::info!(request_id = %request_id, title_id = %title_id, "Adding to watch later");

    let response = state
        .catalog
        .mark(UserList::WatchLater, title_id, &user)
        .await?;
    Ok(Json(response))
}

pub async fn remove_watch_later(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let title_id = parse_title_id(&id)?;
    tracing::info!(request_id = %request_id, title_id = %title_id, "Removing from watch later");

    let response = state
        .catalog
        .unmark(UserList::WatchLater, title_id, &user)
        .await?;
    Ok(Json(response))
}

/// The caller's activity feed, newest first
pub async fn get_activities(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidQuery(params): ValidQuery<PageParams>,
) -> AppResult<Json<ActivitiesResponse>> {
    let activities = state
        .catalog
        .activities(params.page.as_deref(), &user)
        .await?;
    Ok(Json(ActivitiesResponse { activities }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_title_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_title_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_title_id("42"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_watch_later_response_key() {
        let json = serde_json::to_value(WatchLaterResponse {
            watch_later: Vec::new(),
        })
        .unwrap();
        assert!(json.get("watchLater").is_some());
    }
}
