// src/handlers/settings.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    common::AppError,
    config::AppState,
    middleware::rbac::{OwnerOnly, RequireCapability},
    models::settings::{AppSettings, UpdateSettingsPayload},
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Identidade visual do estabelecimento", body = AppSettings)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let settings = app_state.settings_repo.get().await?;
    Ok((StatusCode::OK, Json(settings)))
}

// PUT /api/settings
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    request_body = UpdateSettingsPayload,
    responses(
        (status = 200, description = "Identidade visual atualizada", body = AppSettings),
        (status = 403, description = "Somente o dono")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    _guard: RequireCapability<OwnerOnly>,
    Json(payload): Json<UpdateSettingsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let settings = app_state
        .settings_repo
        .update(&payload.business_name, payload.logo_url.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(settings)))
}
