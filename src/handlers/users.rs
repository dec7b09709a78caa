// src/handlers/users.rs
//
// Gestão de usuários: rotas exclusivas do dono.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::AppError,
    config::AppState,
    middleware::rbac::{OwnerOnly, RequireCapability},
    models::auth::{Role, User},
};

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "Todos os usuários cadastrados", body = Vec<User>),
        (status = 403, description = "Somente o dono")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    _guard: RequireCapability<OwnerOnly>,
) -> Result<impl IntoResponse, AppError> {
    let users = app_state.user_repo.list_users().await?;
    Ok((StatusCode::OK, Json(users)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRolePayload {
    pub role: Role,
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/role",
    tag = "Users",
    request_body = UpdateRolePayload,
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Papel atualizado", body = User),
        (status = 403, description = "Somente o dono"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_role(
    State(app_state): State<AppState>,
    _guard: RequireCapability<OwnerOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.user_repo.update_role(id, payload.role).await?;
    Ok((StatusCode::OK, Json(user)))
}
