// src/handlers/movements.rs
//
// A borda HTTP do livro de movimentações: registrar, listar e estornar.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::ValidationError;

use crate::{
    common::AppError,
    config::AppState,
    db::StockStore,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{CanCancelMovements, RequireCapability},
    },
    models::inventory::{
        AppliedMovement, InventoryItem, MovementFilter, MovementType, StockMovement,
    },
};

// ---
// Payload: ApplyMovement
// ---
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyMovementPayload {
    pub item_id: Uuid,
    pub movement_type: MovementType,

    /// Número ou string ("12,5"); o normalizador resolve antes da conta.
    #[schema(value_type = Object)]
    pub quantity: serde_json::Value,

    pub notes: Option<String>,
}

impl ApplyMovementPayload {
    // Registros `edicao` nascem da edição da ficha do item, nunca por aqui.
    fn validate_movement_type(&self) -> Result<(), ValidationError> {
        if self.movement_type == MovementType::Edicao {
            let mut err = ValidationError::new("movement_type");
            err.message =
                Some("Apenas 'entrada' ou 'saida' podem ser registradas por aqui.".into());
            return Err(err);
        }
        Ok(())
    }
}

// ---
// Handler: apply_movement
// ---
#[utoipa::path(
    post,
    path = "/api/inventory/movements",
    tag = "Movements",
    request_body = ApplyMovementPayload,
    responses(
        (status = 201, description = "Movimentação aplicada", body = AppliedMovement),
        (status = 409, description = "Estoque insuficiente"),
        (status = 422, description = "Quantidade inválida"),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn apply_movement(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<ApplyMovementPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate_movement_type().map_err(|e| {
        let mut errors = validator::ValidationErrors::new();
        errors.add("movementType", e);
        AppError::ValidationError(errors)
    })?;

    let applied = app_state
        .ledger_service
        .apply_movement(
            payload.item_id,
            payload.movement_type,
            &payload.quantity,
            user.0.id,
            payload.notes,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(applied)))
}

// ---
// Handler: list_movements
// ---
#[utoipa::path(
    get,
    path = "/api/inventory/movements",
    tag = "Movements",
    params(MovementFilter),
    responses(
        (status = 200, description = "Histórico filtrado", body = Vec<StockMovement>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    Query(filter): Query<MovementFilter>,
) -> Result<impl IntoResponse, AppError> {
    let movements = app_state.stock_store.list_movements(filter).await?;
    Ok((StatusCode::OK, Json(movements)))
}

// ---
// Handler: cancel_movement
// ---
#[utoipa::path(
    delete,
    path = "/api/inventory/movements/{id}",
    tag = "Movements",
    params(("id" = Uuid, Path, description = "ID da movimentação")),
    responses(
        (status = 200, description = "Estorno aplicado; item com o saldo revertido", body = InventoryItem),
        (status = 409, description = "O estorno deixaria o saldo negativo"),
        (status = 403, description = "Requer admin ou dono"),
        (status = 404, description = "Movimentação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_movement(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanCancelMovements>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state.ledger_service.cancel_movement(id).await?;
    Ok((StatusCode::OK, Json(item)))
}
