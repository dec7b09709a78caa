// src/handlers/inventory.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{
        AppError,
        numeric::{flexible_quantity, flexible_quantity_opt},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{CanManageCatalog, RequireCapability},
    },
    models::inventory::{Category, InventoryItem, ItemPatch, MeasureUnit, NewItem, Sector},
};

// ---
// Validação de preço (Decimal não tem `range` no validator)
// ---
fn non_negative_price(value: Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("O preço não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

fn price_errors(field_error: ValidationError) -> AppError {
    let mut errors = validator::ValidationErrors::new();
    errors.add("price", field_error);
    AppError::ValidationError(errors)
}

// ---
// Payload: CreateItem
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub description: Option<String>,

    pub sector: Sector,
    pub unit: MeasureUnit,

    /// Saldo inicial; aceita número ou string com vírgula decimal ("12,5").
    #[serde(default, deserialize_with = "flexible_quantity")]
    #[schema(value_type = f64)]
    pub quantity: f64,

    #[serde(default, deserialize_with = "flexible_quantity_opt")]
    #[schema(value_type = Option<f64>)]
    pub min_quantity: Option<f64>,

    #[serde(default)]
    pub price: Decimal,

    pub category: Option<String>,
    pub image_url: Option<String>,
}

// ---
// Handler: create_item
// ---
#[utoipa::path(
    post,
    path = "/api/inventory/items",
    tag = "Inventory",
    request_body = CreateItemPayload,
    responses(
        (status = 201, description = "Item criado", body = InventoryItem),
        (status = 403, description = "Requer admin ou dono")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanManageCatalog>,
    Json(payload): Json<CreateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    non_negative_price(payload.price).map_err(price_errors)?;

    let new_item = app_state
        .inventory_service
        .create_item(NewItem {
            name: payload.name,
            description: payload.description,
            sector: payload.sector,
            unit: payload.unit,
            quantity: payload.quantity,
            min_quantity: payload.min_quantity,
            price: payload.price,
            category: payload.category,
            image_url: payload.image_url,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(new_item)))
}

// ---
// Handler: list_items
// ---
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListItemsParams {
    pub sector: Option<Sector>,
}

#[utoipa::path(
    get,
    path = "/api/inventory/items",
    tag = "Inventory",
    params(ListItemsParams),
    responses(
        (status = 200, description = "Itens do estoque", body = Vec<InventoryItem>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_items(
    State(app_state): State<AppState>,
    Query(params): Query<ListItemsParams>,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state.inventory_service.list_items(params.sector).await?;
    Ok((StatusCode::OK, Json(items)))
}

// ---
// Payload: UpdateItem (patch parcial; campo ausente fica como está)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemPayload {
    #[validate(length(min = 1, message = "O nome não pode ficar vazio."))]
    pub name: Option<String>,

    pub description: Option<String>,
    pub sector: Option<Sector>,
    pub unit: Option<MeasureUnit>,

    /// Ajuste direto de saldo; gera registro de auditoria no histórico.
    #[serde(default, deserialize_with = "flexible_quantity_opt")]
    #[schema(value_type = Option<f64>)]
    pub quantity: Option<f64>,

    #[serde(default, deserialize_with = "flexible_quantity_opt")]
    #[schema(value_type = Option<f64>)]
    pub min_quantity: Option<f64>,

    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

// ---
// Handler: update_item
// ---
#[utoipa::path(
    put,
    path = "/api/inventory/items/{id}",
    tag = "Inventory",
    request_body = UpdateItemPayload,
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Item atualizado", body = InventoryItem),
        (status = 403, description = "Requer admin ou dono"),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireCapability<CanManageCatalog>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    if let Some(price) = payload.price {
        non_negative_price(price).map_err(price_errors)?;
    }

    let patch = ItemPatch {
        name: payload.name,
        description: payload.description,
        sector: payload.sector,
        unit: payload.unit,
        quantity: payload.quantity,
        min_quantity: payload.min_quantity,
        price: payload.price,
        category: payload.category,
        image_url: payload.image_url,
    };

    let updated = app_state
        .inventory_service
        .update_item(id, patch, user.0.id)
        .await?;

    Ok((StatusCode::OK, Json(updated)))
}

// ---
// Handler: delete_item
// ---
#[utoipa::path(
    delete,
    path = "/api/inventory/items/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 204, description = "Item excluído (movimentações caem junto)"),
        (status = 403, description = "Requer admin ou dono"),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanManageCatalog>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.inventory_service.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Payload: CreateCategory
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub sector: Sector,
    pub parent_id: Option<Uuid>,
    pub icon: Option<String>,
    pub gradient: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

// ---
// Handler: create_category
// ---
#[utoipa::path(
    post,
    path = "/api/inventory/categories",
    tag = "Inventory",
    request_body = CreateCategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 409, description = "Nome duplicado no setor")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanManageCatalog>,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let category = app_state
        .category_repo
        .create(
            &payload.name,
            payload.sector,
            payload.parent_id,
            payload.icon.as_deref(),
            payload.gradient.as_deref(),
            payload.sort_order,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

// ---
// Handler: list_categories
// ---
#[utoipa::path(
    get,
    path = "/api/inventory/categories",
    tag = "Inventory",
    params(ListItemsParams),
    responses(
        (status = 200, description = "Categorias cadastradas", body = Vec<Category>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    Query(params): Query<ListItemsParams>,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.category_repo.list(params.sector).await?;
    Ok((StatusCode::OK, Json(categories)))
}

// ---
// Handler: delete_category
// ---
#[utoipa::path(
    delete,
    path = "/api/inventory/categories/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 204, description = "Categoria excluída"),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanManageCatalog>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.category_repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
