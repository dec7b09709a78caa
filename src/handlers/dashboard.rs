// src/handlers/dashboard.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::collections::HashMap;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::AppError,
    config::AppState,
    models::{
        dashboard::{DailySummary, RankingEntry, WeeklyEntry},
        inventory::{InventoryItem, Sector},
    },
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct SummaryParams {
    pub sector: Option<Sector>,
}

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    params(SummaryParams),
    responses(
        (status = 200, description = "Totais de entradas e saídas de hoje", body = DailySummary),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state
        .dashboard_service
        .daily_summary(params.sector)
        .await?;
    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/dashboard/weekly
#[utoipa::path(
    get,
    path = "/api/dashboard/weekly",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Totais por dia dos últimos 7 dias", body = Vec<WeeklyEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_weekly_totals(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let totals = app_state.dashboard_service.weekly_totals().await?;
    Ok((StatusCode::OK, Json(totals)))
}

// GET /api/dashboard/ranking
#[utoipa::path(
    get,
    path = "/api/dashboard/ranking",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Funcionários por movimentações registradas", body = Vec<RankingEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_employee_ranking(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let mut ranking = app_state.dashboard_service.employee_ranking().await?;

    // O serviço só conhece IDs; os nomes moram no Postgres local.
    let names: HashMap<Uuid, String> = app_state
        .user_repo
        .list_users()
        .await?
        .into_iter()
        .map(|user| (user.id, user.name))
        .collect();
    for entry in &mut ranking {
        entry.user_name = names.get(&entry.user_id).cloned();
    }

    Ok((StatusCode::OK, Json(ranking)))
}

// GET /api/dashboard/alerts
#[utoipa::path(
    get,
    path = "/api/dashboard/alerts",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Itens no limiar de estoque baixo ou abaixo dele", body = Vec<InventoryItem>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_low_stock_alerts(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let alerts = app_state.dashboard_service.low_stock_alerts().await?;
    Ok((StatusCode::OK, Json(alerts)))
}
