// src/models/dashboard.rs

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

// 1. Resumo do Dia (os cards do topo)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    pub entries_count: i64,
    pub entries_total: f64,
    pub exits_count: i64,
    pub exits_total: f64,
}

// 2. Agregado por dia (últimos 7 dias)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyEntry {
    pub date: NaiveDate,
    pub entries_total: f64,
    pub exits_total: f64,
}

// 3. Ranking de funcionários por movimentações registradas
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub user_id: Uuid,
    // Preenchido na borda HTTP; o serviço de dashboard só conhece IDs.
    pub user_name: Option<String>,
    pub movements_count: i64,
}
