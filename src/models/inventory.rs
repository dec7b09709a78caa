// src/models/inventory.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// --- 1. Setores ---
// A casa é dividida em dois setores de estoque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sector", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    Bar,
    Cozinha,
}

// --- 2. Unidades de Medida ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "measure_unit", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MeasureUnit {
    Unidade,
    Kg,
    Litro,
    Caixa,
    Pacote,
}

// --- 3. Tipos de Movimentação ---
// `entrada` soma, `saida` subtrai. `edicao` é registro de auditoria gravado
// quando um admin altera o saldo direto na ficha do item; não tem direção
// própria e não participa da aritmética de aplicação/estorno.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "movement_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    Entrada,
    Saida,
    Edicao,
}

impl MovementType {
    /// Delta com sinal aplicado ao saldo quando a movimentação é criada.
    pub fn apply_delta(self, magnitude: f64) -> Option<f64> {
        match self {
            MovementType::Entrada => Some(magnitude),
            MovementType::Saida => Some(-magnitude),
            MovementType::Edicao => None,
        }
    }

    /// Delta com sinal que desfaz a movimentação (o inverso da aplicação).
    pub fn reversal_delta(self, magnitude: f64) -> Option<f64> {
        self.apply_delta(magnitude).map(|delta| -delta)
    }
}

// --- 4. Itens ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sector: Sector,
    pub unit: MeasureUnit,
    // Invariante: nunca negativo depois de qualquer movimentação confirmada.
    pub quantity: f64,
    // Limiar de alerta de estoque baixo; nulo desliga o alerta.
    pub min_quantity: Option<f64>,
    pub price: Decimal,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Dados de criação de um item. O saldo inicial entra aqui, sem gerar
/// movimentação; depois disso o saldo só muda via aplicação/estorno.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub sector: Sector,
    pub unit: MeasureUnit,
    pub quantity: f64,
    pub min_quantity: Option<f64>,
    pub price: Decimal,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// Alteração parcial de um item; campo `None` fica como está.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sector: Option<Sector>,
    pub unit: Option<MeasureUnit>,
    pub quantity: Option<f64>,
    pub min_quantity: Option<f64>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

// --- 5. Movimentações de Estoque ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub item_id: Uuid,
    pub user_id: Uuid,
    pub movement_type: MovementType,
    // Snapshot do item no momento do registro; o histórico não some se o
    // item for renomeado ou excluído no backend legado.
    pub item_name: String,
    pub item_unit: MeasureUnit,
    pub item_price: Decimal,
    // Invariante: sempre a magnitude positiva. A direção mora em movement_type.
    pub quantity: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMovement {
    pub item_id: Uuid,
    pub user_id: Uuid,
    pub movement_type: MovementType,
    pub item_name: String,
    pub item_unit: MeasureUnit,
    pub item_price: Decimal,
    pub quantity: f64,
    pub notes: Option<String>,
}

/// Filtro de listagem do histórico.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MovementFilter {
    pub date: Option<NaiveDate>,
    pub sector: Option<Sector>,
    pub user_id: Option<Uuid>,
}

/// Resposta de uma aplicação bem sucedida: o item já com o novo saldo e a
/// movimentação registrada.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppliedMovement {
    pub item: InventoryItem,
    pub movement: StockMovement,
}

// --- 6. Categorias ---
// Metadado organizacional puro; nenhuma invariante de saldo passa por aqui.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub sector: Sector,
    pub icon: Option<String>,
    pub gradient: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}
