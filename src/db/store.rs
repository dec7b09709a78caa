// src/db/store.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::AppError,
    models::inventory::{
        InventoryItem, ItemPatch, MovementFilter, NewItem, NewMovement, StockMovement, Sector,
    },
};

/// O colaborador de armazenamento do livro de movimentações.
///
/// Existem duas implementações com o mesmo contrato: o Postgres local
/// (`PgStockStore`) e a API JSON do sistema antigo (`LegacyApiStore`). A
/// aritmética de saldo é escrita uma única vez contra este trait; nenhuma
/// regra de negócio mora nos adaptadores.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StockStore: Send + Sync {
    async fn get_item(&self, id: Uuid) -> Result<InventoryItem, AppError>;
    async fn list_items(&self, sector: Option<Sector>) -> Result<Vec<InventoryItem>, AppError>;
    async fn create_item(&self, item: NewItem) -> Result<InventoryItem, AppError>;
    async fn update_item(&self, id: Uuid, patch: ItemPatch) -> Result<InventoryItem, AppError>;

    /// Grava o novo saldo absoluto de um item e devolve o item atualizado.
    async fn update_item_quantity(
        &self,
        id: Uuid,
        new_quantity: f64,
    ) -> Result<InventoryItem, AppError>;

    async fn delete_item(&self, id: Uuid) -> Result<(), AppError>;

    async fn get_movement(&self, id: Uuid) -> Result<StockMovement, AppError>;
    async fn insert_movement(&self, movement: NewMovement) -> Result<StockMovement, AppError>;
    async fn delete_movement(&self, id: Uuid) -> Result<(), AppError>;
    async fn list_movements(
        &self,
        filter: MovementFilter,
    ) -> Result<Vec<StockMovement>, AppError>;
}
