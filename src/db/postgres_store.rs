// src/db/postgres_store.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::AppError,
    db::StockStore,
    models::inventory::{
        InventoryItem, ItemPatch, MovementFilter, NewItem, NewMovement, StockMovement, Sector,
    },
};

// O adaptador principal: itens e movimentações direto no Postgres.
//
// As queries usam a API de runtime do sqlx (`query_as` + `bind`); as macros
// verificadas em tempo de compilação exigem um banco acessível no build.
#[derive(Clone)]
pub struct PgStockStore {
    pool: PgPool,
}

impl PgStockStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StockStore for PgStockStore {
    async fn get_item(&self, id: Uuid) -> Result<InventoryItem, AppError> {
        sqlx::query_as::<_, InventoryItem>("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::ItemNotFound)
    }

    async fn list_items(&self, sector: Option<Sector>) -> Result<Vec<InventoryItem>, AppError> {
        let items = sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT * FROM items
            WHERE ($1::sector IS NULL OR sector = $1)
            ORDER BY name ASC
            "#,
        )
        .bind(sector)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn create_item(&self, item: NewItem) -> Result<InventoryItem, AppError> {
        let created = sqlx::query_as::<_, InventoryItem>(
            r#"
            INSERT INTO items
                (name, description, sector, unit, quantity, min_quantity, price, category, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(item.name)
        .bind(item.description)
        .bind(item.sector)
        .bind(item.unit)
        .bind(item.quantity)
        .bind(item.min_quantity)
        .bind(item.price)
        .bind(item.category)
        .bind(item.image_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_item(&self, id: Uuid, patch: ItemPatch) -> Result<InventoryItem, AppError> {
        // Campo nulo no patch mantém o valor atual da coluna.
        sqlx::query_as::<_, InventoryItem>(
            r#"
            UPDATE items SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                sector = COALESCE($4::sector, sector),
                unit = COALESCE($5::measure_unit, unit),
                quantity = COALESCE($6, quantity),
                min_quantity = COALESCE($7, min_quantity),
                price = COALESCE($8, price),
                category = COALESCE($9, category),
                image_url = COALESCE($10, image_url)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.description)
        .bind(patch.sector)
        .bind(patch.unit)
        .bind(patch.quantity)
        .bind(patch.min_quantity)
        .bind(patch.price)
        .bind(patch.category)
        .bind(patch.image_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::ItemNotFound)
    }

    async fn update_item_quantity(
        &self,
        id: Uuid,
        new_quantity: f64,
    ) -> Result<InventoryItem, AppError> {
        sqlx::query_as::<_, InventoryItem>(
            "UPDATE items SET quantity = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(new_quantity)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::ItemNotFound)
    }

    async fn delete_item(&self, id: Uuid) -> Result<(), AppError> {
        // As movimentações do item caem junto (ON DELETE CASCADE).
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::ItemNotFound);
        }
        Ok(())
    }

    async fn get_movement(&self, id: Uuid) -> Result<StockMovement, AppError> {
        sqlx::query_as::<_, StockMovement>("SELECT * FROM stock_movements WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::MovementNotFound)
    }

    async fn insert_movement(&self, movement: NewMovement) -> Result<StockMovement, AppError> {
        sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements
                (item_id, user_id, movement_type, item_name, item_unit, item_price, quantity, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(movement.item_id)
        .bind(movement.user_id)
        .bind(movement.movement_type)
        .bind(movement.item_name)
        .bind(movement.item_unit)
        .bind(movement.item_price)
        .bind(movement.quantity)
        .bind(movement.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                // Item excluído por outro ator entre a leitura e a escrita.
                if db_err.is_foreign_key_violation() {
                    return AppError::ItemNotFound;
                }
            }
            e.into()
        })
    }

    async fn delete_movement(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM stock_movements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::MovementNotFound);
        }
        Ok(())
    }

    async fn list_movements(
        &self,
        filter: MovementFilter,
    ) -> Result<Vec<StockMovement>, AppError> {
        // O setor vive no item, não no histórico; o JOIN não perde linhas
        // porque movimentações caem junto com o item neste backend.
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT m.* FROM stock_movements m
            JOIN items i ON i.id = m.item_id
            WHERE ($1::date IS NULL OR m.created_at::date = $1)
              AND ($2::sector IS NULL OR i.sector = $2)
              AND ($3::uuid IS NULL OR m.user_id = $3)
            ORDER BY m.created_at DESC
            "#,
        )
        .bind(filter.date)
        .bind(filter.sector)
        .bind(filter.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }
}
