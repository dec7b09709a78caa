// src/db/category_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::AppError,
    models::inventory::{Category, Sector},
};

#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, sector: Option<Sector>) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT * FROM categories
            WHERE ($1::sector IS NULL OR sector = $1)
            ORDER BY sort_order ASC, name ASC
            "#,
        )
        .bind(sector)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    /// Cria uma categoria (raiz ou subcategoria, via parent_id).
    pub async fn create(
        &self,
        name: &str,
        sector: Sector,
        parent_id: Option<Uuid>,
        icon: Option<&str>,
        gradient: Option<&str>,
        sort_order: i32,
    ) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, sector, parent_id, icon, gradient, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(sector)
        .bind(parent_id)
        .bind(icon)
        .bind(gradient)
        .bind(sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::CategoryAlreadyExists;
                }
            }
            e.into()
        })
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        // Subcategorias caem junto (ON DELETE CASCADE no parent_id).
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::CategoryNotFound);
        }
        Ok(())
    }
}
