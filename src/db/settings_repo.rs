// src/db/settings_repo.rs

use sqlx::PgPool;

use crate::{common::AppError, models::settings::AppSettings};

// A identidade visual é uma linha única; o UPSERT cobre o caso de uma base
// restaurada sem a linha semeada pela migração.
#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self) -> Result<AppSettings, AppError> {
        let settings = sqlx::query_as::<_, AppSettings>(
            "SELECT business_name, logo_url, updated_at FROM app_settings WHERE id = 1",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }

    pub async fn update(
        &self,
        business_name: &str,
        logo_url: Option<&str>,
    ) -> Result<AppSettings, AppError> {
        let settings = sqlx::query_as::<_, AppSettings>(
            r#"
            INSERT INTO app_settings (id, business_name, logo_url, updated_at)
            VALUES (1, $1, $2, now())
            ON CONFLICT (id) DO UPDATE
                SET business_name = $1, logo_url = $2, updated_at = now()
            RETURNING business_name, logo_url, updated_at
            "#,
        )
        .bind(business_name)
        .bind(logo_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }
}
