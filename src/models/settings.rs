// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// Identidade visual do estabelecimento. O upload da imagem em si fica fora
// daqui; guardamos apenas a referência.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub business_name: String,
    pub logo_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsPayload {
    #[validate(length(min = 1, message = "O nome do estabelecimento é obrigatório."))]
    pub business_name: String,
    pub logo_url: Option<String>,
}
