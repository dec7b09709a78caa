// src/db/legacy_api_store.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode, header};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::{
    common::{
        AppError,
        numeric::{flexible_decimal, flexible_quantity, flexible_quantity_opt},
    },
    db::StockStore,
    models::inventory::{
        InventoryItem, ItemPatch, MeasureUnit, MovementFilter, MovementType, NewItem,
        NewMovement, StockMovement, Sector,
    },
};

// O deploy antigo (PHP/MySQL) continua no ar e alguns pontos de venda ainda
// gravam nele. Este adaptador fala com aquela API REST e entrega o mesmo
// contrato do Postgres para o resto da aplicação.
//
// Requisição pendurada é abortada no cliente depois de 15 segundos; o
// servidor não recebe nenhum sinal de cancelamento.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct LegacyApiStore {
    client: Client,
    base_url: String,
}

impl LegacyApiStore {
    pub fn new(base_url: String, api_token: Option<String>) -> Result<Self, AppError> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = api_token {
            let value = header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| anyhow::anyhow!("LEGACY_API_TOKEN inválido: {e}"))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// 404 vira o erro de domínio passado; qualquer outro status fora da
    /// faixa 2xx vira falha de comunicação. Não há retry automático.
    fn check_status(resp: Response, missing: AppError) -> Result<Response, AppError> {
        match resp.status() {
            s if s.is_success() => Ok(resp),
            StatusCode::NOT_FOUND => Err(missing),
            s => Err(AppError::NetworkFailure(format!(
                "resposta inesperada da API legada: {s}"
            ))),
        }
    }
}

// ---
// DTOs da API legada
// ---
// O MySQL de lá serializa numéricos como string ("12,50" inclusive), por
// isso todos os campos de quantidade e preço passam pelos helpers flexíveis.

#[derive(Debug, Deserialize)]
struct LegacyItemDto {
    id: Uuid,
    nome: String,
    #[serde(default)]
    descricao: Option<String>,
    setor: Sector,
    unidade: MeasureUnit,
    #[serde(default, deserialize_with = "flexible_quantity")]
    quantidade: f64,
    #[serde(default, deserialize_with = "flexible_quantity_opt")]
    quantidade_minima: Option<f64>,
    #[serde(deserialize_with = "flexible_decimal")]
    preco: Decimal,
    #[serde(default)]
    categoria: Option<String>,
    #[serde(default)]
    imagem_url: Option<String>,
    criado_em: DateTime<Utc>,
}

impl From<LegacyItemDto> for InventoryItem {
    fn from(dto: LegacyItemDto) -> Self {
        InventoryItem {
            id: dto.id,
            name: dto.nome,
            description: dto.descricao,
            sector: dto.setor,
            unit: dto.unidade,
            quantity: dto.quantidade,
            min_quantity: dto.quantidade_minima,
            price: dto.preco,
            category: dto.categoria,
            image_url: dto.imagem_url,
            created_at: dto.criado_em,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LegacyMovementDto {
    id: Uuid,
    item_id: Uuid,
    usuario_id: Uuid,
    tipo: MovementType,
    item_nome: String,
    item_unidade: MeasureUnit,
    #[serde(deserialize_with = "flexible_decimal")]
    item_preco: Decimal,
    #[serde(default, deserialize_with = "flexible_quantity")]
    quantidade: f64,
    #[serde(default)]
    observacao: Option<String>,
    criado_em: DateTime<Utc>,
}

impl From<LegacyMovementDto> for StockMovement {
    fn from(dto: LegacyMovementDto) -> Self {
        StockMovement {
            id: dto.id,
            item_id: dto.item_id,
            user_id: dto.usuario_id,
            movement_type: dto.tipo,
            item_name: dto.item_nome,
            item_unit: dto.item_unidade,
            item_price: dto.item_preco,
            quantity: dto.quantidade,
            notes: dto.observacao,
            created_at: dto.criado_em,
        }
    }
}

// A API antiga não gera chave: o id vem do cliente, como os frontends
// daquela época já faziam (char(36) no MySQL).
#[derive(Debug, Serialize)]
struct LegacyNewItemDto {
    id: Uuid,
    nome: String,
    descricao: Option<String>,
    setor: Sector,
    unidade: MeasureUnit,
    quantidade: f64,
    quantidade_minima: Option<f64>,
    preco: Decimal,
    categoria: Option<String>,
    imagem_url: Option<String>,
    criado_em: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize)]
struct LegacyItemPatchDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    descricao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    setor: Option<Sector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unidade: Option<MeasureUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantidade: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantidade_minima: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preco: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    categoria: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    imagem_url: Option<String>,
}

impl From<ItemPatch> for LegacyItemPatchDto {
    fn from(patch: ItemPatch) -> Self {
        LegacyItemPatchDto {
            nome: patch.name,
            descricao: patch.description,
            setor: patch.sector,
            unidade: patch.unit,
            quantidade: patch.quantity,
            quantidade_minima: patch.min_quantity,
            preco: patch.price,
            categoria: patch.category,
            imagem_url: patch.image_url,
        }
    }
}

#[derive(Debug, Serialize)]
struct LegacyNewMovementDto {
    id: Uuid,
    item_id: Uuid,
    usuario_id: Uuid,
    tipo: MovementType,
    item_nome: String,
    item_unidade: MeasureUnit,
    item_preco: Decimal,
    quantidade: f64,
    observacao: Option<String>,
    criado_em: DateTime<Utc>,
}

fn sector_param(sector: Sector) -> &'static str {
    match sector {
        Sector::Bar => "bar",
        Sector::Cozinha => "cozinha",
    }
}

#[async_trait]
impl StockStore for LegacyApiStore {
    async fn get_item(&self, id: Uuid) -> Result<InventoryItem, AppError> {
        let resp = self.client.get(self.url(&format!("itens/{id}"))).send().await?;
        let dto: LegacyItemDto = Self::check_status(resp, AppError::ItemNotFound)?
            .json()
            .await?;
        Ok(dto.into())
    }

    async fn list_items(&self, sector: Option<Sector>) -> Result<Vec<InventoryItem>, AppError> {
        let mut request = self.client.get(self.url("itens"));
        if let Some(sector) = sector {
            request = request.query(&[("setor", sector_param(sector))]);
        }
        let resp = request.send().await?;
        let dtos: Vec<LegacyItemDto> = Self::check_status(resp, AppError::ItemNotFound)?
            .json()
            .await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn create_item(&self, item: NewItem) -> Result<InventoryItem, AppError> {
        let dto = LegacyNewItemDto {
            id: Uuid::new_v4(),
            nome: item.name,
            descricao: item.description,
            setor: item.sector,
            unidade: item.unit,
            quantidade: item.quantity,
            quantidade_minima: item.min_quantity,
            preco: item.price,
            categoria: item.category,
            imagem_url: item.image_url,
            criado_em: Utc::now(),
        };
        let resp = self.client.post(self.url("itens")).json(&dto).send().await?;
        let created: LegacyItemDto = Self::check_status(resp, AppError::ItemNotFound)?
            .json()
            .await?;
        Ok(created.into())
    }

    async fn update_item(&self, id: Uuid, patch: ItemPatch) -> Result<InventoryItem, AppError> {
        let dto = LegacyItemPatchDto::from(patch);
        let resp = self
            .client
            .patch(self.url(&format!("itens/{id}")))
            .json(&dto)
            .send()
            .await?;
        let updated: LegacyItemDto = Self::check_status(resp, AppError::ItemNotFound)?
            .json()
            .await?;
        Ok(updated.into())
    }

    async fn update_item_quantity(
        &self,
        id: Uuid,
        new_quantity: f64,
    ) -> Result<InventoryItem, AppError> {
        let dto = LegacyItemPatchDto {
            quantidade: Some(new_quantity),
            ..Default::default()
        };
        let resp = self
            .client
            .patch(self.url(&format!("itens/{id}")))
            .json(&dto)
            .send()
            .await?;
        let updated: LegacyItemDto = Self::check_status(resp, AppError::ItemNotFound)?
            .json()
            .await?;
        Ok(updated.into())
    }

    async fn delete_item(&self, id: Uuid) -> Result<(), AppError> {
        let resp = self
            .client
            .delete(self.url(&format!("itens/{id}")))
            .send()
            .await?;
        Self::check_status(resp, AppError::ItemNotFound)?;
        Ok(())
    }

    async fn get_movement(&self, id: Uuid) -> Result<StockMovement, AppError> {
        let resp = self
            .client
            .get(self.url(&format!("movimentacoes/{id}")))
            .send()
            .await?;
        let dto: LegacyMovementDto = Self::check_status(resp, AppError::MovementNotFound)?
            .json()
            .await?;
        Ok(dto.into())
    }

    async fn insert_movement(&self, movement: NewMovement) -> Result<StockMovement, AppError> {
        let dto = LegacyNewMovementDto {
            id: Uuid::new_v4(),
            item_id: movement.item_id,
            usuario_id: movement.user_id,
            tipo: movement.movement_type,
            item_nome: movement.item_name,
            item_unidade: movement.item_unit,
            item_preco: movement.item_price,
            quantidade: movement.quantity,
            observacao: movement.notes,
            criado_em: Utc::now(),
        };
        let resp = self
            .client
            .post(self.url("movimentacoes"))
            .json(&dto)
            .send()
            .await?;
        let created: LegacyMovementDto = Self::check_status(resp, AppError::ItemNotFound)?
            .json()
            .await?;
        Ok(created.into())
    }

    async fn delete_movement(&self, id: Uuid) -> Result<(), AppError> {
        let resp = self
            .client
            .delete(self.url(&format!("movimentacoes/{id}")))
            .send()
            .await?;
        Self::check_status(resp, AppError::MovementNotFound)?;
        Ok(())
    }

    async fn list_movements(
        &self,
        filter: MovementFilter,
    ) -> Result<Vec<StockMovement>, AppError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(date) = filter.date {
            params.push(("data", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(sector) = filter.sector {
            params.push(("setor", sector_param(sector).to_string()));
        }
        if let Some(user_id) = filter.user_id {
            params.push(("usuario_id", user_id.to_string()));
        }

        let resp = self
            .client
            .get(self.url("movimentacoes"))
            .query(&params)
            .send()
            .await?;
        let dtos: Vec<LegacyMovementDto> = Self::check_status(resp, AppError::MovementNotFound)?
            .json()
            .await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }
}
