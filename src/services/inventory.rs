// src/services/inventory.rs

use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::{AppError, numeric::normalize_f64},
    db::StockStore,
    models::inventory::{
        InventoryItem, ItemPatch, MovementType, NewItem, NewMovement, Sector,
    },
    services::cache::ReadCache,
};

// CRUD de itens contra o backend selecionado, com reconciliação do cache
// de leitura a cada escrita. A aritmética de saldo não mora aqui: ela fica
// no LedgerService; este serviço só toca o saldo no caso de ajuste direto
// na ficha do item, e registra esse ajuste como auditoria.
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn StockStore>,
    cache: Arc<RwLock<ReadCache>>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn StockStore>, cache: Arc<RwLock<ReadCache>>) -> Self {
        Self { store, cache }
    }

    /// Lista do cache quando carregada; senão busca a lista completa no
    /// backend, popula o cache e filtra por setor em memória.
    pub async fn list_items(&self, sector: Option<Sector>) -> Result<Vec<InventoryItem>, AppError> {
        if let Some(items) = self.cache.read().await.items(sector) {
            return Ok(items);
        }

        let items = self.store.list_items(None).await?;
        let filtered = match sector {
            None => items.clone(),
            Some(sector) => items
                .iter()
                .filter(|item| item.sector == sector)
                .cloned()
                .collect(),
        };
        self.cache.write().await.set_items(items);
        Ok(filtered)
    }

    pub async fn create_item(&self, new_item: NewItem) -> Result<InventoryItem, AppError> {
        // Saldo inicial negativo nunca entra; o invariante vale desde a criação.
        if new_item.quantity < 0.0 {
            return Err(AppError::InvalidQuantity);
        }
        if new_item.min_quantity.is_some_and(|min| min < 0.0) {
            return Err(AppError::InvalidQuantity);
        }

        let created = self.store.create_item(new_item).await?;

        let mut cache = self.cache.write().await;
        cache.upsert_item(created.clone());
        cache.invalidate_derived();
        Ok(created)
    }

    /// Edição da ficha do item. Se o saldo mudar por aqui (ajuste manual do
    /// admin, fora do fluxo de entrada/saída), fica um registro `edicao` no
    /// histórico com a diferença absoluta.
    pub async fn update_item(
        &self,
        id: Uuid,
        patch: ItemPatch,
        actor: Uuid,
    ) -> Result<InventoryItem, AppError> {
        if patch.quantity.is_some_and(|q| q < 0.0) {
            return Err(AppError::InvalidQuantity);
        }
        if patch.min_quantity.is_some_and(|min| min < 0.0) {
            return Err(AppError::InvalidQuantity);
        }

        let before = self.store.get_item(id).await?;
        let updated = self.store.update_item(id, patch).await?;

        let old_quantity = normalize_f64(before.quantity, 0.0);
        let new_quantity = normalize_f64(updated.quantity, 0.0);
        let difference = (new_quantity - old_quantity).abs();
        if difference > 0.0 {
            let audit = self
                .store
                .insert_movement(NewMovement {
                    item_id: updated.id,
                    user_id: actor,
                    movement_type: MovementType::Edicao,
                    item_name: updated.name.clone(),
                    item_unit: updated.unit,
                    item_price: updated.price,
                    quantity: difference,
                    notes: Some(format!(
                        "Ajuste manual de saldo: de {old_quantity} para {new_quantity}"
                    )),
                })
                .await;
            if let Err(e) = audit {
                tracing::warn!(
                    item_id = %updated.id,
                    "item editado, mas o registro de auditoria falhou: {e}"
                );
                return Err(e);
            }
        }

        let mut cache = self.cache.write().await;
        cache.upsert_item(updated.clone());
        cache.invalidate_derived();
        Ok(updated)
    }

    pub async fn delete_item(&self, id: Uuid) -> Result<(), AppError> {
        self.store.delete_item(id).await?;

        let mut cache = self.cache.write().await;
        cache.remove_item(id);
        cache.invalidate_derived();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::{MockStockStore, testing::MemStore};
    use crate::models::inventory::MeasureUnit;
    use rust_decimal::Decimal;

    fn service(store: Arc<dyn StockStore>) -> InventoryService {
        InventoryService::new(store, Arc::new(RwLock::new(ReadCache::default())))
    }

    fn new_item(name: &str, quantity: f64) -> NewItem {
        NewItem {
            name: name.to_string(),
            description: None,
            sector: Sector::Cozinha,
            unit: MeasureUnit::Kg,
            quantity,
            min_quantity: None,
            price: Decimal::new(3500, 2),
            category: None,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn negative_initial_quantity_is_rejected_before_any_write() {
        let mut store = MockStockStore::new();
        store.expect_create_item().times(0);

        let result = service(Arc::new(store))
            .create_item(new_item("Picanha", -1.0))
            .await;
        assert!(matches!(result, Err(AppError::InvalidQuantity)));
    }

    #[tokio::test]
    async fn second_listing_is_served_from_the_cache() {
        let mut store = MockStockStore::new();
        store
            .expect_list_items()
            .times(1)
            .returning(|_| Ok(vec![]));

        let service = service(Arc::new(store));
        service.list_items(None).await.unwrap();
        // Não pode bater no backend de novo; a expectativa acima é times(1).
        service.list_items(Some(Sector::Bar)).await.unwrap();
    }

    #[tokio::test]
    async fn quantity_edit_leaves_an_audit_trail() {
        let store = Arc::new(MemStore::default());
        let created = store.create_item(new_item("Picanha", 10.0)).await.unwrap();
        let service = service(store.clone());

        let patch = ItemPatch {
            quantity: Some(7.5),
            ..Default::default()
        };
        let updated = service
            .update_item(created.id, patch, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(updated.quantity, 7.5);

        let movements = store.movements();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].movement_type, MovementType::Edicao);
        // Magnitude absoluta, mesmo com o saldo diminuindo.
        assert_eq!(movements[0].quantity, 2.5);
    }

    #[tokio::test]
    async fn renaming_an_item_records_no_audit_movement() {
        let store = Arc::new(MemStore::default());
        let created = store.create_item(new_item("Picanha", 10.0)).await.unwrap();
        let service = service(store.clone());

        let patch = ItemPatch {
            name: Some("Picanha premium".to_string()),
            ..Default::default()
        };
        service
            .update_item(created.id, patch, Uuid::new_v4())
            .await
            .unwrap();

        assert!(store.movements().is_empty());
    }

    #[tokio::test]
    async fn deleting_an_item_also_removes_it_from_the_cache() {
        let store = Arc::new(MemStore::default());
        let created = store.create_item(new_item("Picanha", 10.0)).await.unwrap();
        let service = service(store.clone());

        // Carrega o cache e depois exclui.
        assert_eq!(service.list_items(None).await.unwrap().len(), 1);
        service.delete_item(created.id).await.unwrap();
        assert!(service.list_items(None).await.unwrap().is_empty());
    }
}
