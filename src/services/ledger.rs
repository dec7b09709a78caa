// src/services/ledger.rs
//
// O livro de movimentações: aplica e estorna mudanças de saldo. A conta é
// escrita uma única vez, aqui, contra o trait StockStore; os dois backends
// (Postgres e API legada) só transportam dados.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::{
        AppError,
        numeric::{normalize, normalize_f64},
    },
    db::StockStore,
    models::inventory::{
        AppliedMovement, InventoryItem, MovementType, NewMovement, StockMovement,
    },
    services::cache::ReadCache,
};

/// Resultado da aritmética de aplicação, antes de qualquer escrita.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementPlan {
    /// Magnitude normalizada e estritamente positiva da movimentação.
    pub magnitude: f64,
    /// Saldo do item depois de aplicar o delta.
    pub new_quantity: f64,
}

/// Calcula o efeito de uma movimentação sobre o saldo atual.
///
/// A quantidade bruta pode chegar como número, string com vírgula decimal
/// ou nulo; tudo passa pelo normalizador antes da conta. Nada é escrito em
/// caso de erro.
pub fn plan_apply(
    current_quantity: f64,
    movement_type: MovementType,
    raw_quantity: &Value,
) -> Result<MovementPlan, AppError> {
    let magnitude = normalize(raw_quantity, 0.0);
    if magnitude <= 0.0 {
        return Err(AppError::InvalidQuantity);
    }

    let current = normalize_f64(current_quantity, 0.0);
    let delta = movement_type
        .apply_delta(magnitude)
        .ok_or(AppError::InvalidMovementType)?;
    let new_quantity = current + delta;

    // A fronteira é >= 0: saída igual ao saldo zera o estoque e é válida.
    // Entradas nunca falham por saldo.
    if new_quantity < 0.0 {
        return Err(AppError::InsufficientStock);
    }

    Ok(MovementPlan {
        magnitude,
        new_quantity,
    })
}

/// Calcula o saldo resultante de desfazer uma movimentação já registrada.
///
/// O delta é o inverso do original: estornar uma entrada subtrai, estornar
/// uma saída devolve. Pode falhar de verdade: se outras movimentações
/// consumiram o estoque depois da original, o estorno deixaria o saldo
/// negativo e é rejeitado.
pub fn plan_cancel(current_quantity: f64, movement: &StockMovement) -> Result<f64, AppError> {
    let current = normalize_f64(current_quantity, 0.0);
    let magnitude = normalize_f64(movement.quantity, 0.0);
    let delta = movement
        .movement_type
        .reversal_delta(magnitude)
        .ok_or(AppError::InvalidMovementType)?;

    let new_quantity = current + delta;
    if new_quantity < 0.0 {
        return Err(AppError::WouldGoNegative);
    }
    Ok(new_quantity)
}

#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn StockStore>,
    cache: Arc<RwLock<ReadCache>>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn StockStore>, cache: Arc<RwLock<ReadCache>>) -> Self {
        Self { store, cache }
    }

    /// Aplica uma movimentação: grava o novo saldo e registra a auditoria.
    ///
    /// São duas escritas separadas, sem transação entre elas; é o mesmo
    /// comportamento do sistema de referência. Uma falha entre a primeira
    /// e a segunda deixa saldo sem auditoria correspondente, e fica
    /// registrada em log.
    pub async fn apply_movement(
        &self,
        item_id: Uuid,
        movement_type: MovementType,
        raw_quantity: &Value,
        user_id: Uuid,
        notes: Option<String>,
    ) -> Result<AppliedMovement, AppError> {
        let item = self.store.get_item(item_id).await?;
        let plan = plan_apply(item.quantity, movement_type, raw_quantity)?;

        let updated = self
            .store
            .update_item_quantity(item.id, plan.new_quantity)
            .await?;

        let movement = match self
            .store
            .insert_movement(NewMovement {
                item_id: item.id,
                user_id,
                movement_type,
                item_name: updated.name.clone(),
                item_unit: updated.unit,
                item_price: updated.price,
                quantity: plan.magnitude,
                notes,
            })
            .await
        {
            Ok(movement) => movement,
            Err(e) => {
                tracing::warn!(
                    item_id = %item.id,
                    "saldo atualizado, mas o registro da movimentação falhou: {e}"
                );
                return Err(e);
            }
        };

        tracing::info!(
            item = %updated.name,
            tipo = ?movement_type,
            quantidade = plan.magnitude,
            saldo = plan.new_quantity,
            "movimentação registrada"
        );

        let mut cache = self.cache.write().await;
        cache.upsert_item(updated.clone());
        cache.invalidate_derived();

        Ok(AppliedMovement {
            item: updated,
            movement,
        })
    }

    /// Estorna uma movimentação: reverte o saldo e apaga o registro.
    ///
    /// A mesma lacuna de atomicidade da aplicação existe aqui, na ordem
    /// inversa: se a exclusão falhar depois do saldo revertido, o sistema
    /// fica inconsistente e o log registra.
    pub async fn cancel_movement(&self, movement_id: Uuid) -> Result<InventoryItem, AppError> {
        let movement = self.store.get_movement(movement_id).await?;
        let item = self.store.get_item(movement.item_id).await?;

        let new_quantity = plan_cancel(item.quantity, &movement)?;

        let updated = self
            .store
            .update_item_quantity(item.id, new_quantity)
            .await?;

        if let Err(e) = self.store.delete_movement(movement.id).await {
            tracing::warn!(
                movement_id = %movement.id,
                "saldo revertido, mas a exclusão da movimentação falhou: {e}"
            );
            return Err(e);
        }

        tracing::info!(
            item = %updated.name,
            movimentacao = %movement.id,
            saldo = new_quantity,
            "movimentação estornada"
        );

        let mut cache = self.cache.write().await;
        cache.upsert_item(updated.clone());
        cache.invalidate_derived();

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::{MockStockStore, testing::MemStore};
    use crate::models::inventory::{MeasureUnit, Sector};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn item(quantity: f64) -> InventoryItem {
        InventoryItem {
            id: Uuid::new_v4(),
            name: "Chopp artesanal".to_string(),
            description: None,
            sector: Sector::Bar,
            unit: MeasureUnit::Litro,
            quantity,
            min_quantity: None,
            price: Decimal::new(1890, 2),
            category: None,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    fn movement(item_id: Uuid, movement_type: MovementType, quantity: f64) -> StockMovement {
        StockMovement {
            id: Uuid::new_v4(),
            item_id,
            user_id: Uuid::new_v4(),
            movement_type,
            item_name: "Chopp artesanal".to_string(),
            item_unit: MeasureUnit::Litro,
            item_price: Decimal::new(1890, 2),
            quantity,
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn ledger(store: Arc<dyn StockStore>) -> LedgerService {
        LedgerService::new(store, Arc::new(RwLock::new(ReadCache::default())))
    }

    // ---
    // Aritmética pura
    // ---

    #[test]
    fn entry_adds_to_current_quantity() {
        let plan = plan_apply(10.0, MovementType::Entrada, &json!(5)).unwrap();
        assert_eq!(plan.magnitude, 5.0);
        assert_eq!(plan.new_quantity, 15.0);
    }

    #[test]
    fn exit_larger_than_stock_is_rejected() {
        let err = plan_apply(10.0, MovementType::Saida, &json!(15)).unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock));
    }

    #[test]
    fn exit_equal_to_stock_reaches_exactly_zero() {
        let plan = plan_apply(10.0, MovementType::Saida, &json!(10)).unwrap();
        assert_eq!(plan.new_quantity, 0.0);
    }

    #[test]
    fn quantity_strings_with_comma_are_accepted() {
        let plan = plan_apply(10.0, MovementType::Entrada, &json!("2,5")).unwrap();
        assert_eq!(plan.magnitude, 2.5);
        assert_eq!(plan.new_quantity, 12.5);
    }

    #[test]
    fn zero_negative_and_garbage_quantities_are_invalid() {
        for raw in [json!(0), json!(-5), json!("abc"), Value::Null] {
            let err = plan_apply(10.0, MovementType::Entrada, &raw).unwrap_err();
            assert!(matches!(err, AppError::InvalidQuantity), "entrada: {raw}");
        }
    }

    #[test]
    fn edit_entries_never_reach_the_arithmetic() {
        let err = plan_apply(10.0, MovementType::Edicao, &json!(5)).unwrap_err();
        assert!(matches!(err, AppError::InvalidMovementType));

        let edit = movement(Uuid::new_v4(), MovementType::Edicao, 5.0);
        let err = plan_cancel(10.0, &edit).unwrap_err();
        assert!(matches!(err, AppError::InvalidMovementType));
    }

    #[test]
    fn cancelling_an_exit_gives_the_stock_back() {
        let exit = movement(Uuid::new_v4(), MovementType::Saida, 10.0);
        assert_eq!(plan_cancel(0.0, &exit).unwrap(), 10.0);
    }

    #[test]
    fn cancelling_an_entry_that_was_already_consumed_is_rejected() {
        // Entrada de 10 registrada, mas o saldo atual é só 4: outras saídas
        // aconteceram depois. Estornar agora deixaria o saldo em -6.
        let entry = movement(Uuid::new_v4(), MovementType::Entrada, 10.0);
        let err = plan_cancel(4.0, &entry).unwrap_err();
        assert!(matches!(err, AppError::WouldGoNegative));
    }

    // ---
    // Orquestração (expectativas chamada a chamada)
    // ---

    #[tokio::test]
    async fn failed_apply_performs_no_writes() {
        let stock = item(10.0);
        let mut store = MockStockStore::new();
        let returned = stock.clone();
        store
            .expect_get_item()
            .times(1)
            .returning(move |_| Ok(returned.clone()));
        store.expect_update_item_quantity().times(0);
        store.expect_insert_movement().times(0);

        let result = ledger(Arc::new(store))
            .apply_movement(
                stock.id,
                MovementType::Saida,
                &json!(15),
                Uuid::new_v4(),
                None,
            )
            .await;

        assert!(matches!(result, Err(AppError::InsufficientStock)));
    }

    #[tokio::test]
    async fn successful_apply_writes_quantity_then_audit_record() {
        let stock = item(10.0);
        let item_id = stock.id;
        let mut store = MockStockStore::new();

        let returned = stock.clone();
        store
            .expect_get_item()
            .times(1)
            .returning(move |_| Ok(returned.clone()));

        let mut updated = stock.clone();
        updated.quantity = 15.0;
        let written = updated.clone();
        store
            .expect_update_item_quantity()
            .withf(move |id, q| *id == item_id && *q == 15.0)
            .times(1)
            .returning(move |_, _| Ok(written.clone()));

        store
            .expect_insert_movement()
            .withf(|new: &NewMovement| {
                new.movement_type == MovementType::Entrada && new.quantity == 5.0
            })
            .times(1)
            .returning(|new| {
                Ok(StockMovement {
                    id: Uuid::new_v4(),
                    item_id: new.item_id,
                    user_id: new.user_id,
                    movement_type: new.movement_type,
                    item_name: new.item_name,
                    item_unit: new.item_unit,
                    item_price: new.item_price,
                    quantity: new.quantity,
                    notes: new.notes,
                    created_at: Utc::now(),
                })
            });

        let applied = ledger(Arc::new(store))
            .apply_movement(item_id, MovementType::Entrada, &json!(5), Uuid::new_v4(), None)
            .await
            .unwrap();

        assert_eq!(applied.item.quantity, 15.0);
        // Magnitude sempre positiva; a direção fica no tipo.
        assert_eq!(applied.movement.quantity, 5.0);
        assert_eq!(applied.movement.movement_type, MovementType::Entrada);
    }

    #[tokio::test]
    async fn rejected_cancel_leaves_everything_in_place() {
        let stock = item(4.0);
        let entry = movement(stock.id, MovementType::Entrada, 10.0);
        let mut store = MockStockStore::new();

        let returned_movement = entry.clone();
        store
            .expect_get_movement()
            .times(1)
            .returning(move |_| Ok(returned_movement.clone()));
        let returned_item = stock.clone();
        store
            .expect_get_item()
            .times(1)
            .returning(move |_| Ok(returned_item.clone()));
        store.expect_update_item_quantity().times(0);
        store.expect_delete_movement().times(0);

        let result = ledger(Arc::new(store)).cancel_movement(entry.id).await;
        assert!(matches!(result, Err(AppError::WouldGoNegative)));
    }

    // ---
    // Fluxos sequenciais contra o backend em memória
    // ---

    #[tokio::test]
    async fn apply_then_cancel_restores_the_original_quantity() {
        let stock = item(10.0);
        let item_id = stock.id;
        let store = Arc::new(MemStore::with_items(vec![stock]));
        let ledger = ledger(store.clone());

        let applied = ledger
            .apply_movement(item_id, MovementType::Saida, &json!(10), Uuid::new_v4(), None)
            .await
            .unwrap();
        assert_eq!(store.item_quantity(item_id), 0.0);

        // Estorno da saída devolve as 10 unidades e apaga o registro.
        let restored = ledger.cancel_movement(applied.movement.id).await.unwrap();
        assert_eq!(restored.quantity, 10.0);
        assert_eq!(store.item_quantity(item_id), 10.0);
        assert!(store.movements().is_empty());
    }

    #[tokio::test]
    async fn racing_exits_resolve_by_last_write_wins() {
        // Duas saídas "concorrentes" sobre um saldo de 3, simuladas em
        // sequência: quem aplica por último enxerga o saldo já confirmado
        // pela primeira. Comportamento aceito, não defeito.
        let stock = item(3.0);
        let item_id = stock.id;
        let store = Arc::new(MemStore::with_items(vec![stock]));
        let ledger = ledger(store.clone());
        let user = Uuid::new_v4();

        let first = ledger
            .apply_movement(item_id, MovementType::Saida, &json!(2), user, None)
            .await;
        assert!(first.is_ok());
        assert_eq!(store.item_quantity(item_id), 1.0);

        let second = ledger
            .apply_movement(item_id, MovementType::Saida, &json!(5), user, None)
            .await;
        assert!(matches!(second, Err(AppError::InsufficientStock)));
        assert_eq!(store.item_quantity(item_id), 1.0);
        assert_eq!(store.movements().len(), 1);
    }

    #[tokio::test]
    async fn every_persisted_movement_keeps_a_positive_magnitude() {
        let stock = item(50.0);
        let item_id = stock.id;
        let store = Arc::new(MemStore::with_items(vec![stock]));
        let ledger = ledger(store.clone());
        let user = Uuid::new_v4();

        for (movement_type, raw) in [
            (MovementType::Entrada, json!(5)),
            (MovementType::Saida, json!("2,5")),
            (MovementType::Saida, json!(1)),
            (MovementType::Entrada, json!("0,5")),
        ] {
            ledger
                .apply_movement(item_id, movement_type, &raw, user, None)
                .await
                .unwrap();
        }

        for movement in store.movements() {
            assert!(movement.quantity > 0.0);
        }
        assert_eq!(store.item_quantity(item_id), 52.0);
    }

    #[tokio::test]
    async fn cache_is_patched_and_derived_views_are_invalidated() {
        let stock = item(10.0);
        let item_id = stock.id;
        let cache = Arc::new(RwLock::new(ReadCache::default()));
        cache.write().await.set_items(vec![stock.clone()]);
        cache.write().await.set_ranking(vec![]);

        let store = Arc::new(MemStore::with_items(vec![stock]));
        let ledger = LedgerService::new(store, cache.clone());

        ledger
            .apply_movement(item_id, MovementType::Entrada, &json!(5), Uuid::new_v4(), None)
            .await
            .unwrap();

        let cache = cache.read().await;
        let cached = cache.items(None).unwrap();
        assert_eq!(cached[0].quantity, 15.0);
        assert!(cache.ranking().is_none());
    }
}
