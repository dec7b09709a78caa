// src/services/dashboard.rs

use chrono::{Days, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    common::{AppError, numeric::normalize_f64},
    db::StockStore,
    models::{
        dashboard::{DailySummary, RankingEntry, WeeklyEntry},
        inventory::{InventoryItem, MovementFilter, MovementType, StockMovement, Sector},
    },
    services::cache::ReadCache,
};

// Agregados dos painéis, calculados em cima do trait de armazenamento para
// funcionar igual contra o Postgres e contra a API legada. Os resultados
// sem filtro ficam memoizados no ReadCache e caem junto com qualquer
// escrita (invalidate_derived).
#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn StockStore>,
    cache: Arc<RwLock<ReadCache>>,
}

/// Totais do dia. Registros `edicao` são auditoria de ficha, não fluxo de
/// estoque, e ficam de fora das somas.
pub fn summarize_day(date: NaiveDate, movements: &[StockMovement]) -> DailySummary {
    let mut summary = DailySummary {
        date,
        entries_count: 0,
        entries_total: 0.0,
        exits_count: 0,
        exits_total: 0.0,
    };
    for movement in movements {
        match movement.movement_type {
            MovementType::Entrada => {
                summary.entries_count += 1;
                summary.entries_total += movement.quantity;
            }
            MovementType::Saida => {
                summary.exits_count += 1;
                summary.exits_total += movement.quantity;
            }
            MovementType::Edicao => {}
        }
    }
    summary
}

/// Fronteira do alerta: em cima do limiar já conta como baixo (<=), para o
/// item aparecer no painel antes da próxima saída zerar a folga.
pub fn is_low_stock(item: &InventoryItem) -> bool {
    match item.min_quantity {
        Some(min) => normalize_f64(item.quantity, 0.0) <= min,
        None => false,
    }
}

impl DashboardService {
    pub fn new(store: Arc<dyn StockStore>, cache: Arc<RwLock<ReadCache>>) -> Self {
        Self { store, cache }
    }

    pub async fn daily_summary(
        &self,
        sector: Option<Sector>,
    ) -> Result<DailySummary, AppError> {
        let today = Utc::now().date_naive();

        // Só a vista sem filtro é memoizada; o snapshot de ontem não vale.
        if sector.is_none() {
            if let Some(snapshot) = self.cache.read().await.daily_summary() {
                if snapshot.date == today {
                    return Ok(snapshot.clone());
                }
            }
        }

        let movements = self
            .store
            .list_movements(MovementFilter {
                date: Some(today),
                sector,
                user_id: None,
            })
            .await?;
        let summary = summarize_day(today, &movements);

        if sector.is_none() {
            self.cache.write().await.set_daily_summary(summary.clone());
        }
        Ok(summary)
    }

    pub async fn weekly_totals(&self) -> Result<Vec<WeeklyEntry>, AppError> {
        if let Some(snapshot) = self.cache.read().await.weekly_totals() {
            return Ok(snapshot.clone());
        }

        let today = Utc::now().date_naive();
        let mut totals = Vec::with_capacity(7);
        for offset in (0..7u64).rev() {
            let date = today - Days::new(offset);
            let movements = self
                .store
                .list_movements(MovementFilter {
                    date: Some(date),
                    sector: None,
                    user_id: None,
                })
                .await?;
            let day = summarize_day(date, &movements);
            totals.push(WeeklyEntry {
                date,
                entries_total: day.entries_total,
                exits_total: day.exits_total,
            });
        }

        self.cache.write().await.set_weekly_totals(totals.clone());
        Ok(totals)
    }

    /// Ranking de quem mais registrou movimentações. Os nomes são
    /// resolvidos na borda HTTP; aqui só saem IDs e contagens.
    pub async fn employee_ranking(&self) -> Result<Vec<RankingEntry>, AppError> {
        if let Some(snapshot) = self.cache.read().await.ranking() {
            return Ok(snapshot.clone());
        }

        let movements = self.store.list_movements(MovementFilter::default()).await?;
        let mut counts: HashMap<uuid::Uuid, i64> = HashMap::new();
        for movement in &movements {
            *counts.entry(movement.user_id).or_insert(0) += 1;
        }

        let mut ranking: Vec<RankingEntry> = counts
            .into_iter()
            .map(|(user_id, movements_count)| RankingEntry {
                user_id,
                user_name: None,
                movements_count,
            })
            .collect();
        // Desempate por id para a ordem ser estável entre leituras.
        ranking.sort_by(|a, b| {
            b.movements_count
                .cmp(&a.movements_count)
                .then(a.user_id.cmp(&b.user_id))
        });

        self.cache.write().await.set_ranking(ranking.clone());
        Ok(ranking)
    }

    pub async fn low_stock_alerts(&self) -> Result<Vec<InventoryItem>, AppError> {
        if let Some(snapshot) = self.cache.read().await.low_stock() {
            return Ok(snapshot.clone());
        }

        let items = self.store.list_items(None).await?;
        let alerts: Vec<InventoryItem> =
            items.into_iter().filter(is_low_stock).collect();

        self.cache.write().await.set_low_stock(alerts.clone());
        Ok(alerts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::testing::MemStore;
    use crate::models::inventory::{MeasureUnit, NewItem, NewMovement};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn service(store: Arc<dyn StockStore>) -> DashboardService {
        DashboardService::new(store, Arc::new(RwLock::new(ReadCache::default())))
    }

    fn sample_movement(movement_type: MovementType, quantity: f64) -> StockMovement {
        StockMovement {
            id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            movement_type,
            item_name: "Chopp".to_string(),
            item_unit: MeasureUnit::Litro,
            item_price: Decimal::ZERO,
            quantity,
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn item_with_threshold(quantity: f64, min_quantity: Option<f64>) -> InventoryItem {
        InventoryItem {
            id: Uuid::new_v4(),
            name: "Chopp".to_string(),
            description: None,
            sector: Sector::Bar,
            unit: MeasureUnit::Litro,
            quantity,
            min_quantity,
            price: Decimal::ZERO,
            category: None,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn day_summary_separates_directions_and_skips_edits() {
        let today = Utc::now().date_naive();
        let movements = vec![
            sample_movement(MovementType::Entrada, 5.0),
            sample_movement(MovementType::Entrada, 2.5),
            sample_movement(MovementType::Saida, 3.0),
            sample_movement(MovementType::Edicao, 99.0),
        ];

        let summary = summarize_day(today, &movements);
        assert_eq!(summary.entries_count, 2);
        assert_eq!(summary.entries_total, 7.5);
        assert_eq!(summary.exits_count, 1);
        assert_eq!(summary.exits_total, 3.0);
    }

    #[test]
    fn low_stock_boundary_is_inclusive() {
        assert!(is_low_stock(&item_with_threshold(2.0, Some(3.0))));
        assert!(is_low_stock(&item_with_threshold(3.0, Some(3.0))));
        assert!(!is_low_stock(&item_with_threshold(3.1, Some(3.0))));
        // Sem limiar configurado não há alerta, nem com saldo zerado.
        assert!(!is_low_stock(&item_with_threshold(0.0, None)));
    }

    #[tokio::test]
    async fn ranking_orders_by_movement_count() {
        let store = Arc::new(MemStore::default());
        let busy = Uuid::new_v4();
        let quiet = Uuid::new_v4();
        for user_id in [busy, quiet, busy] {
            store
                .insert_movement(NewMovement {
                    item_id: Uuid::new_v4(),
                    user_id,
                    movement_type: MovementType::Entrada,
                    item_name: "Chopp".to_string(),
                    item_unit: MeasureUnit::Litro,
                    item_price: Decimal::ZERO,
                    quantity: 1.0,
                    notes: None,
                })
                .await
                .unwrap();
        }

        let ranking = service(store).employee_ranking().await.unwrap();
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].user_id, busy);
        assert_eq!(ranking[0].movements_count, 2);
        assert_eq!(ranking[1].movements_count, 1);
    }

    #[tokio::test]
    async fn alerts_only_list_items_at_or_below_the_threshold() {
        let store = Arc::new(MemStore::default());
        for (name, quantity, min_quantity) in [
            ("Chopp", 2.0, Some(5.0)),
            ("Gin", 10.0, Some(5.0)),
            ("Guardanapo", 0.0, None),
        ] {
            store
                .create_item(NewItem {
                    name: name.to_string(),
                    description: None,
                    sector: Sector::Bar,
                    unit: MeasureUnit::Unidade,
                    quantity,
                    min_quantity,
                    price: Decimal::ZERO,
                    category: None,
                    image_url: None,
                })
                .await
                .unwrap();
        }

        let alerts = service(store).low_stock_alerts().await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].name, "Chopp");
    }

    #[tokio::test]
    async fn daily_summary_reflects_movements_recorded_today() {
        let store = Arc::new(MemStore::default());
        let item = store
            .create_item(NewItem {
                name: "Chopp".to_string(),
                description: None,
                sector: Sector::Bar,
                unit: MeasureUnit::Litro,
                quantity: 50.0,
                min_quantity: None,
                price: Decimal::ZERO,
                category: None,
                image_url: None,
            })
            .await
            .unwrap();
        for (movement_type, quantity) in
            [(MovementType::Entrada, 5.0), (MovementType::Saida, 2.0)]
        {
            store
                .insert_movement(NewMovement {
                    item_id: item.id,
                    user_id: Uuid::new_v4(),
                    movement_type,
                    item_name: item.name.clone(),
                    item_unit: item.unit,
                    item_price: item.price,
                    quantity,
                    notes: None,
                })
                .await
                .unwrap();
        }

        let summary = service(store).daily_summary(None).await.unwrap();
        assert_eq!(summary.entries_total, 5.0);
        assert_eq!(summary.exits_total, 2.0);
    }
}
