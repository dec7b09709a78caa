// src/services/cache.rs

use uuid::Uuid;

use crate::models::{
    dashboard::{DailySummary, RankingEntry, WeeklyEntry},
    inventory::{InventoryItem, Sector},
};

// Modelo de leitura local, mantido eventualmente consistente com o backend.
//
// Depois de cada escrita bem sucedida, o chamador aplica o registro exato
// devolvido pelo backend (upsert/remoção otimista) e derruba todas as vistas
// derivadas. Snapshot `None` significa "recalcule na próxima leitura"; não
// existe patch incremental de agregado, só invalidação.
//
// O cache é um colaborador guardado no AppState, atrás de um RwLock do
// tokio. Dois clientes mexendo no mesmo item continuam em last-write-wins
// no backend; o cache não arbitra conflito nenhum.
#[derive(Default)]
pub struct ReadCache {
    items: Option<Vec<InventoryItem>>,
    daily_summary: Option<DailySummary>,
    weekly_totals: Option<Vec<WeeklyEntry>>,
    ranking: Option<Vec<RankingEntry>>,
    low_stock: Option<Vec<InventoryItem>>,
}

impl ReadCache {
    // ---
    // Lista de itens
    // ---

    /// Lista cacheada, filtrada por setor quando pedido. `None` = ainda não
    /// carregada (ou invalidada); o chamador busca no backend e repovoa.
    pub fn items(&self, sector: Option<Sector>) -> Option<Vec<InventoryItem>> {
        let items = self.items.as_ref()?;
        Some(match sector {
            None => items.clone(),
            Some(sector) => items
                .iter()
                .filter(|item| item.sector == sector)
                .cloned()
                .collect(),
        })
    }

    pub fn set_items(&mut self, items: Vec<InventoryItem>) {
        self.items = Some(items);
    }

    /// Patch otimista: substitui (ou acrescenta) o registro devolvido pela
    /// escrita. Se a lista nunca foi carregada não há o que remendar.
    pub fn upsert_item(&mut self, item: InventoryItem) {
        if let Some(items) = self.items.as_mut() {
            match items.iter_mut().find(|cached| cached.id == item.id) {
                Some(slot) => *slot = item,
                None => items.push(item),
            }
            // A listagem do backend vem ordenada por nome; mantém igual.
            items.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }

    pub fn remove_item(&mut self, id: Uuid) {
        if let Some(items) = self.items.as_mut() {
            items.retain(|item| item.id != id);
        }
    }

    // ---
    // Vistas derivadas
    // ---

    /// Derruba todos os agregados de uma vez. Mesmo quando o patch otimista
    /// foi completo, a releitura garante consistência com qualquer campo
    /// recalculado do lado do servidor.
    pub fn invalidate_derived(&mut self) {
        self.daily_summary = None;
        self.weekly_totals = None;
        self.ranking = None;
        self.low_stock = None;
    }

    pub fn invalidate_all(&mut self) {
        self.items = None;
        self.invalidate_derived();
    }

    pub fn daily_summary(&self) -> Option<&DailySummary> {
        self.daily_summary.as_ref()
    }

    pub fn set_daily_summary(&mut self, summary: DailySummary) {
        self.daily_summary = Some(summary);
    }

    pub fn weekly_totals(&self) -> Option<&Vec<WeeklyEntry>> {
        self.weekly_totals.as_ref()
    }

    pub fn set_weekly_totals(&mut self, totals: Vec<WeeklyEntry>) {
        self.weekly_totals = Some(totals);
    }

    pub fn ranking(&self) -> Option<&Vec<RankingEntry>> {
        self.ranking.as_ref()
    }

    pub fn set_ranking(&mut self, ranking: Vec<RankingEntry>) {
        self.ranking = Some(ranking);
    }

    pub fn low_stock(&self) -> Option<&Vec<InventoryItem>> {
        self.low_stock.as_ref()
    }

    pub fn set_low_stock(&mut self, items: Vec<InventoryItem>) {
        self.low_stock = Some(items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::MeasureUnit;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn item(name: &str, sector: Sector) -> InventoryItem {
        InventoryItem {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            sector,
            unit: MeasureUnit::Unidade,
            quantity: 10.0,
            min_quantity: None,
            price: Decimal::ZERO,
            category: None,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn upsert_is_a_no_op_before_first_load() {
        let mut cache = ReadCache::default();
        cache.upsert_item(item("Chopp", Sector::Bar));
        // Continua "não carregada": a próxima leitura vai ao backend.
        assert!(cache.items(None).is_none());
    }

    #[test]
    fn upsert_replaces_the_exact_record() {
        let mut cache = ReadCache::default();
        let original = item("Chopp", Sector::Bar);
        cache.set_items(vec![original.clone()]);

        let mut updated = original.clone();
        updated.quantity = 4.0;
        cache.upsert_item(updated);

        let cached = cache.items(None).unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].quantity, 4.0);
    }

    #[test]
    fn upsert_appends_new_records_sorted_by_name() {
        let mut cache = ReadCache::default();
        cache.set_items(vec![item("Picanha", Sector::Cozinha)]);
        cache.upsert_item(item("Alcatra", Sector::Cozinha));

        let names: Vec<String> = cache
            .items(None)
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Alcatra", "Picanha"]);
    }

    #[test]
    fn sector_filter_derives_from_the_full_list() {
        let mut cache = ReadCache::default();
        cache.set_items(vec![
            item("Chopp", Sector::Bar),
            item("Picanha", Sector::Cozinha),
        ]);

        let bar = cache.items(Some(Sector::Bar)).unwrap();
        assert_eq!(bar.len(), 1);
        assert_eq!(bar[0].name, "Chopp");
    }

    #[test]
    fn invalidate_derived_keeps_items_but_drops_snapshots() {
        let mut cache = ReadCache::default();
        cache.set_items(vec![item("Chopp", Sector::Bar)]);
        cache.set_ranking(vec![]);
        cache.set_low_stock(vec![]);

        cache.invalidate_derived();

        assert!(cache.items(None).is_some());
        assert!(cache.ranking().is_none());
        assert!(cache.low_stock().is_none());
        assert!(cache.daily_summary().is_none());
        assert!(cache.weekly_totals().is_none());
    }

    #[test]
    fn remove_item_drops_it_from_the_list() {
        let mut cache = ReadCache::default();
        let victim = item("Chopp", Sector::Bar);
        let id = victim.id;
        cache.set_items(vec![victim, item("Picanha", Sector::Cozinha)]);

        cache.remove_item(id);

        assert_eq!(cache.items(None).unwrap().len(), 1);
    }
}
