// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, sync::Arc, time::Duration};
use tokio::sync::RwLock;

use crate::{
    db::{
        CategoryRepository, LegacyApiStore, PgStockStore, SettingsRepository, StockStore,
        UserRepository,
    },
    services::{AuthService, DashboardService, InventoryService, LedgerService, ReadCache},
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub stock_store: Arc<dyn StockStore>,
    pub auth_service: AuthService,
    pub ledger_service: LedgerService,
    pub inventory_service: InventoryService,
    pub dashboard_service: DashboardService,
    pub user_repo: UserRepository,
    pub category_repo: CategoryRepository,
    pub settings_repo: SettingsRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // O backend de estoque é escolhido por variável de ambiente. Usuários,
        // categorias e configurações moram sempre no Postgres local; só o par
        // itens/movimentações troca de backend.
        let stock_store: Arc<dyn StockStore> = match env::var("STORAGE_BACKEND").as_deref() {
            Ok("legado") => {
                let base_url = env::var("LEGACY_API_URL")
                    .expect("LEGACY_API_URL deve ser definida quando STORAGE_BACKEND=legado");
                tracing::info!("📦 Estoque apontando para a API legada em {}", base_url);
                Arc::new(LegacyApiStore::new(
                    base_url,
                    env::var("LEGACY_API_TOKEN").ok(),
                )?)
            }
            _ => Arc::new(PgStockStore::new(db_pool.clone())),
        };

        // --- Monta o gráfico de dependências ---
        let cache = Arc::new(RwLock::new(ReadCache::default()));
        let user_repo = UserRepository::new(db_pool.clone());
        let category_repo = CategoryRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());
        let auth_service = AuthService::new(user_repo.clone(), jwt_secret.clone());
        let ledger_service = LedgerService::new(stock_store.clone(), cache.clone());
        let inventory_service = InventoryService::new(stock_store.clone(), cache.clone());
        let dashboard_service = DashboardService::new(stock_store.clone(), cache.clone());

        Ok(Self {
            db_pool,
            jwt_secret,
            stock_store,
            auth_service,
            ledger_service,
            inventory_service,
            dashboard_service,
            user_repo,
            category_repo,
            settings_repo,
        })
    }
}
