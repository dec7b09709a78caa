pub mod store;
pub use store::StockStore;
pub mod postgres_store;
pub use postgres_store::PgStockStore;
pub mod legacy_api_store;
pub use legacy_api_store::LegacyApiStore;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod category_repo;
pub use category_repo::CategoryRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
