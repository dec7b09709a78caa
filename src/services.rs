pub mod auth;
pub use auth::AuthService;
pub mod cache;
pub use cache::ReadCache;
pub mod dashboard;
pub use dashboard::DashboardService;
pub mod inventory;
pub use inventory::InventoryService;
pub mod ledger;
pub use ledger::LedgerService;
