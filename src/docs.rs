// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::update_role,

        // --- Inventory ---
        handlers::inventory::create_item,
        handlers::inventory::list_items,
        handlers::inventory::update_item,
        handlers::inventory::delete_item,
        handlers::inventory::create_category,
        handlers::inventory::list_categories,
        handlers::inventory::delete_category,

        // --- Movements ---
        handlers::movements::apply_movement,
        handlers::movements::list_movements,
        handlers::movements::cancel_movement,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_weekly_totals,
        handlers::dashboard::get_employee_ranking,
        handlers::dashboard::get_low_stock_alerts,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Inventory ---
            models::inventory::Sector,
            models::inventory::MeasureUnit,
            models::inventory::MovementType,
            models::inventory::InventoryItem,
            models::inventory::StockMovement,
            models::inventory::AppliedMovement,
            models::inventory::Category,

            // --- Dashboard ---
            models::dashboard::DailySummary,
            models::dashboard::WeeklyEntry,
            models::dashboard::RankingEntry,

            // --- Settings ---
            models::settings::AppSettings,
            models::settings::UpdateSettingsPayload,

            // --- Payloads ---
            handlers::inventory::CreateItemPayload,
            handlers::inventory::UpdateItemPayload,
            handlers::inventory::CreateCategoryPayload,
            handlers::movements::ApplyMovementPayload,
            handlers::users::UpdateRolePayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Usuários e Papéis"),
        (name = "Inventory", description = "Itens e Categorias do Estoque"),
        (name = "Movements", description = "Livro de Movimentações (entradas, saídas e estornos)"),
        (name = "Dashboard", description = "Indicadores, Agregados e Alertas"),
        (name = "Settings", description = "Identidade Visual do Estabelecimento")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
