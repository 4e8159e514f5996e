use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // A025 METAFIELD DEFINITIONS
        // ========================================
        .route(
            "/api/metafield_definition",
            get(handlers::a025_metafield_definition::list_all)
                .post(handlers::a025_metafield_definition::create),
        )
        .route(
            "/api/metafield_definition/:id",
            get(handlers::a025_metafield_definition::get_by_id)
                .patch(handlers::a025_metafield_definition::update)
                .delete(handlers::a025_metafield_definition::delete),
        )
        // ========================================
        // A026 METAFIELD VALUES
        // ========================================
        .route(
            "/api/metafield_value/validate/:definition_id",
            post(handlers::a026_metafield_value::validate),
        )
        .route(
            "/api/metafield_value/:owner_type/:owner_id",
            get(handlers::a026_metafield_value::list_for_owner),
        )
        .route(
            "/api/metafield_value/:owner_type/:owner_id/:definition_id",
            put(handlers::a026_metafield_value::set_value),
        )
}
