//! Route table

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use cms_shared::constants::CSRF_HEADER;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::handlers::{csrf, health, items, menus, settings};
use crate::middleware::require_admin;
use crate::state::AppState;

pub fn build_router(state: AppState, allowed_origin: Option<&str>) -> Router {
    let admin = Router::new()
        .route("/menus", get(menus::list_menus).post(menus::create_menu))
        .route("/menus/import", post(menus::import_menu))
        .route(
            "/menus/{id}",
            get(menus::get_menu)
                .put(menus::update_menu)
                .delete(menus::delete_menu),
        )
        .route("/menus/{id}/items", post(items::add_item))
        .route(
            "/menus/{id}/items/{item_id}",
            put(items::update_item).delete(items::delete_item),
        )
        .route("/menus/{id}/reorder", post(items::reorder_items))
        .route("/menus/{id}/duplicate", post(menus::duplicate_menu))
        .route("/menus/{id}/export", get(menus::export_menu))
        .route("/settings", get(settings::list_settings))
        .route(
            "/settings/{key}",
            put(settings::put_setting).delete(settings::delete_setting),
        )
        .route("/csrf-token", get(csrf::issue_token))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1/admin", admin)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origin))
}

fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(CSRF_HEADER),
        ]);

    match allowed_origin.map(str::parse::<HeaderValue>) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(e)) => {
            warn!("Ignoring invalid allowed_origin: {}", e);
            layer
        }
        None => layer,
    }
}
