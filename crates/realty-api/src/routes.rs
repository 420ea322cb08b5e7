use axum::{
    http::{
        header::{ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE, ETAG, IF_NONE_MATCH},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    auth::require_admin,
    error::{ApiError, ApiResult},
    handlers::{self, admin},
    state::AppState,
};

pub fn create_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route(
            "/listings",
            get(admin::list_listings).post(admin::create_listing),
        )
        .route(
            "/listings/{id}",
            get(admin::get_listing)
                .put(admin::update_listing)
                .delete(admin::delete_listing),
        )
        .route("/agents", get(admin::list_agents).post(admin::create_agent))
        .route(
            "/agents/{id}",
            get(admin::get_agent)
                .put(admin::update_agent)
                .delete(admin::delete_agent),
        )
        .route("/offices", get(admin::list_offices).post(admin::create_office))
        .route(
            "/offices/{id}",
            get(admin::get_office)
                .put(admin::update_office)
                .delete(admin::delete_office),
        )
        .route(
            "/destinations",
            get(admin::list_destinations).post(admin::create_destination),
        )
        .route(
            "/destinations/{id}",
            get(admin::get_destination)
                .put(admin::update_destination)
                .delete(admin::delete_destination),
        )
        .route("/contacts", get(admin::list_contacts))
        .route(
            "/contacts/{id}",
            patch(admin::update_contact).delete(admin::delete_contact),
        )
        .route("/intakes", get(admin::list_intakes))
        .route(
            "/intakes/{id}",
            patch(admin::update_intake).delete(admin::delete_intake),
        )
        .route("/stats", get(admin::stats))
        // Routes added after this layer stay public.
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .route("/login", post(admin::login));

    let api_routes = Router::new()
        .route("/i18n", get(handlers::get_i18n))
        .route("/routes/resolve", get(handlers::resolve_route))
        .route("/home", get(handlers::home))
        .route("/listings", get(handlers::list_listings))
        .route("/listings/{key}", get(handlers::get_listing))
        .route("/destinations", get(handlers::list_destinations))
        .route("/destinations/{slug}", get(handlers::get_destination))
        .route("/agents", get(handlers::list_agents))
        .route("/agents/{slug}", get(handlers::get_agent))
        .route("/offices", get(handlers::list_offices))
        .route("/offices/{slug}", get(handlers::get_office))
        .route("/contact", post(handlers::submit_contact))
        .route("/sell", post(handlers::submit_property))
        .nest("/admin", admin_routes);

    let cors = cors_layer(&state.settings.security.allowed_origins);

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes)
        .fallback(not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

async fn not_found() -> ApiResult<()> {
    Err(ApiError::NotFound("no such endpoint".into()))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT_LANGUAGE, IF_NONE_MATCH])
        .expose_headers([ETAG]);

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}
