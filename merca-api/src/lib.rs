use axum::{
    http::Method,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod middleware;
pub mod overrides;
pub mod pricing;
pub mod quotes;
pub mod state;
pub mod worker;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let api = Router::new()
        .route("/v1/pricing/calculate", post(pricing::calculate_price))
        .route(
            "/v1/quotes",
            get(quotes::list_quotes).post(quotes::create_quote),
        )
        .route(
            "/v1/quotes/{id}",
            get(quotes::get_quote).patch(quotes::update_quote),
        )
        .route("/v1/quotes/{id}/convert", post(quotes::convert_quote))
        .route(
            "/v1/overrides/{namespace}/{key}",
            put(overrides::set_override).delete(overrides::delete_override),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::session_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
