use std::net::SocketAddr;
use std::sync::Arc;

use merca_api::{app, state::AuthConfig, worker, AppState};
use merca_pricing::{PricingConfig, PricingEngine};
use merca_quote::{QuoteService, TransitionPolicy};
use merca_store::{
    seed, MemoryOrderRepository, MemoryOverrideStore, MemoryQuoteRepository, PriceBook,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "merca_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = merca_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Merca API on port {}", config.server.port);

    let price_book = Arc::new(PriceBook::new());
    let seed_data = seed::seed_price_book(&price_book).await;
    tracing::info!(
        demo_company = %seed_data.retailer_company_id,
        "demo dataset ready"
    );

    let quote_repo = Arc::new(MemoryQuoteRepository::new());
    let order_repo = Arc::new(MemoryOrderRepository::new());
    let policy = TransitionPolicy {
        allow_accept_from_draft: config.business_rules.allow_accept_from_draft,
        require_view_before_accept: config.business_rules.require_view_before_accept,
    };

    let state = AppState {
        quotes: Arc::new(QuoteService::new(quote_repo, order_repo, policy)),
        engine: Arc::new(PricingEngine::new(PricingConfig {
            stacking_policy: config.business_rules.discount_stacking,
        })),
        price_book,
        overrides: Arc::new(MemoryOverrideStore::new()),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
        rules: config.business_rules.clone(),
    };

    tokio::spawn(worker::start_expiry_worker(state.clone()));

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
