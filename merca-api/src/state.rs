use merca_core::overrides::OverrideStore;
use merca_pricing::PricingEngine;
use merca_quote::QuoteService;
use merca_store::app_config::BusinessRules;
use merca_store::PriceBook;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub quotes: Arc<QuoteService>,
    pub engine: Arc<PricingEngine>,
    pub price_book: Arc<PriceBook>,
    pub overrides: Arc<dyn OverrideStore>,
    pub auth: AuthConfig,
    pub rules: BusinessRules,
}
