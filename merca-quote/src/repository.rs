use crate::models::{Quote, QuoteStatus};
use async_trait::async_trait;
use merca_core::CoreResult;
use uuid::Uuid;

/// Repository trait for quote persistence. Implementations are injected
/// into the service; the in-memory one lives in the store crate.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Insert or replace; last write wins.
    async fn save(&self, quote: &Quote) -> CoreResult<()>;

    async fn get(&self, id: Uuid) -> CoreResult<Option<Quote>>;

    async fn list(&self) -> CoreResult<Vec<Quote>>;

    async fn list_by_company(&self, company_id: Uuid) -> CoreResult<Vec<Quote>>;

    async fn list_by_status(&self, statuses: &[QuoteStatus]) -> CoreResult<Vec<Quote>>;
}
