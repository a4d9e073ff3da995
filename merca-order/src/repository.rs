use crate::models::Order;
use async_trait::async_trait;
use merca_core::CoreResult;
use uuid::Uuid;

/// Repository trait for order persistence.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: &Order) -> CoreResult<Uuid>;

    async fn get(&self, id: Uuid) -> CoreResult<Option<Order>>;

    async fn list_by_company(&self, company_id: Uuid) -> CoreResult<Vec<Order>>;
}
