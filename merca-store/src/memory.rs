use async_trait::async_trait;
use merca_core::CoreResult;
use merca_order::{Order, OrderRepository};
use merca_quote::{Quote, QuoteRepository, QuoteStatus};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory quote store. Single process, last write wins; there is no
/// optimistic versioning on `current_version`.
#[derive(Default)]
pub struct MemoryQuoteRepository {
    quotes: RwLock<HashMap<Uuid, Quote>>,
}

impl MemoryQuoteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuoteRepository for MemoryQuoteRepository {
    async fn save(&self, quote: &Quote) -> CoreResult<()> {
        self.quotes.write().await.insert(quote.id, quote.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> CoreResult<Option<Quote>> {
        Ok(self.quotes.read().await.get(&id).cloned())
    }

    async fn list(&self) -> CoreResult<Vec<Quote>> {
        let mut quotes: Vec<_> = self.quotes.read().await.values().cloned().collect();
        quotes.sort_by_key(|q| q.created_at);
        Ok(quotes)
    }

    async fn list_by_company(&self, company_id: Uuid) -> CoreResult<Vec<Quote>> {
        let mut quotes: Vec<_> = self
            .quotes
            .read()
            .await
            .values()
            .filter(|q| q.company_id == company_id)
            .cloned()
            .collect();
        quotes.sort_by_key(|q| q.created_at);
        Ok(quotes)
    }

    async fn list_by_status(&self, statuses: &[QuoteStatus]) -> CoreResult<Vec<Quote>> {
        Ok(self
            .quotes
            .read()
            .await
            .values()
            .filter(|q| statuses.contains(&q.status))
            .cloned()
            .collect())
    }
}

/// In-memory order store.
#[derive(Default)]
pub struct MemoryOrderRepository {
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl MemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn create(&self, order: &Order) -> CoreResult<Uuid> {
        self.orders.write().await.insert(order.id, order.clone());
        Ok(order.id)
    }

    async fn get(&self, id: Uuid) -> CoreResult<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list_by_company(&self, company_id: Uuid) -> CoreResult<Vec<Order>> {
        let mut orders: Vec<_> = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| o.company_id == company_id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use merca_pricing::OrderType;
    use merca_quote::QuoteItem;

    fn quote(company_id: Uuid) -> Quote {
        Quote::new(
            company_id,
            "rep-1",
            OrderType::Standard,
            vec![QuoteItem {
                product_id: Uuid::new_v4(),
                product_name: "Widget".to_string(),
                quantity: 2,
                msrp: 10.0,
                unit_price: 7.0,
                total: 14.0,
            }],
            "USD".to_string(),
            Utc::now() + Duration::days(30),
        )
    }

    #[tokio::test]
    async fn test_save_get_and_filters() {
        let repo = MemoryQuoteRepository::new();
        let company = Uuid::new_v4();
        let q1 = quote(company);
        let q2 = quote(Uuid::new_v4());
        repo.save(&q1).await.unwrap();
        repo.save(&q2).await.unwrap();

        assert_eq!(repo.get(q1.id).await.unwrap().unwrap().id, q1.id);
        assert_eq!(repo.list().await.unwrap().len(), 2);
        assert_eq!(repo.list_by_company(company).await.unwrap().len(), 1);
        assert_eq!(
            repo.list_by_status(&[QuoteStatus::Draft]).await.unwrap().len(),
            2
        );
        assert!(repo
            .list_by_status(&[QuoteStatus::Sent])
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let repo = MemoryQuoteRepository::new();
        let mut q = quote(Uuid::new_v4());
        repo.save(&q).await.unwrap();

        q.status = QuoteStatus::Sent;
        repo.save(&q).await.unwrap();
        assert_eq!(
            repo.get(q.id).await.unwrap().unwrap().status,
            QuoteStatus::Sent
        );
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
