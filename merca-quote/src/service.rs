use crate::lifecycle::{check_transition, QuoteError, TransitionPolicy};
use crate::models::{Quote, QuoteEvent, QuoteEventType, QuoteItem, QuoteStatus, QuoteVersion};
use crate::repository::QuoteRepository;
use chrono::{DateTime, Duration, Utc};
use merca_core::identity::{Actor, Role};
use merca_order::{Order, OrderRepository};
use merca_pricing::{OrderType, PriceInput, PriceList, PricingEngine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// An unpriced line as submitted by a rep; the service runs it through
/// the pricing engine before it lands on a quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub msrp: f64,
    pub quantity: u32,
}

/// Orchestrates the quote lifecycle over injected repositories.
///
///// No concurrency control: concurrent updates to the same quote are
/// last-write-wins, matching the single-process portal this serves.
pub struct QuoteService {
    repo: Arc<dyn QuoteRepository>,
    orders: Arc<dyn OrderRepository>,
    policy: TransitionPolicy,
}

impl QuoteService {
    pub fn new(
        repo: Arc<dyn QuoteRepository>,
        orders: Arc<dyn OrderRepository>,
        policy: TransitionPolicy,
    ) -> Self {
        Self {
            repo,
            orders,
            policy,
        }
    }

    pub fn policy(&self) -> &TransitionPolicy {
        &self.policy
    }

    /// Create a draft quote, pricing every line through the engine so the
    /// stored totals can never drift from what the engine would produce.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_quote(
        &self,
        actor: &Actor,
        company_id: Uuid,
        order_type: OrderType,
        lines: Vec<QuoteLine>,
        engine: &PricingEngine,
        price_list: Option<&PriceList>,
        valid_for: Duration,
        currency: String,
    ) -> Result<Quote, QuoteError> {
        if !matches!(actor.role, Role::SalesRep | Role::Admin) {
            return Err(QuoteError::Forbidden(format!(
                "role {} may not create quotes",
                actor.role
            )));
        }
        if lines.is_empty() {
            return Err(QuoteError::Validation(
                "a quote needs at least one line item".to_string(),
            ));
        }

        let items = price_lines(&lines, company_id, order_type, engine, price_list)?;
        let quote = Quote::new(
            company_id,
            actor.user_id.clone(),
            order_type,
            items,
            currency,
            Utc::now() + valid_for,
        );
        self.repo.save(&quote).await?;
        tracing::info!(quote = %quote.number, company = %company_id, "quote created");
        Ok(quote)
    }

    pub async fn get_quote(&self, id: Uuid) -> Result<Quote, QuoteError> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| QuoteError::NotFound(id.to_string()))
    }

    pub async fn list_quotes(&self) -> Result<Vec<Quote>, QuoteError> {
        Ok(self.repo.list().await?)
    }

    pub async fn list_for_company(&self, company_id: Uuid) -> Result<Vec<Quote>, QuoteError> {
        Ok(self.repo.list_by_company(company_id).await?)
    }

    /// Apply a status transition: validate the quote exists, check the
    /// state machine and the actor's role, append the timeline event,
    /// mutate, persist.
    pub async fn update_status(
        &self,
        id: Uuid,
        new_status: QuoteStatus,
        actor: &Actor,
        details: Option<String>,
    ) -> Result<Quote, QuoteError> {
        if new_status == QuoteStatus::Converted {
            return Err(QuoteError::Validation(
                "conversion must go through convert_to_order".to_string(),
            ));
        }

        let mut quote = self.get_quote(id).await?;

        // Cancellation is reserved for the quote's creator, admins aside.
        if new_status == QuoteStatus::Cancelled
            && actor.role != Role::Admin
            && actor.user_id != quote.created_by
        {
            return Err(QuoteError::Forbidden(
                "only the creator or an admin may cancel a quote".to_string(),
            ));
        }

        check_transition(quote.status, new_status, actor.role, &self.policy)?;

        let event_type = QuoteEventType::for_status(new_status).ok_or_else(|| {
            QuoteError::Validation(format!("no event defined for status {}", new_status))
        })?;
        quote.append_event(QuoteEvent::new(event_type, actor.user_id.clone(), details));
        quote.status = new_status;
        self.repo.save(&quote).await?;
        tracing::info!(quote = %quote.number, status = %new_status, actor = %actor.user_id, "quote transitioned");
        Ok(quote)
    }

    /// Auto-transition used by the retailer read path: a retailer opening
    /// a SENT quote marks it VIEWED. Anything else is a plain read.
    pub async fn mark_viewed(&self, id: Uuid, actor: &Actor) -> Result<Quote, QuoteError> {
        let quote = self.get_quote(id).await?;
        if actor.role == Role::Retailer && quote.status == QuoteStatus::Sent {
            return self.update_status(id, QuoteStatus::Viewed, actor, None).await;
        }
        Ok(quote)
    }

    /// Retailer-driven revision: reprice the proposed lines, snapshot a
    /// new version, and move the quote to REVISED.
    pub async fn revise(
        &self,
        id: Uuid,
        actor: &Actor,
        lines: Vec<QuoteLine>,
        reason: Option<String>,
        engine: &PricingEngine,
        price_list: Option<&PriceList>,
    ) -> Result<Quote, QuoteError> {
        if lines.is_empty() {
            return Err(QuoteError::Validation(
                "a revision needs at least one line item".to_string(),
            ));
        }

        let mut quote = self.get_quote(id).await?;
        check_transition(quote.status, QuoteStatus::Revised, actor.role, &self.policy)?;

        let items = price_lines(&lines, quote.company_id, quote.order_type, engine, price_list)?;
        quote.replace_items(items);
        quote.current_version += 1;
        quote.versions.push(QuoteVersion {
            version: quote.current_version,
            created_at: Utc::now(),
            created_by: actor.user_id.clone(),
            items: quote.items.clone(),
            pricing: quote.pricing.clone(),
            reason: reason.clone(),
        });
        quote.append_event(QuoteEvent::new(
            QuoteEventType::Revised,
            actor.user_id.clone(),
            reason,
        ));
        quote.status = QuoteStatus::Revised;
        self.repo.save(&quote).await?;
        tracing::info!(quote = %quote.number, version = quote.current_version, "quote revised");
        Ok(quote)
    }

    /// Batch sweep: expire every SENT/VIEWED quote whose validity window
    /// has passed. A second sweep over the same data expires nothing.
    pub async fn expire_quotes(&self, now: DateTime<Utc>) -> Result<usize, QuoteError> {
        let candidates = self
            .repo
            .list_by_status(&[QuoteStatus::Sent, QuoteStatus::Viewed])
            .await?;

        let mut expired = 0;
        for mut quote in candidates {
            if !quote.is_past_validity(now) {
                continue;
            }
            quote.append_event(QuoteEvent::new(
                QuoteEventType::Expired,
                "system",
                Some(format!("valid_until {}", quote.terms.valid_until)),
            ));
            quote.status = QuoteStatus::Expired;
            self.repo.save(&quote).await?;
            expired += 1;
        }
        if expired > 0 {
            tracing::info!(count = expired, "expired quotes past their validity window");
        }
        Ok(expired)
    }

    /// Quotes whose validity window closes within `lookahead` of `now`.
    /// Pure read, used for notification surfaces.
    pub async fn check_expiring(
        &self,
        now: DateTime<Utc>,
        lookahead: Duration,
    ) -> Result<Vec<Quote>, QuoteError> {
        let candidates = self
            .repo
            .list_by_status(&[QuoteStatus::Sent, QuoteStatus::Viewed])
            .await?;
        let horizon = now + lookahead;
        Ok(candidates
            .into_iter()
            .filter(|q| q.terms.valid_until > now && q.terms.valid_until <= horizon)
            .collect())
    }

    /// Convert an accepted quote into an order. The order insert and the
    /// quote mutation are two separate writes with no transaction across
    /// them; a crash in between leaves an order without a converted
    /// quote, which the single-process portal tolerates.
    pub async fn convert_to_order(
        &self,
        id: Uuid,
        actor: &Actor,
    ) -> Result<(Quote, Order), QuoteError> {
        let mut quote = self.get_quote(id).await?;
        check_transition(quote.status, QuoteStatus::Converted, actor.role, &self.policy)?;

        let order = quote.to_order();
        self.orders.create(&order).await?;

        quote.converted_order_id = Some(order.id);
        quote.append_event(QuoteEvent::new(
            QuoteEventType::Converted,
            actor.user_id.clone(),
            Some(order.number.clone()),
        ));
        quote.status = QuoteStatus::Converted;
        self.repo.save(&quote).await?;
        tracing::info!(quote = %quote.number, order = %order.number, "quote converted to order");
        Ok((quote, order))
    }
}

fn price_lines(
    lines: &[QuoteLine],
    company_id: Uuid,
    order_type: OrderType,
    engine: &PricingEngine,
    price_list: Option<&PriceList>,
) -> Result<Vec<QuoteItem>, QuoteError> {
    lines
        .iter()
        .map(|line| {
            let calc = engine.calculate(
                &PriceInput {
                    product_id: line.product_id,
                    msrp: line.msrp,
                    quantity: line.quantity,
                    company_id,
                    tier: price_list.map(|pl| pl.base_tier).unwrap_or_default(),
                    order_type,
                    order_total: None,
                },
                price_list,
            )?;
            Ok(QuoteItem::from_calculation(line.product_name.clone(), &calc))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use merca_core::CoreResult;
    use merca_pricing::PricingConfig;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct TestQuoteRepo {
        quotes: Mutex<HashMap<Uuid, Quote>>,
    }

    #[async_trait]
    impl QuoteRepository for TestQuoteRepo {
        async fn save(&self, quote: &Quote) -> CoreResult<()> {
            self.quotes.lock().unwrap().insert(quote.id, quote.clone());
            Ok(())
        }

        async fn get(&self, id: Uuid) -> CoreResult<Option<Quote>> {
            Ok(self.quotes.lock().unwrap().get(&id).cloned())
        }

        async fn list(&self) -> CoreResult<Vec<Quote>> {
            Ok(self.quotes.lock().unwrap().values().cloned().collect())
        }

        async fn list_by_company(&self, company_id: Uuid) -> CoreResult<Vec<Quote>> {
            Ok(self
                .quotes
                .lock()
                .unwrap()
                .values()
                .filter(|q| q.company_id == company_id)
                .cloned()
                .collect())
        }

        async fn list_by_status(&self, statuses: &[QuoteStatus]) -> CoreResult<Vec<Quote>> {
            Ok(self
                .quotes
                .lock()
                .unwrap()
                .values()
                .filter(|q| statuses.contains(&q.status))
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct TestOrderRepo {
        orders: Mutex<HashMap<Uuid, Order>>,
    }

    #[async_trait]
    impl OrderRepository for TestOrderRepo {
        async fn create(&self, order: &Order) -> CoreResult<Uuid> {
            self.orders.lock().unwrap().insert(order.id, order.clone());
            Ok(order.id)
        }

        async fn get(&self, id: Uuid) -> CoreResult<Option<Order>> {
            Ok(self.orders.lock().unwrap().get(&id).cloned())
        }

        async fn list_by_company(&self, company_id: Uuid) -> CoreResult<Vec<Order>> {
            Ok(self
                .orders
                .lock()
                .unwrap()
                .values()
                .filter(|o| o.company_id == company_id)
                .cloned()
                .collect())
        }
    }

    fn service() -> QuoteService {
        QuoteService::new(
            Arc::new(TestQuoteRepo::default()),
            Arc::new(TestOrderRepo::default()),
            TransitionPolicy::default(),
        )
    }

    fn engine() -> PricingEngine {
        PricingEngine::new(PricingConfig::default())
    }

    fn lines() -> Vec<QuoteLine> {
        vec![QuoteLine {
            product_id: Uuid::new_v4(),
            product_name: "Widget".to_string(),
            msrp: 100.0,
            quantity: 10,
        }]
    }

    async fn draft(service: &QuoteService, rep: &Actor) -> Quote {
        service
            .create_quote(
                rep,
                Uuid::new_v4(),
                OrderType::Standard,
                lines(),
                &engine(),
                None,
                Duration::days(30),
                "USD".to_string(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_full_lifecycle_to_conversion() {
        let service = service();
        let rep = Actor::new("rep-1", Role::SalesRep);
        let retailer = Actor::new("buyer-1", Role::Retailer);
        let admin = Actor::new("admin-1", Role::Admin);

        let quote = draft(&service, &rep).await;
        assert_eq!(quote.status, QuoteStatus::Draft);

        service
            .update_status(quote.id, QuoteStatus::Sent, &rep, None)
            .await
            .unwrap();
        service.mark_viewed(quote.id, &retailer).await.unwrap();
        service
            .update_status(quote.id, QuoteStatus::Accepted, &retailer, None)
            .await
            .unwrap();
        let (quote, order) = service.convert_to_order(quote.id, &admin).await.unwrap();

        assert_eq!(quote.status, QuoteStatus::Converted);
        assert_eq!(quote.converted_order_id, Some(order.id));
        assert_eq!(quote.timeline.len(), 4);
        assert_eq!(order.total, quote.pricing.total);
        assert_eq!(service.orders.get(order.id).await.unwrap().unwrap().id, order.id);
    }

    #[tokio::test]
    async fn test_retailer_cannot_create_and_draft_accept_rejected() {
        let service = service();
        let retailer = Actor::new("buyer-1", Role::Retailer);
        assert!(matches!(
            service
                .create_quote(
                    &retailer,
                    Uuid::new_v4(),
                    OrderType::Standard,
                    lines(),
                    &engine(),
                    None,
                    Duration::days(30),
                    "USD".to_string(),
                )
                .await,
            Err(QuoteError::Forbidden(_))
        ));

        let rep = Actor::new("rep-1", Role::SalesRep);
        let quote = draft(&service, &rep).await;
        assert!(matches!(
            service
                .update_status(quote.id, QuoteStatus::Accepted, &retailer, None)
                .await,
            Err(QuoteError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_cancel_requires_creator_or_admin() {
        let service = service();
        let rep = Actor::new("rep-1", Role::SalesRep);
        let other_rep = Actor::new("rep-2", Role::SalesRep);
        let admin = Actor::new("admin-1", Role::Admin);

        let quote = draft(&service, &rep).await;
        assert!(matches!(
            service
                .update_status(quote.id, QuoteStatus::Cancelled, &other_rep, None)
                .await,
            Err(QuoteError::Forbidden(_))
        ));

        let quote = service
            .update_status(quote.id, QuoteStatus::Cancelled, &rep, None)
            .await
            .unwrap();
        assert_eq!(quote.status, QuoteStatus::Cancelled);

        let quote2 = draft(&service, &rep).await;
        let quote2 = service
            .update_status(quote2.id, QuoteStatus::Cancelled, &admin, None)
            .await
            .unwrap();
        assert_eq!(quote2.status, QuoteStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_direct_converted_status_rejected() {
        let service = service();
        let rep = Actor::new("rep-1", Role::SalesRep);
        let quote = draft(&service, &rep).await;
        assert!(matches!(
            service
                .update_status(quote.id, QuoteStatus::Converted, &rep, None)
                .await,
            Err(QuoteError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_expire_quotes_is_idempotent() {
        let service = service();
        let rep = Actor::new("rep-1", Role::SalesRep);

        let quote = draft(&service, &rep).await;
        service
            .update_status(quote.id, QuoteStatus::Sent, &rep, None)
            .await
            .unwrap();

        // Sweep "in the future", past the validity window.
        let later = Utc::now() + Duration::days(31);
        assert_eq!(service.expire_quotes(later).await.unwrap(), 1);
        assert_eq!(service.expire_quotes(later).await.unwrap(), 0);

        let quote = service.get_quote(quote.id).await.unwrap();
        assert_eq!(quote.status, QuoteStatus::Expired);
        assert_eq!(quote.timeline.len(), 2);
    }

    #[tokio::test]
    async fn test_check_expiring_window() {
        let service = service();
        let rep = Actor::new("rep-1", Role::SalesRep);

        let soon = service
            .create_quote(
                &rep,
                Uuid::new_v4(),
                OrderType::Standard,
                lines(),
                &engine(),
                None,
                Duration::days(2),
                "USD".to_string(),
            )
            .await
            .unwrap();
        let distant = draft(&service, &rep).await; // 30 days out
        for q in [&soon, &distant] {
            service
                .update_status(q.id, QuoteStatus::Sent, &rep, None)
                .await
                .unwrap();
        }

        let expiring = service
            .check_expiring(Utc::now(), Duration::days(3))
            .await
            .unwrap();
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].id, soon.id);
    }

    #[tokio::test]
    async fn test_revision_snapshots_a_version() {
        let service = service();
        let rep = Actor::new("rep-1", Role::SalesRep);
        let retailer = Actor::new("buyer-1", Role::Retailer);

        let quote = draft(&service, &rep).await;
        service
            .update_status(quote.id, QuoteStatus::Sent, &rep, None)
            .await
            .unwrap();

        let mut revised_lines = lines();
        revised_lines[0].quantity = 25;
        let quote = service
            .revise(
                quote.id,
                &retailer,
                revised_lines,
                Some("need a better break at 25".to_string()),
                &engine(),
                None,
            )
            .await
            .unwrap();

        assert_eq!(quote.status, QuoteStatus::Revised);
        assert_eq!(quote.current_version, 2);
        assert_eq!(quote.versions.len(), 2);
        assert_eq!(quote.versions[1].reason.as_deref(), Some("need a better break at 25"));

        // Re-send re-enters the accept path.
        let quote = service
            .update_status(quote.id, QuoteStatus::Sent, &rep, None)
            .await
            .unwrap();
        assert_eq!(quote.status, QuoteStatus::Sent);
    }
}
