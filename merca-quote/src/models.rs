use chrono::{DateTime, Utc};
use merca_pricing::{round_cents, OrderType, PriceCalculation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Quote status in the lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Viewed,
    Revised,
    Accepted,
    Rejected,
    Expired,
    Cancelled,
    Converted,
}

impl QuoteStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QuoteStatus::Rejected
                | QuoteStatus::Expired
                | QuoteStatus::Cancelled
                | QuoteStatus::Converted
        )
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            QuoteStatus::Draft => "DRAFT",
            QuoteStatus::Sent => "SENT",
            QuoteStatus::Viewed => "VIEWED",
            QuoteStatus::Revised => "REVISED",
            QuoteStatus::Accepted => "ACCEPTED",
            QuoteStatus::Rejected => "REJECTED",
            QuoteStatus::Expired => "EXPIRED",
            QuoteStatus::Cancelled => "CANCELLED",
            QuoteStatus::Converted => "CONVERTED",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for QuoteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DRAFT" => Ok(QuoteStatus::Draft),
            "SENT" => Ok(QuoteStatus::Sent),
            "VIEWED" => Ok(QuoteStatus::Viewed),
            "REVISED" => Ok(QuoteStatus::Revised),
            "ACCEPTED" => Ok(QuoteStatus::Accepted),
            "REJECTED" => Ok(QuoteStatus::Rejected),
            "EXPIRED" => Ok(QuoteStatus::Expired),
            "CANCELLED" => Ok(QuoteStatus::Cancelled),
            "CONVERTED" => Ok(QuoteStatus::Converted),
            _ => Err(format!("Invalid quote status: {}", s)),
        }
    }
}

/// Timeline event type, one per status-affecting mutation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteEventType {
    Sent,
    Viewed,
    Accepted,
    Rejected,
    Revised,
    Expired,
    Cancelled,
    Converted,
}

impl QuoteEventType {
    /// The event recorded when entering `status`. `Draft` has no entry
    /// event (creation is not part of the timeline).
    pub fn for_status(status: QuoteStatus) -> Option<Self> {
        match status {
            QuoteStatus::Draft => None,
            QuoteStatus::Sent => Some(QuoteEventType::Sent),
            QuoteStatus::Viewed => Some(QuoteEventType::Viewed),
            QuoteStatus::Revised => Some(QuoteEventType::Revised),
            QuoteStatus::Accepted => Some(QuoteEventType::Accepted),
            QuoteStatus::Rejected => Some(QuoteEventType::Rejected),
            QuoteStatus::Expired => Some(QuoteEventType::Expired),
            QuoteStatus::Cancelled => Some(QuoteEventType::Cancelled),
            QuoteStatus::Converted => Some(QuoteEventType::Converted),
        }
    }
}

/// One entry in a quote's append-only timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteEvent {
    pub event_type: QuoteEventType,
    pub user_id: String,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl QuoteEvent {
    pub fn new(event_type: QuoteEventType, user_id: impl Into<String>, details: Option<String>) -> Self {
        Self {
            event_type,
            user_id: user_id.into(),
            details,
            timestamp: Utc::now(),
        }
    }
}

/// A priced line item on a quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: u32,
    pub msrp: f64,
    pub unit_price: f64,
    pub total: f64,
}

impl QuoteItem {
    /// Build an item from a pricing engine result.
    pub fn from_calculation(product_name: impl Into<String>, calc: &PriceCalculation) -> Self {
        Self {
            product_id: calc.product_id,
            product_name: product_name.into(),
            quantity: calc.quantity,
            msrp: calc.list_price,
            unit_price: calc.unit_price,
            total: calc.total_price,
        }
    }
}

/// Monetary roll-up; `total` always equals the sum of item totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotePricing {
    pub subtotal: f64,
    pub discount_total: f64,
    pub total: f64,
    pub currency: String,
}

impl QuotePricing {
    pub fn from_items(items: &[QuoteItem], currency: String) -> Self {
        let subtotal = round_cents(
            items
                .iter()
                .map(|i| i.msrp * i.quantity as f64)
                .sum::<f64>(),
        );
        let total = round_cents(items.iter().map(|i| i.total).sum::<f64>());
        Self {
            subtotal,
            discount_total: round_cents(subtotal - total),
            total,
            currency,
        }
    }
}

/// Validity window and commercial terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteTerms {
    pub valid_until: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Append-only snapshot taken whenever the quote's content changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteVersion {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub items: Vec<QuoteItem>,
    pub pricing: QuotePricing,
    pub reason: Option<String>,
}

/// A proposed, revisable, time-bounded price agreement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    pub number: String,
    pub company_id: Uuid,
    pub created_by: String,
    pub status: QuoteStatus,
    pub order_type: OrderType,
    pub items: Vec<QuoteItem>,
    pub pricing: QuotePricing,
    pub terms: QuoteTerms,
    pub versions: Vec<QuoteVersion>,
    pub timeline: Vec<QuoteEvent>,
    pub current_version: u32,
    pub converted_order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(
        company_id: Uuid,
        created_by: impl Into<String>,
        order_type: OrderType,
        items: Vec<QuoteItem>,
        currency: String,
        valid_until: DateTime<Utc>,
    ) -> Self {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let created_by = created_by.into();
        let pricing = QuotePricing::from_items(&items, currency);
        let first_version = QuoteVersion {
            version: 1,
            created_at: now,
            created_by: created_by.clone(),
            items: items.clone(),
            pricing: pricing.clone(),
            reason: None,
        };
        Self {
            id,
            number: quote_number(&id),
            company_id,
            created_by,
            status: QuoteStatus::Draft,
            order_type,
            items,
            pricing,
            terms: QuoteTerms {
                valid_until,
                payment_terms: None,
                notes: None,
            },
            versions: vec![first_version],
            timeline: Vec::new(),
            current_version: 1,
            converted_order_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace items and recompute pricing, keeping the no-drift
    /// invariant between `pricing.total` and the item totals.
    pub fn replace_items(&mut self, items: Vec<QuoteItem>) {
        self.pricing = QuotePricing::from_items(&items, self.pricing.currency.clone());
        self.items = items;
        self.updated_at = Utc::now();
    }

    pub fn append_event(&mut self, event: QuoteEvent) {
        self.timeline.push(event);
        self.updated_at = Utc::now();
    }

    pub fn is_past_validity(&self, now: DateTime<Utc>) -> bool {
        now > self.terms.valid_until
    }

    /// Convert into an order, copying items and pricing.
    pub fn to_order(&self) -> merca_order::Order {
        let mut order =
            merca_order::Order::new(self.company_id, self.pricing.currency.clone());
        order.quote_id = Some(self.id);
        for item in &self.items {
            order.add_item(merca_order::OrderItem::new(
                order.id,
                item.product_id,
                item.product_name.clone(),
                item.quantity,
                item.msrp,
                item.unit_price,
                item.total,
            ));
        }
        order
    }
}

fn quote_number(id: &Uuid) -> String {
    format!("Q-{}", id.simple().to_string()[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item(msrp: f64, unit_price: f64, quantity: u32) -> QuoteItem {
        QuoteItem {
            product_id: Uuid::new_v4(),
            product_name: "Test product".to_string(),
            quantity,
            msrp,
            unit_price,
            total: round_cents(unit_price * quantity as f64),
        }
    }

    #[test]
    fn test_pricing_matches_item_totals() {
        let items = vec![item(100.0, 60.0, 10), item(40.0, 28.0, 5)];
        let quote = Quote::new(
            Uuid::new_v4(),
            "rep-1",
            OrderType::Standard,
            items,
            "USD".to_string(),
            Utc::now() + Duration::days(30),
        );

        assert_eq!(quote.status, QuoteStatus::Draft);
        assert_eq!(quote.pricing.subtotal, 1200.0);
        assert_eq!(quote.pricing.total, 740.0);
        assert_eq!(quote.pricing.discount_total, 460.0);
        assert!(quote.timeline.is_empty());
        assert_eq!(quote.versions.len(), 1);
        assert!(quote.number.starts_with("Q-"));
    }

    #[test]
    fn test_replace_items_keeps_no_drift_invariant() {
        let mut quote = Quote::new(
            Uuid::new_v4(),
            "rep-1",
            OrderType::Standard,
            vec![item(100.0, 70.0, 2)],
            "USD".to_string(),
            Utc::now() + Duration::days(30),
        );
        quote.replace_items(vec![item(100.0, 55.0, 4)]);

        let recomputed: f64 = quote.items.iter().map(|i| i.total).sum();
        assert_eq!(quote.pricing.total, round_cents(recomputed));
        assert_eq!(quote.pricing.total, 220.0);
    }

    #[test]
    fn test_to_order_copies_items_and_pricing() {
        let quote = Quote::new(
            Uuid::new_v4(),
            "rep-1",
            OrderType::Standard,
            vec![item(100.0, 60.0, 10)],
            "USD".to_string(),
            Utc::now() + Duration::days(30),
        );
        let order = quote.to_order();

        assert_eq!(order.quote_id, Some(quote.id));
        assert_eq!(order.company_id, quote.company_id);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total, quote.pricing.total);
        assert!(order.number.starts_with("SO-"));
    }

    #[test]
    fn test_terminal_states() {
        for status in [
            QuoteStatus::Rejected,
            QuoteStatus::Expired,
            QuoteStatus::Cancelled,
            QuoteStatus::Converted,
        ] {
            assert!(status.is_terminal());
        }
        for status in [QuoteStatus::Draft, QuoteStatus::Sent, QuoteStatus::Accepted] {
            assert!(!status.is_terminal());
        }
    }
}
