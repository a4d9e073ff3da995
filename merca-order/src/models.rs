use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order status after quote conversion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Submitted,
    Processing,
    Fulfilled,
    Cancelled,
}

/// A wholesale order, usually produced by converting an accepted quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub number: String,
    pub company_id: Uuid,
    /// The quote this order was converted from, when applicable.
    pub quote_id: Option<Uuid>,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub total: f64,
    pub currency: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(company_id: Uuid, currency: String) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            number: order_number(&id),
            company_id,
            quote_id: None,
            items: Vec::new(),
            subtotal: 0.0,
            total: 0.0,
            currency,
            status: OrderStatus::Submitted,
            created_at: Utc::now(),
        }
    }

    /// Add an item and fold it into the totals.
    pub fn add_item(&mut self, item: OrderItem) {
        self.subtotal += item.msrp * item.quantity as f64;
        self.total += item.total;
        self.items.push(item);
    }
}

/// An individual product line within an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: u32,
    pub msrp: f64,
    pub unit_price: f64,
    pub total: f64,
}

impl OrderItem {
    pub fn new(
        order_id: Uuid,
        product_id: Uuid,
        product_name: String,
        quantity: u32,
        msrp: f64,
        unit_price: f64,
        total: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            product_id,
            product_name,
            quantity,
            msrp,
            unit_price,
            total,
        }
    }
}

fn order_number(id: &Uuid) -> String {
    format!("SO-{}", id.simple().to_string()[..8].to_uppercase())
}
