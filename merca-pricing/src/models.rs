use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Round a dollar amount to cent precision.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Wholesale pricing tier assigned to a buying company.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PricingTier {
    Bronze,
    Silver,
    Gold,
}

impl PricingTier {
    /// Flat percentage off MSRP for the tier.
    pub fn base_discount(&self) -> f64 {
        match self {
            PricingTier::Bronze => 0.30,
            PricingTier::Silver => 0.40,
            PricingTier::Gold => 0.50,
        }
    }
}

impl Default for PricingTier {
    fn default() -> Self {
        PricingTier::Bronze
    }
}

impl std::fmt::Display for PricingTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingTier::Bronze => write!(f, "bronze"),
            PricingTier::Silver => write!(f, "silver"),
            PricingTier::Gold => write!(f, "gold"),
        }
    }
}

/// Order type; closeout orders unlock clearance discounting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Standard,
    Closeout,
}

impl Default for OrderType {
    fn default() -> Self {
        OrderType::Standard
    }
}

/// Quantity threshold at which a steeper discount applies.
///
/// Breaks are evaluated sorted by `min_qty` descending; the first break
/// whose `min_qty` is at or below the ordered quantity wins (highest
/// qualifying threshold, not cumulative).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeBreak {
    pub min_qty: u32,
    /// Discount fraction in [0, 1].
    pub discount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_qty: Option<u32>,
}

impl VolumeBreak {
    pub fn applies_to(&self, quantity: u32) -> bool {
        quantity >= self.min_qty && self.max_qty.map_or(true, |max| quantity <= max)
    }
}

/// Per-product pricing rule inside a price list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRule {
    pub product_id: Uuid,
    #[serde(default)]
    pub volume_breaks: Vec<VolumeBreak>,
    /// A fixed per-unit price. When set it bypasses every percentage
    /// discount (highest precedence rule).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_price: Option<f64>,
}

/// Extra discounting for closeout orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearanceRules {
    pub additional_discount: f64,
    /// Cap on the cumulative discount fraction once clearance stacks on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_discount_percent: Option<f64>,
}

/// Whole-order volume incentive keyed on the order's monetary total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalVolumeBreak {
    pub min_order_value: f64,
    pub additional_discount: f64,
}

/// A named bundle of per-product pricing rules assignable to companies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceList {
    pub id: Uuid,
    pub name: String,
    /// Some lists are company-specific, others shared across a tier.
    pub company_id: Option<Uuid>,
    pub base_tier: PricingTier,
    #[serde(default)]
    pub rules: Vec<PriceRule>,
    #[serde(default)]
    pub global_volume_breaks: Vec<GlobalVolumeBreak>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clearance_rules: Option<ClearanceRules>,
    pub effective_from: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<DateTime<Utc>>,
}

impl PriceList {
    pub fn is_effective_at(&self, now: DateTime<Utc>) -> bool {
        self.effective_from <= now && self.effective_to.map_or(true, |until| now <= until)
    }

    pub fn rule_for(&self, product_id: Uuid) -> Option<&PriceRule> {
        self.rules.iter().find(|r| r.product_id == product_id)
    }
}

/// Links a company to a price list. Lookup picks the lowest `priority`
/// among assignments whose list is effective now; equal priorities fall
/// back to the most recent `assigned_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceListAssignment {
    pub company_id: Uuid,
    pub price_list_id: Uuid,
    pub priority: i32,
    pub assigned_at: DateTime<Utc>,
}

/// Which discount layer a breakdown line came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakdownKind {
    TierDiscount,
    VolumeBreak,
    FixedPrice,
    Clearance,
    OrderVolume,
}

/// One applied discount layer, in application order, for UI transparency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBreakdownItem {
    pub kind: BreakdownKind,
    pub description: String,
    /// Discount fraction this layer contributed.
    pub discount: f64,
    /// Per-unit dollar value of the layer.
    pub amount: f64,
}

/// Itemized result of a price calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceCalculation {
    pub product_id: Uuid,
    pub quantity: u32,
    pub list_price: f64,
    pub unit_price: f64,
    pub total_price: f64,
    pub savings: f64,
    pub savings_percent: f64,
    pub breakdown: Vec<PriceBreakdownItem>,
}
