use crate::models::{
    round_cents, BreakdownKind, OrderType, PriceBreakdownItem, PriceCalculation, PriceList,
    PricingTier,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("Invalid pricing input: {0}")]
    InvalidInput(String),
}

/// How a matched volume break combines with the company's tier discount.
///
/// The two never stack; the policy decides which one forms the base of
/// the discount. Clearance and order-volume layers stack on top either
/// way.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscountPolicy {
    /// The larger of tier discount and volume discount wins.
    BestForCustomer,
    /// A matched volume break always replaces the tier discount, even
    /// when the tier discount is larger.
    VolumeOverridesTier,
}

impl Default for DiscountPolicy {
    fn default() -> Self {
        DiscountPolicy::BestForCustomer
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PricingConfig {
    #[serde(default)]
    pub stacking_policy: DiscountPolicy,
}

/// One line item to price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceInput {
    pub product_id: Uuid,
    pub msrp: f64,
    pub quantity: u32,
    pub company_id: Uuid,
    /// The company's tier, used as fallback when no price list resolves.
    /// A resolved list's `base_tier` takes precedence.
    #[serde(default)]
    pub tier: PricingTier,
    #[serde(default)]
    pub order_type: OrderType,
    /// Running order total, for whole-order volume incentives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_total: Option<f64>,
}

/// Pure per-unit price calculator: tier discount, volume breaks, fixed
/// prices, clearance and order-volume layers, with an itemized breakdown.
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn policy(&self) -> DiscountPolicy {
        self.config.stacking_policy
    }

    /// Compute the final unit price for `input` under `price_list`.
    ///
    /// Precedence: a per-product fixed price bypasses every percentage
    /// layer. Otherwise the tier/volume base discount (combined per
    /// `DiscountPolicy`) is extended by clearance (closeout orders,
    /// capped) and order-volume layers, and the cumulative fraction is
    /// clamped to [0, 1]. No price list means tier-only pricing.
    pub fn calculate(
        &self,
        input: &PriceInput,
        price_list: Option<&PriceList>,
    ) -> Result<PriceCalculation, PricingError> {
        validate(input)?;

        let rule = price_list.and_then(|pl| pl.rule_for(input.product_id));

        if let Some(fixed) = rule.and_then(|r| r.fixed_price) {
            if fixed < 0.0 || !fixed.is_finite() {
                return Err(PricingError::InvalidInput(format!(
                    "fixed price {} is not a valid amount",
                    fixed
                )));
            }
            let unit_price = round_cents(fixed);
            let discount = if input.msrp > 0.0 {
                1.0 - unit_price / input.msrp
            } else {
                0.0
            };
            let breakdown = vec![PriceBreakdownItem {
                kind: BreakdownKind::FixedPrice,
                description: format!("Contract fixed price ${:.2}", unit_price),
                discount,
                amount: round_cents(input.msrp - unit_price),
            }];
            return Ok(self.finish(input, unit_price, breakdown));
        }

        let tier = price_list.map(|pl| pl.base_tier).unwrap_or(input.tier);
        let tier_discount = tier.base_discount();

        // Highest qualifying threshold wins: scan breaks sorted by
        // min_qty descending and take the first match.
        let volume_break = rule.and_then(|r| {
            let mut breaks: Vec<_> = r.volume_breaks.iter().collect();
            breaks.sort_by(|a, b| b.min_qty.cmp(&a.min_qty));
            breaks.into_iter().find(|b| b.applies_to(input.quantity))
        });

        let mut breakdown = Vec::new();
        let mut effective = match (volume_break, self.config.stacking_policy) {
            (Some(vb), DiscountPolicy::VolumeOverridesTier) => {
                breakdown.push(volume_line(input, vb.min_qty, vb.discount));
                vb.discount
            }
            (Some(vb), DiscountPolicy::BestForCustomer) if vb.discount >= tier_discount => {
                breakdown.push(volume_line(input, vb.min_qty, vb.discount));
                vb.discount
            }
            _ => {
                if tier_discount > 0.0 {
                    breakdown.push(PriceBreakdownItem {
                        kind: BreakdownKind::TierDiscount,
                        description: format!(
                            "{} tier discount ({:.0}%)",
                            tier,
                            tier_discount * 100.0
                        ),
                        discount: tier_discount,
                        amount: round_cents(input.msrp * tier_discount),
                    });
                }
                tier_discount
            }
        };

        if input.order_type == OrderType::Closeout {
            if let Some(clearance) = price_list.and_then(|pl| pl.clearance_rules.as_ref()) {
                let before = effective;
                effective += clearance.additional_discount;
                if let Some(cap) = clearance.max_discount_percent {
                    effective = effective.min(cap);
                }
                let applied = effective - before;
                if applied > 0.0 {
                    breakdown.push(PriceBreakdownItem {
                        kind: BreakdownKind::Clearance,
                        description: format!(
                            "Closeout clearance ({:.0}%)",
                            applied * 100.0
                        ),
                        discount: applied,
                        amount: round_cents(input.msrp * applied),
                    });
                }
            }
        }

        if let (Some(order_total), Some(pl)) = (input.order_total, price_list) {
            let mut globals: Vec<_> = pl.global_volume_breaks.iter().collect();
            globals.sort_by(|a, b| {
                b.min_order_value
                    .partial_cmp(&a.min_order_value)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            if let Some(gb) = globals.into_iter().find(|g| order_total >= g.min_order_value) {
                effective += gb.additional_discount;
                breakdown.push(PriceBreakdownItem {
                    kind: BreakdownKind::OrderVolume,
                    description: format!(
                        "Order volume over ${:.0} ({:.0}%)",
                        gb.min_order_value,
                        gb.additional_discount * 100.0
                    ),
                    discount: gb.additional_discount,
                    amount: round_cents(input.msrp * gb.additional_discount),
                });
            }
        }

        let effective = effective.clamp(0.0, 1.0);
        let unit_price = round_cents(input.msrp * (1.0 - effective));
        Ok(self.finish(input, unit_price, breakdown))
    }

    fn finish(
        &self,
        input: &PriceInput,
        unit_price: f64,
        breakdown: Vec<PriceBreakdownItem>,
    ) -> PriceCalculation {
        let savings = round_cents(input.msrp - unit_price);
        PriceCalculation {
            product_id: input.product_id,
            quantity: input.quantity,
            list_price: input.msrp,
            unit_price,
            total_price: round_cents(unit_price * input.quantity as f64),
            savings,
            savings_percent: round_cents(savings / input.msrp * 100.0),
            breakdown,
        }
    }
}

fn volume_line(input: &PriceInput, min_qty: u32, discount: f64) -> PriceBreakdownItem {
    PriceBreakdownItem {
        kind: BreakdownKind::VolumeBreak,
        description: format!("Volume break at {}+ units ({:.0}%)", min_qty, discount * 100.0),
        discount,
        amount: round_cents(input.msrp * discount),
    }
}

fn validate(input: &PriceInput) -> Result<(), PricingError> {
    if !input.msrp.is_finite() || input.msrp <= 0.0 {
        return Err(PricingError::InvalidInput(format!(
            "msrp must be a positive amount, got {}",
            input.msrp
        )));
    }
    if input.quantity == 0 {
        return Err(PricingError::InvalidInput(
            "quantity must be at least 1".to_string(),
        ));
    }
    if let Some(total) = input.order_total {
        if !total.is_finite() || total < 0.0 {
            return Err(PricingError::InvalidInput(format!(
                "order_total must be a non-negative amount, got {}",
                total
            )));
        }
    }
    Ok(())
}
