use crate::price_book::PriceBook;
use chrono::{Duration, Utc};
use merca_pricing::{
    ClearanceRules, GlobalVolumeBreak, PriceList, PriceListAssignment, PriceRule, PricingTier,
    VolumeBreak,
};
use uuid::Uuid;

/// Ids the demo dataset hands back so callers (the binary, tests) can
/// exercise known companies and products.
#[derive(Debug, Clone)]
pub struct SeedData {
    pub retailer_company_id: Uuid,
    pub negotiated_list_id: Uuid,
    pub volume_product_id: Uuid,
    pub fixed_price_product_id: Uuid,
}

/// Load the demo price book: one shared list per tier plus a negotiated
/// company list carrying volume breaks, a contract fixed price, clearance
/// rules and an order-volume incentive.
pub async fn seed_price_book(book: &PriceBook) -> SeedData {
    let now = Utc::now();
    let retailer_company_id = Uuid::new_v4();
    let volume_product_id = Uuid::new_v4();
    let fixed_price_product_id = Uuid::new_v4();

    for (name, tier) in [
        ("Bronze standard", PricingTier::Bronze),
        ("Silver standard", PricingTier::Silver),
        ("Gold standard", PricingTier::Gold),
    ] {
        book.upsert_list(PriceList {
            id: Uuid::new_v4(),
            name: name.to_string(),
            company_id: None,
            base_tier: tier,
            rules: vec![],
            global_volume_breaks: vec![],
            clearance_rules: None,
            effective_from: now - Duration::days(365),
            effective_to: None,
        })
        .await;
    }

    let negotiated = PriceList {
        id: Uuid::new_v4(),
        name: "Negotiated 2026".to_string(),
        company_id: Some(retailer_company_id),
        base_tier: PricingTier::Silver,
        rules: vec![
            PriceRule {
                product_id: volume_product_id,
                volume_breaks: vec![
                    VolumeBreak {
                        min_qty: 50,
                        discount: 0.45,
                        max_qty: None,
                    },
                    VolumeBreak {
                        min_qty: 25,
                        discount: 0.42,
                        max_qty: Some(49),
                    },
                ],
                fixed_price: None,
            },
            PriceRule {
                product_id: fixed_price_product_id,
                volume_breaks: vec![],
                fixed_price: Some(19.75),
            },
        ],
        global_volume_breaks: vec![GlobalVolumeBreak {
            min_order_value: 5000.0,
            additional_discount: 0.03,
        }],
        clearance_rules: Some(ClearanceRules {
            additional_discount: 0.15,
            max_discount_percent: Some(0.60),
        }),
        effective_from: now - Duration::days(30),
        effective_to: Some(now + Duration::days(335)),
    };
    let negotiated_list_id = negotiated.id;
    book.upsert_list(negotiated).await;
    book.assign(PriceListAssignment {
        company_id: retailer_company_id,
        price_list_id: negotiated_list_id,
        priority: 1,
        assigned_at: now,
    })
    .await;

    tracing::info!(company = %retailer_company_id, "seeded demo price book");

    SeedData {
        retailer_company_id,
        negotiated_list_id,
        volume_product_id,
        fixed_price_product_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_resolves_negotiated_list() {
        let book = PriceBook::new();
        let seed = seed_price_book(&book).await;

        let resolved = book
            .resolve_for_company(seed.retailer_company_id, Utc::now())
            .await
            .unwrap();
        assert_eq!(resolved.id, seed.negotiated_list_id);
        assert!(resolved.rule_for(seed.volume_product_id).is_some());
        assert_eq!(
            resolved
                .rule_for(seed.fixed_price_product_id)
                .unwrap()
                .fixed_price,
            Some(19.75)
        );
    }
}
