use axum::{extract::State, Extension, Json};
use chrono::Utc;
use merca_core::identity::Role;
use merca_core::overrides::namespaces;
use merca_pricing::{OrderType, PriceCalculation, PriceInput, PricingTier};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::AuthSession;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CalculatePriceRequest {
    pub product_id: Uuid,
    pub msrp: f64,
    pub quantity: u32,
    pub company_id: Uuid,
    /// Fallback tier when the company has no effective price list.
    #[serde(default)]
    pub tier: Option<PricingTier>,
    #[serde(default)]
    pub order_type: Option<OrderType>,
    #[serde(default)]
    pub order_total: Option<f64>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/pricing/calculate
/// Resolve the company's price list and run one line through the engine.
pub async fn calculate_price(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Json(req): Json<CalculatePriceRequest>,
) -> Result<Json<PriceCalculation>, AppError> {
    if req.msrp <= 0.0 || !req.msrp.is_finite() {
        return Err(AppError::Validation("msrp must be a positive amount".to_string()));
    }
    if req.quantity == 0 {
        return Err(AppError::Validation("quantity must be at least 1".to_string()));
    }
    if session.actor.role == Role::Retailer && session.company_id != Some(req.company_id) {
        return Err(AppError::Forbidden(
            "retailers may only price for their own company".to_string(),
        ));
    }

    // The demo's fake persistence: an admin-set product override can
    // replace the submitted MSRP.
    let mut msrp = req.msrp;
    if let Some(value) = state
        .overrides
        .get(namespaces::PRODUCT, &req.product_id.to_string())
        .await?
    {
        if let Some(overridden) = value.get("msrp").and_then(|m| m.as_f64()) {
            tracing::debug!(product = %req.product_id, msrp = overridden, "applying msrp override");
            msrp = overridden;
        }
    }

    let price_list = state
        .price_book
        .resolve_for_company(req.company_id, Utc::now())
        .await;

    let calc = state.engine.calculate(
        &PriceInput {
            product_id: req.product_id,
            msrp,
            quantity: req.quantity,
            company_id: req.company_id,
            tier: req.tier.unwrap_or_default(),
            order_type: req.order_type.unwrap_or_default(),
            order_total: req.order_total,
        },
        price_list.as_ref(),
    )?;

    Ok(Json(calc))
}
