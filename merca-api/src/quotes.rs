use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{Duration, Utc};
use merca_core::identity::Role;
use merca_order::Order;
use merca_pricing::OrderType;
use merca_quote::{Quote, QuoteLine, QuoteStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::AuthSession;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateQuoteRequest {
    pub company_id: Uuid,
    #[serde(default)]
    pub order_type: Option<OrderType>,
    pub items: Vec<QuoteLine>,
    /// Days the quote stays open; defaults to the configured validity.
    #[serde(default)]
    pub valid_days: Option<i64>,
}

/// PATCH body: exactly one of `status`, `action`, or `revision`.
#[derive(Debug, Deserialize)]
pub struct UpdateQuoteRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub revision: Option<RevisionRequest>,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RevisionRequest {
    pub items: Vec<QuoteLine>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuotesQuery {
    #[serde(default)]
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ConvertQuoteResponse {
    pub quote: Quote,
    pub order: Order,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/quotes
/// Create a draft quote, priced against the company's effective list.
pub async fn create_quote(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Json(req): Json<CreateQuoteRequest>,
) -> Result<Json<Quote>, AppError> {
    let price_list = state
        .price_book
        .resolve_for_company(req.company_id, Utc::now())
        .await;
    let valid_for = Duration::days(req.valid_days.unwrap_or(state.rules.quote_validity_days));

    let quote = state
        .quotes
        .create_quote(
            &session.actor,
            req.company_id,
            req.order_type.unwrap_or_default(),
            req.items,
            &state.engine,
            price_list.as_ref(),
            valid_for,
            state.rules.default_currency.clone(),
        )
        .await?;
    Ok(Json(quote))
}

/// GET /v1/quotes
/// Staff see everything (optionally filtered); retailers see their own
/// company only.
pub async fn list_quotes(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Query(query): Query<ListQuotesQuery>,
) -> Result<Json<Vec<Quote>>, AppError> {
    let quotes = if session.actor.role == Role::Retailer {
        let company_id = session.company_id.ok_or_else(|| {
            AppError::Forbidden("retailer session has no company".to_string())
        })?;
        state.quotes.list_for_company(company_id).await?
    } else if let Some(company_id) = query.company_id {
        state.quotes.list_for_company(company_id).await?
    } else {
        state.quotes.list_quotes().await?
    };
    Ok(Json(quotes))
}

/// GET /v1/quotes/{id}
/// A retailer opening a SENT quote marks it VIEWED as a side effect.
pub async fn get_quote(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<Uuid>,
) -> Result<Json<Quote>, AppError> {
    let quote = state.quotes.get_quote(id).await?;
    check_company_scope(&session, &quote)?;

    let quote = state.quotes.mark_viewed(id, &session.actor).await?;
    Ok(Json(quote))
}

/// PATCH /v1/quotes/{id}
pub async fn update_quote(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateQuoteRequest>,
) -> Result<Json<Quote>, AppError> {
    let quote = state.quotes.get_quote(id).await?;
    check_company_scope(&session, &quote)?;

    let selectors =
        req.status.is_some() as u8 + req.action.is_some() as u8 + req.revision.is_some() as u8;
    if selectors != 1 {
        return Err(AppError::Validation(
            "provide exactly one of status, action, or revision".to_string(),
        ));
    }

    if let Some(revision) = req.revision {
        let price_list = state
            .price_book
            .resolve_for_company(quote.company_id, Utc::now())
            .await;
        let quote = state
            .quotes
            .revise(
                id,
                &session.actor,
                revision.items,
                revision.reason,
                &state.engine,
                price_list.as_ref(),
            )
            .await?;
        return Ok(Json(quote));
    }

    let new_status = if let Some(action) = req.action {
        status_for_action(&action)?
    } else {
        req.status
            .as_deref()
            .unwrap_or_default()
            .parse::<QuoteStatus>()
            .map_err(AppError::Validation)?
    };

    let quote = state
        .quotes
        .update_status(id, new_status, &session.actor, req.details)
        .await?;
    Ok(Json(quote))
}

/// POST /v1/quotes/{id}/convert
/// Turn an accepted quote into an order.
pub async fn convert_quote(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConvertQuoteResponse>, AppError> {
    let (quote, order) = state.quotes.convert_to_order(id, &session.actor).await?;
    Ok(Json(ConvertQuoteResponse { quote, order }))
}

fn status_for_action(action: &str) -> Result<QuoteStatus, AppError> {
    match action {
        "send" => Ok(QuoteStatus::Sent),
        "accept" => Ok(QuoteStatus::Accepted),
        "reject" => Ok(QuoteStatus::Rejected),
        "cancel" => Ok(QuoteStatus::Cancelled),
        _ => Err(AppError::Validation(format!(
            "unknown action: {}. Use send, accept, reject, or cancel",
            action
        ))),
    }
}

fn check_company_scope(session: &AuthSession, quote: &Quote) -> Result<(), AppError> {
    if session.actor.role == Role::Retailer && session.company_id != Some(quote.company_id) {
        return Err(AppError::Forbidden(
            "quote belongs to a different company".to_string(),
        ));
    }
    Ok(())
}
