//! Premium status, manual tier switches, and the Razorpay checkout flow.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResult, AppState};
use crate::crm::premium::{self, PremiumStatus, Subscription};
use crate::crm::types::Tier;

fn parse_tier(raw: &str) -> Result<Tier, ApiError> {
    raw.trim().parse::<Tier>().map_err(ApiError::BadRequest)
}

/// A tier that can be bought.
fn purchasable(raw: &str) -> Result<Tier, ApiError> {
    match parse_tier(raw)? {
        Tier::Free => Err(ApiError::BadRequest(
            "Invalid plan: the free plan cannot be purchased".into(),
        )),
        tier => Ok(tier),
    }
}

pub async fn premium_status(State(state): State<AppState>) -> ApiResult<PremiumStatus> {
    let now = state.now();
    let status = state.with_db(move |conn| premium::status(conn, now)).await?;
    Ok(Json(status))
}

#[derive(Debug, Deserialize)]
pub struct UpgradeQuery {
    pub tier: String,
}

pub async fn upgrade(
    State(state): State<AppState>,
    Query(query): Query<UpgradeQuery>,
) -> ApiResult<serde_json::Value> {
    let tier = parse_tier(&query.tier)?;
    let now = state.now();
    let sub = state
        .with_db(move |conn| premium::upgrade(conn, tier, now))
        .await?;
    Ok(Json(serde_json::json!({
        "message": format!("Switched to {}", premium::plan(sub.plan_id).name),
        "tier": sub.plan_id,
    })))
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderQuery {
    pub plan_id: String,
}

#[derive(Debug, Serialize)]
pub struct OrderCreated {
    pub order_id: String,
    pub amount: u64,
    pub currency: String,
    pub plan_id: Tier,
    pub plan_name: &'static str,
    pub razorpay_key_id: String,
    pub test_mode: bool,
}

pub async fn create_order(
    State(state): State<AppState>,
    Query(query): Query<CreateOrderQuery>,
) -> ApiResult<OrderCreated> {
    let tier = purchasable(&query.plan_id)?;
    let plan = premium::plan(tier);
    let currency = state.config.payment.currency.clone();
    let test_mode = state.payments.test_mode();

    let receipt = format!("touch_{}_{}", tier.as_str(), state.now().timestamp());
    let order = state
        .payments
        .create_order(plan.amount, &currency, &receipt)
        .await?;

    let now = state.now();
    let (order_id, amount, order_currency) = (order.id.clone(), order.amount, order.currency.clone());
    state
        .with_db(move |conn| {
            premium::record_order(conn, &order_id, tier, amount, &order_currency, test_mode, now)
        })
        .await?;

    Ok(Json(OrderCreated {
        order_id: order.id,
        amount: order.amount,
        currency: order.currency,
        plan_id: tier,
        plan_name: plan.name,
        razorpay_key_id: state.payments.key_id().to_string(),
        test_mode,
    }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    pub plan_id: String,
}

pub async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> ApiResult<serde_json::Value> {
    let tier = purchasable(&query.plan_id)?;

    let signature_ok = state.payments.verify_signature(
        &query.razorpay_order_id,
        &query.razorpay_payment_id,
        &query.razorpay_signature,
    );
    if !signature_ok {
        tracing::warn!(order_id = %query.razorpay_order_id, "payment signature mismatch");
        return Err(ApiError::BadRequest("Payment verification failed".into()));
    }

    let now = state.now();
    let days = state.config.payment.subscription_days;
    let test_mode = state.payments.test_mode();
    let VerifyQuery {
        razorpay_order_id: order_id,
        razorpay_payment_id: payment_id,
        ..
    } = query;

    let sub = state
        .with_db(move |conn| {
            let order = premium::get_order(conn, &order_id)?;
            if order.plan_id != tier {
                return Err(crate::crm::CrmError::Invalid(format!(
                    "order {order_id} is for the {} plan",
                    order.plan_id
                )));
            }
            premium::activate_subscription(conn, &order, &payment_id, days, now)
        })
        .await?;

    let message = if test_mode {
        "Payment verified in test mode; subscription activated"
    } else {
        "Payment verified; subscription activated"
    };
    Ok(Json(serde_json::json!({
        "verified": true,
        "plan_id": sub.plan_id,
        "message": message,
        "subscription": sub,
    })))
}

pub async fn subscription(State(state): State<AppState>) -> ApiResult<Subscription> {
    let now = state.now();
    let sub = state
        .with_db(move |conn| premium::get_subscription(conn, now))
        .await?;
    Ok(Json(sub))
}

pub async fn cancel(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    let now = state.now();
    let sub = state
        .with_db(move |conn| premium::cancel_subscription(conn, now))
        .await?;
    Ok(Json(serde_json::json!({
        "message": "Subscription cancelled",
        "plan_id": sub.plan_id,
    })))
}
