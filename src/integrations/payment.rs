//! Razorpay orders and payment-signature checks.
//!
//! With the placeholder key id (or no secret) the gateway runs in test mode:
//! orders are minted locally and every signature is accepted.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::{http_client, IntegrationError};
use crate::config::PaymentConfig;

const SERVICE: &str = "payment gateway";

type HmacSha256 = Hmac<Sha256>;

/// An order as acknowledged by the gateway.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Public key id the client-side checkout needs.
    fn key_id(&self) -> &str;
    fn test_mode(&self) -> bool;
    async fn create_order(
        &self,
        amount: u64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, IntegrationError>;
    /// Check the checkout callback signature for `order_id|payment_id`.
    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;
}

pub struct Razorpay {
    client: reqwest::Client,
    api_base: String,
    key_id: String,
    key_secret: String,
    test_mode: bool,
}

impl Razorpay {
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            client: http_client(30),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            test_mode: config.test_mode(),
        }
    }
}

#[derive(Serialize)]
struct OrderRequest<'a> {
    amount: u64,
    currency: &'a str,
    receipt: &'a str,
}

/// MAC over `order_id|payment_id`; `None` if the key is rejected.
fn order_mac(secret: &str, order_id: &str, payment_id: &str) -> Option<HmacSha256> {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return None;
    };
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    Some(mac)
}

/// Hex HMAC-SHA256 of `order_id|payment_id`, as the checkout computes it.
pub fn sign(secret: &str, order_id: &str, payment_id: &str) -> Option<String> {
    let mac = order_mac(secret, order_id, payment_id)?;
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a hex signature.
pub fn signature_matches(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    order_mac(secret, order_id, payment_id).is_some_and(|mac| mac.verify_slice(&expected).is_ok())
}

#[async_trait]
impl PaymentGateway for Razorpay {
    fn key_id(&self) -> &str {
        &self.key_id
    }

    fn test_mode(&self) -> bool {
        self.test_mode
    }

    async fn create_order(
        &self,
        amount: u64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, IntegrationError> {
        if self.test_mode {
            let id = format!("order_test_{}", uuid::Uuid::now_v7().simple());
            tracing::debug!(order_id = %id, "test-mode order minted locally");
            return Ok(GatewayOrder {
                id,
                amount,
                currency: currency.to_string(),
            });
        }

        let response = self
            .client
            .post(format!("{}/orders", self.api_base))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&OrderRequest {
                amount,
                currency,
                receipt,
            })
            .send()
            .await
            .map_err(|e| IntegrationError::unavailable(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(%status, %detail, "order creation failed");
            return Err(IntegrationError::unavailable(SERVICE, format!("HTTP {status}")));
        }

        response
            .json::<GatewayOrder>()
            .await
            .map_err(|e| IntegrationError::unusable(SERVICE, e))
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        if self.test_mode {
            return true;
        }
        signature_matches(&self.key_secret, order_id, payment_id, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PLACEHOLDER_KEY_ID;

    fn live_config() -> PaymentConfig {
        PaymentConfig {
            key_id: "rzp_live_abc".into(),
            key_secret: "s3cret".into(),
            ..PaymentConfig::default()
        }
    }

    #[test]
    fn signature_round_trip() {
        let sig = sign("s3cret", "order_1", "pay_1").unwrap();
        assert_eq!(sig.len(), 64);
        assert!(signature_matches("s3cret", "order_1", "pay_1", &sig));
        assert!(!signature_matches("s3cret", "order_1", "pay_2", &sig));
        assert!(!signature_matches("other", "order_1", "pay_1", &sig));
        assert!(!signature_matches("s3cret", "order_1", "pay_1", "not-hex"));
    }

    #[test]
    fn live_gateway_checks_signatures() {
        let gateway = Razorpay::new(&live_config());
        assert!(!gateway.test_mode());
        let sig = sign("s3cret", "order_1", "pay_1").unwrap();
        assert!(gateway.verify_signature("order_1", "pay_1", &sig));
        assert!(!gateway.verify_signature("order_1", "pay_1", "test_signature"));
    }

    #[test]
    fn signing_accepts_any_key_length() {
        let long_key = "k".repeat(200);
        for secret in ["", "s", long_key.as_str()] {
            let sig = sign(secret, "order_1", "pay_1").unwrap();
            assert_eq!(sig.len(), 64);
            assert!(signature_matches(secret, "order_1", "pay_1", &sig));
        }
    }

    #[tokio::test]
    async fn test_mode_mints_orders_and_accepts_any_signature() {
        let gateway = Razorpay::new(&PaymentConfig::default());
        assert!(gateway.test_mode());
        assert_eq!(gateway.key_id(), PLACEHOLDER_KEY_ID);

        let order = gateway.create_order(49_900, "INR", "plus").await.unwrap();
        assert!(order.id.starts_with("order_test_"));
        assert_eq!(order.amount, 49_900);
        assert!(gateway.verify_signature(&order.id, "pay_x", "test_signature"));
    }
}
