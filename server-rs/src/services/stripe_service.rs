use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

use crate::config::StripeConfig;
use crate::error::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

/// Verifies Stripe webhook deliveries. Subscription state is the only thing
/// this service learns from Stripe.
#[derive(Clone)]
pub struct StripeWebhooks {
    webhook_secret: String,
}

impl StripeWebhooks {
    pub fn new(config: &StripeConfig) -> Option<Self> {
        if config.webhook_secret.is_empty() {
            return None;
        }
        Some(Self {
            webhook_secret: config.webhook_secret.clone(),
        })
    }

    pub fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> AppResult<Value> {
        self.verify_at(payload, signature_header, chrono::Utc::now().timestamp())
    }

    fn verify_at(&self, payload: &[u8], signature_header: &str, now: i64) -> AppResult<Value> {
        // Parse Stripe signature header: t=timestamp,v1=signature
        let mut timestamp = "";
        let mut sig = "";
        for part in signature_header.split(',') {
            let mut kv = part.splitn(2, '=');
            match kv.next() {
                Some("t") => timestamp = kv.next().unwrap_or(""),
                Some("v1") => sig = kv.next().unwrap_or(""),
                _ => {}
            }
        }

        if timestamp.is_empty() || sig.is_empty() {
            return Err(AppError::Validation("Invalid Stripe signature".into()));
        }

        let expected = self.sign(timestamp, payload)?;
        if expected != sig {
            return Err(AppError::Validation(
                "Webhook signature verification failed".into(),
            ));
        }

        let ts: i64 = timestamp.parse().unwrap_or(0);
        if (now - ts).abs() > TIMESTAMP_TOLERANCE_SECS {
            return Err(AppError::Validation("Webhook timestamp too old".into()));
        }

        serde_json::from_slice(payload)
            .map_err(|e| AppError::Validation(format!("Invalid webhook payload: {}", e)))
    }

    fn sign(&self, timestamp: &str, payload: &[u8]) -> AppResult<String> {
        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|_| AppError::Internal("HMAC key error".into()))?;
        mac.update(signed_payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn webhooks() -> StripeWebhooks {
        StripeWebhooks::new(&StripeConfig {
            webhook_secret: "whsec_test".into(),
        })
        .unwrap()
    }

    const PAYLOAD: &[u8] = br#"{"id":"evt_1","type":"customer.subscription.updated"}"#;

    #[test]
    fn accepts_correctly_signed_payload() {
        let hooks = webhooks();
        let sig = hooks.sign("1000", PAYLOAD).unwrap();
        let event = hooks
            .verify_at(PAYLOAD, &format!("t=1000,v1={sig}"), 1100)
            .unwrap();
        assert_eq!(event["type"], "customer.subscription.updated");
    }

    #[test]
    fn rejects_tampered_or_stale_payload() {
        let hooks = webhooks();
        let sig = hooks.sign("1000", PAYLOAD).unwrap();
        let header = format!("t=1000,v1={sig}");
        assert!(hooks.verify_at(br#"{"id":"evt_2"}"#, &header, 1000).is_err());
        assert!(hooks.verify_at(PAYLOAD, &header, 1000 + 301).is_err());
        assert!(hooks.verify_at(PAYLOAD, "garbage", 1000).is_err());
    }

    #[test]
    fn disabled_without_secret() {
        assert!(StripeWebhooks::new(&StripeConfig {
            webhook_secret: String::new()
        })
        .is_none());
    }
}
