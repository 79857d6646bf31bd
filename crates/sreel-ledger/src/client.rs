//! Ledger trait and HTTP implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LedgerError, LedgerResult};

/// The three ledger operations the pipeline consumes.
///
/// Charges are allowed to drive a balance negative; the precondition check
/// before job start is the only balance gate. Whether that grace is
/// intentional is a ledger-service policy, not decided here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// Current credit balance for a user.
    async fn balance(&self, user_id: &str) -> LedgerResult<i64>;

    /// Charge credits with a human-readable reason.
    async fn charge(&self, user_id: &str, amount: u32, reason: &str) -> LedgerResult<()>;

    /// Refund credits with a human-readable reason.
    async fn refund(&self, user_id: &str, amount: u32, reason: &str) -> LedgerResult<()>;
}

/// Configuration for the HTTP ledger client.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub api_url: String,
    pub api_key: String,
}

impl LedgerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> LedgerResult<Self> {
        Ok(Self {
            api_url: std::env::var("LEDGER_API_URL")
                .map_err(|_| LedgerError::config_error("LEDGER_API_URL not set"))?,
            api_key: std::env::var("LEDGER_API_KEY")
                .map_err(|_| LedgerError::config_error("LEDGER_API_KEY not set"))?,
        })
    }
}

#[derive(Debug, Serialize)]
struct MovementRequest<'a> {
    user_id: &'a str,
    amount: u32,
    reason: &'a str,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    balance: i64,
}

/// HTTP client for the billing ledger service.
#[derive(Clone)]
pub struct HttpLedger {
    http: reqwest::Client,
    config: LedgerConfig,
}

impl HttpLedger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> LedgerResult<Self> {
        Ok(Self::new(LedgerConfig::from_env()?))
    }

    async fn post_movement(&self, endpoint: &str, body: MovementRequest<'_>) -> LedgerResult<()> {
        let response = self
            .http
            .post(format!("{}/v1/{}", self.config.api_url, endpoint))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(LedgerError::api(status, message.trim().to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CreditLedger for HttpLedger {
    async fn balance(&self, user_id: &str) -> LedgerResult<i64> {
        debug!("Fetching balance for {}", user_id);

        let response = self
            .http
            .get(format!("{}/v1/balance/{}", self.config.api_url, user_id))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(LedgerError::api(status, message.trim().to_string()));
        }

        let parsed: BalanceResponse = response.json().await?;
        Ok(parsed.balance)
    }

    async fn charge(&self, user_id: &str, amount: u32, reason: &str) -> LedgerResult<()> {
        info!("Charging {} credits to {} ({})", amount, user_id, reason);
        self.post_movement(
            "charge",
            MovementRequest {
                user_id,
                amount,
                reason,
            },
        )
        .await
    }

    async fn refund(&self, user_id: &str, amount: u32, reason: &str) -> LedgerResult<()> {
        info!("Refunding {} credits to {} ({})", amount, user_id, reason);
        self.post_movement(
            "refund",
            MovementRequest {
                user_id,
                amount,
                reason,
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_ledger(url: &str) -> HttpLedger {
        HttpLedger::new(LedgerConfig {
            api_url: url.to_string(),
            api_key: "test-key".to_string(),
        })
    }

    #[tokio::test]
    async fn test_balance() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/balance/u1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"balance": 42})),
            )
            .mount(&server)
            .await;

        let ledger = test_ledger(&server.uri());
        assert_eq!(ledger.balance("u1").await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_charge_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/charge"))
            .and(body_json(serde_json::json!({
                "user_id": "u1",
                "amount": 24,
                "reason": "Generate 4 segments + narration"
            })))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let ledger = test_ledger(&server.uri());
        ledger
            .charge("u1", 24, "Generate 4 segments + narration")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        let mut mock = MockCreditLedger::new();
        mock.expect_balance().returning(|_| Ok(50));
        mock.expect_charge()
            .withf(|_, amount, _| *amount == 24)
            .returning(|_, _, _| Ok(()));

        let ledger: &dyn CreditLedger = &mock;
        assert_eq!(ledger.balance("u1").await.unwrap(), 50);
        ledger.charge("u1", 24, "job").await.unwrap();
    }

    #[tokio::test]
    async fn test_refund_error_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/refund"))
            .respond_with(ResponseTemplate::new(409).set_body_string("duplicate refund"))
            .mount(&server)
            .await;

        let ledger = test_ledger(&server.uri());
        let err = ledger.refund("u1", 5, "captions").await.unwrap_err();
        match err {
            LedgerError::Api { status, message } => {
                assert_eq!(status, 409);
                assert!(message.contains("duplicate"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
