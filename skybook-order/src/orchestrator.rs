use skybook_core::payment::{PaymentError, PaymentGateway, PaymentRequest, PaymentStatus, SettlementReceipt};
use skybook_store::app_config::PaymentSettings;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub timeout: Duration,
    pub backoff: Duration,
}

impl From<&PaymentSettings> for RetryPolicy {
    fn from(settings: &PaymentSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            timeout: Duration::from_millis(settings.timeout_ms),
            backoff: Duration::from_millis(250),
        }
    }
}

/// The one place settlement crosses an async boundary. Dropping the returned
/// future cancels the attempt in flight.
pub struct PaymentOrchestrator {
    gateway: Arc<dyn PaymentGateway>,
    policy: RetryPolicy,
}

impl PaymentOrchestrator {
    pub fn new(gateway: Arc<dyn PaymentGateway>, policy: RetryPolicy) -> Self {
        Self { gateway, policy }
    }

    pub async fn settle(&self, request: &PaymentRequest) -> Result<SettlementReceipt, PaymentError> {
        let mut attempt = 1;
        loop {
            let outcome = match tokio::time::timeout(self.policy.timeout, self.gateway.submit_payment(request)).await {
                Ok(result) => result,
                Err(_) => Err(PaymentError::Timeout(self.policy.timeout.as_millis() as u64)),
            };

            match outcome {
                Ok(receipt) => {
                    info!(
                        "Session {} settled {} {} (ref {}) on attempt {}",
                        request.session_id, receipt.amount, receipt.currency, receipt.reference, attempt
                    );
                    return Ok(receipt);
                }
                Err(e) if e.is_retryable() && attempt < self.policy.max_attempts => {
                    warn!("Settlement attempt {} for session {} failed: {}", attempt, request.session_id, e);
                    attempt += 1;
                    tokio::time::sleep(self.policy.backoff).await;
                }
                Err(e) => {
                    warn!("Settlement for session {} gave up: {}", request.session_id, e);
                    return Err(e);
                }
            }
        }
    }
}

/// Stand-in gateway: waits, then always succeeds.
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait::async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn submit_payment(&self, request: &PaymentRequest) -> Result<SettlementReceipt, PaymentError> {
        tokio::time::sleep(self.delay).await;
        Ok(SettlementReceipt {
            reference: format!("sim_{}", &Uuid::new_v4().simple().to_string()[..12]),
            amount: request.amount,
            currency: request.currency.clone(),
            status: PaymentStatus::Succeeded,
            settled_at: chrono::Utc::now(),
        })
    }
}
