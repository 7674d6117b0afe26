use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    Card,
    Upi,
    NetBanking,
    Wallet,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Card,
        PaymentMethod::Upi,
        PaymentMethod::NetBanking,
        PaymentMethod::Wallet,
    ];

    /// Only card payments are wired to settlement; the rest are placeholders.
    pub fn is_live(&self) -> bool {
        matches!(self, PaymentMethod::Card)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Processing,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub session_id: Uuid,
    pub amount: f64,
    pub currency: String,
    pub method: PaymentMethod,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettlementReceipt {
    pub reference: String, // Gateway's reference (e.g., sim_1a2b3c)
    pub amount: f64,
    pub currency: String,
    pub status: PaymentStatus,
    pub settled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum PaymentError {
    #[error("Payment declined: {0}")]
    Declined(String),
    #[error("Payment gateway unavailable: {0}")]
    GatewayUnavailable(String),
    #[error("Payment gateway did not answer within {0} ms")]
    Timeout(u64),
}

impl PaymentError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, PaymentError::Declined(_))
    }
}

/// Settlement capability. The workflow only looks at the outcome.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn submit_payment(&self, request: &PaymentRequest) -> Result<SettlementReceipt, PaymentError>;
}
