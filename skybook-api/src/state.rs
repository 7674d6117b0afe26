use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;
use skybook_catalog::PricingEngine;
use skybook_core::payment::PaymentGateway;
use skybook_order::{BookingWorkflow, PaymentOrchestrator, RetryPolicy, SimulatedGateway};
use skybook_store::{Config, MemorySessionStore};
use crate::error::AppError;

pub type VisitorWorkflow = BookingWorkflow<MemorySessionStore>;
pub type SharedWorkflow = Arc<Mutex<VisitorWorkflow>>;

pub struct SessionEntry {
    pub workflow: SharedWorkflow,
    pub last_seen: Instant,
}

/// Visitor sessions live only as long as the process, and only while they are in use.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let delay = Duration::from_millis(config.payment.settlement_delay_ms);
        Self::with_gateway(config, Arc::new(SimulatedGateway::new(delay)))
    }

    pub fn with_gateway(config: Config, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            gateway,
            config: Arc::new(config),
        }
    }

    pub async fn create_session(&self) -> Result<Uuid, AppError> {
        let payments = PaymentOrchestrator::new(self.gateway.clone(), RetryPolicy::from(&self.config.payment));
        let workflow = BookingWorkflow::new(
            MemorySessionStore::new(),
            PricingEngine::new(self.config.pricing()),
            payments,
        )
        .with_max_passengers(self.config.business_rules.max_passengers);
        let id = workflow.id();

        let mut sessions = self.sessions.write().await;
        let ttl = self.idle_ttl();
        sessions.retain(|_, entry| entry.last_seen.elapsed() < ttl);
        if sessions.len() >= self.config.sessions.max_sessions {
            tracing::warn!("Session limit of {} reached", self.config.sessions.max_sessions);
            return Err(AppError::CapacityError("Too many active sessions".to_string()));
        }

        sessions.insert(
            id,
            SessionEntry {
                workflow: Arc::new(Mutex::new(workflow)),
                last_seen: Instant::now(),
            },
        );
        Ok(id)
    }

    /// Looks a session up and marks it as used.
    pub async fn session(&self, id: Uuid) -> Result<SharedWorkflow, AppError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFoundError(format!("Session {} not found", id)))?;
        entry.last_seen = Instant::now();
        Ok(entry.workflow.clone())
    }

    pub async fn remove_session(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFoundError(format!("Session {} not found", id)))
    }

    /// Drops every session idle for longer than the configured TTL.
    pub async fn sweep_idle(&self) -> usize {
        let ttl = self.idle_ttl();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() < ttl);
        let swept = before - sessions.len();
        if swept > 0 {
            tracing::info!("Swept {} idle session(s), {} remain", swept, sessions.len());
        }
        swept
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.config.sessions.idle_ttl_secs)
    }
}
