use crate::constants::SIMULATION_CONFIG_ID;
use crate::models::{AccountDefinition, MetricsSnapshot, RunSummary, SimulationConfig};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database connection error: {0}")]
    Connection(String),
    #[error("Read failed: {0}")]
    Read(String),
    #[error("Write failed: {0}")]
    Write(String),
}

/// Persistence seen by the simulation worker and the dashboard read path.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn simulation_config(&self) -> Result<SimulationConfig, StoreError>;

    async fn list_account_definitions(&self) -> Result<Vec<AccountDefinition>, StoreError>;

    /// Appends the whole batch or nothing.
    async fn append_snapshots(&self, snapshots: &[MetricsSnapshot]) -> Result<(), StoreError>;

    async fn update_run_summary(&self, summary: &RunSummary) -> Result<(), StoreError>;

    /// Newest first.
    async fn recent_snapshots(&self, limit: i64) -> Result<Vec<MetricsSnapshot>, StoreError>;
}

/// In-process store with switchable failures.
pub struct MemoryStore {
    config: Mutex<SimulationConfig>,
    accounts: Mutex<Vec<AccountDefinition>>,
    snapshots: Mutex<Vec<MetricsSnapshot>>,
    pub fail_reads: AtomicBool,
    pub fail_appends: AtomicBool,
    pub fail_summary: AtomicBool,
}

impl MemoryStore {
    pub fn new(accounts: Vec<AccountDefinition>) -> Self {
        Self {
            config: Mutex::new(SimulationConfig {
                id: SIMULATION_CONFIG_ID,
                simulation_mode: true,
                update_interval: 30,
                last_update: None,
                accounts_count: 0,
                suspension_rate: 0.0,
            }),
            accounts: Mutex::new(accounts),
            snapshots: Mutex::new(Vec::new()),
            fail_reads: AtomicBool::new(false),
            fail_appends: AtomicBool::new(false),
            fail_summary: AtomicBool::new(false),
        }
    }

    pub async fn set_simulation_mode(&self, enabled: bool) {
        self.config.lock().await.simulation_mode = enabled;
    }

    pub async fn snapshots(&self) -> Vec<MetricsSnapshot> {
        self.snapshots.lock().await.clone()
    }

    pub async fn config(&self) -> SimulationConfig {
        self.config.lock().await.clone()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn simulation_config(&self) -> Result<SimulationConfig, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Read("simulation_config unavailable".to_string()));
        }
        Ok(self.config.lock().await.clone())
    }

    async fn list_account_definitions(&self) -> Result<Vec<AccountDefinition>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Read("mock_ad_accounts unavailable".to_string()));
        }
        Ok(self.accounts.lock().await.clone())
    }

    async fn append_snapshots(&self, snapshots: &[MetricsSnapshot]) -> Result<(), StoreError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Write("mock_account_metrics insert rejected".to_string()));
        }
        self.snapshots.lock().await.extend_from_slice(snapshots);
        Ok(())
    }

    async fn update_run_summary(&self, summary: &RunSummary) -> Result<(), StoreError> {
        if self.fail_summary.load(Ordering::SeqCst) {
            return Err(StoreError::Write("simulation_config update rejected".to_string()));
        }
        let mut config = self.config.lock().await;
        config.last_update = Some(summary.last_run_time);
        config.accounts_count = summary.accounts_count;
        config.suspension_rate = summary.suspension_rate;
        Ok(())
    }

    async fn recent_snapshots(&self, limit: i64) -> Result<Vec<MetricsSnapshot>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Read("mock_account_metrics unavailable".to_string()));
        }
        let mut rows = self.snapshots.lock().await.clone();
        rows.sort_by(|a, b| b.snapshot_time.cmp(&a.snapshot_time));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }
}
