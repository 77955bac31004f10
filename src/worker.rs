use crate::models::{MetricsSnapshot, RunSummary};
use crate::rng::RandomSource;
use crate::store::{AccountStore, StoreError};
use crate::synth::synthesize_snapshot;
use chrono::{DateTime, FixedOffset, Local, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::{self, Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    UpstreamReadFailure,
    UpstreamWriteFailure,
    SummaryWriteFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UpstreamReadFailure => "UpstreamReadFailure",
            Self::UpstreamWriteFailure => "UpstreamWriteFailure",
            Self::SummaryWriteFailure => "SummaryWriteFailure",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Failed to read simulation inputs: {0}")]
    UpstreamRead(#[source] StoreError),
    #[error("Failed to store simulated metrics: {0}")]
    UpstreamWrite(#[source] StoreError),
    #[error("Stored {snapshots} snapshots but failed to update run summary: {source}")]
    SummaryWrite {
        snapshots: usize,
        #[source]
        source: StoreError,
    },
}

impl SimulationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UpstreamRead(_) => ErrorKind::UpstreamReadFailure,
            Self::UpstreamWrite(_) => ErrorKind::UpstreamWriteFailure,
            Self::SummaryWrite { .. } => ErrorKind::SummaryWriteFailure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub accounts_processed: usize,
    pub metrics_generated: usize,
    pub suspension_rate: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Simulation mode is switched off in `simulation_config`.
    Disabled,
    Completed(RunReport),
}

pub fn suspension_rate(snapshots: &[MetricsSnapshot]) -> f64 {
    if snapshots.is_empty() {
        return 0.0;
    }
    let suspended = snapshots.iter().filter(|s| s.is_suspended()).count();
    suspended as f64 / snapshots.len() as f64
}

pub struct SimulationWorker<S, R> {
    store: Arc<S>,
    rng: Mutex<R>,
}

impl<S, R> SimulationWorker<S, R>
where
    S: AccountStore,
    R: RandomSource + Send,
{
    pub fn new(store: Arc<S>, rng: R) -> Self {
        Self {
            store,
            rng: Mutex::new(rng),
        }
    }

    pub async fn run_once(&self) -> Result<RunOutcome, SimulationError> {
        self.run_at(Local::now().fixed_offset()).await
    }

    /// One simulation pass with a single timestamp shared by every account.
    pub async fn run_at(&self, now: DateTime<FixedOffset>) -> Result<RunOutcome, SimulationError> {
        let config = self
            .store
            .simulation_config()
            .await
            .map_err(SimulationError::UpstreamRead)?;

        if !config.simulation_mode {
            log::info!("Simulation mode is disabled, skipping run");
            return Ok(RunOutcome::Disabled);
        }

        let accounts = self
            .store
            .list_account_definitions()
            .await
            .map_err(SimulationError::UpstreamRead)?;

        let timestamp = now.with_timezone(&Utc);

        if accounts.is_empty() {
            log::info!("No mock accounts found to simulate");
            return Ok(RunOutcome::Completed(RunReport {
                accounts_processed: 0,
                metrics_generated: 0,
                suspension_rate: 0.0,
                timestamp,
            }));
        }

        log::info!("Simulating metrics for {} accounts", accounts.len());

        let snapshots: Vec<MetricsSnapshot> = {
            let mut rng = self.rng.lock().await;
            accounts
                .iter()
                .map(|account| synthesize_snapshot(account, &now, &mut *rng))
                .collect()
        };

        for snapshot in &snapshots {
            log::debug!(
                "account={} status={} spend={} cap={} clicks={}",
                snapshot.account_id,
                snapshot.account_status,
                snapshot.spend_today,
                snapshot.daily_spend_limit,
                snapshot.outbound_clicks
            );
        }

        self.store
            .append_snapshots(&snapshots)
            .await
            .map_err(|e| {
                log::error!("Error inserting simulated metrics: {}", e);
                SimulationError::UpstreamWrite(e)
            })?;

        let rate = suspension_rate(&snapshots);
        let summary = RunSummary {
            last_run_time: timestamp,
            accounts_count: accounts.len() as i32,
            suspension_rate: rate,
        };

        if let Err(e) = self.store.update_run_summary(&summary).await {
            log::error!(
                "Partial failure: {} snapshots stored at {} but run summary was not updated: {}",
                snapshots.len(),
                timestamp,
                e
            );
            return Err(SimulationError::SummaryWrite {
                snapshots: snapshots.len(),
                source: e,
            });
        }

        log::info!(
            "Successfully simulated data for {} accounts (suspension rate {:.2})",
            accounts.len(),
            rate
        );

        Ok(RunOutcome::Completed(RunReport {
            accounts_processed: accounts.len(),
            metrics_generated: snapshots.len(),
            suspension_rate: rate,
            timestamp,
        }))
    }

    pub async fn run(&self, interval: Duration) {
        loop {
            match self.run_once().await {
                Ok(RunOutcome::Completed(report)) => log::debug!("Run finished: {:?}", report),
                Ok(RunOutcome::Disabled) => {}
                Err(e) => log::error!("Simulation run failed ({}): {}", e.kind(), e),
            }

            time::sleep(interval).await;
        }
    }
}
