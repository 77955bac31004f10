use crate::constants::{HEALTH_RECENT_SNAPSHOTS, HEALTH_SLOW_RESPONSE_MS};
use crate::models::{status_label, MetricsSnapshot};
use crate::store::AccountStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

/// Newest snapshot for every account, newest first. On equal timestamps the
/// first row seen wins.
pub fn latest_per_account(snapshots: &[MetricsSnapshot]) -> Vec<MetricsSnapshot> {
    let mut latest: HashMap<&str, &MetricsSnapshot> = HashMap::new();

    for snapshot in snapshots {
        let newer = latest
            .get(snapshot.account_id.as_str())
            .map_or(true, |existing| snapshot.snapshot_time > existing.snapshot_time);
        if newer {
            latest.insert(snapshot.account_id.as_str(), snapshot);
        }
    }

    let mut accounts: Vec<MetricsSnapshot> = latest.into_values().cloned().collect();
    accounts.sort_by(|a, b| {
        b.snapshot_time
            .cmp(&a.snapshot_time)
            .then_with(|| a.account_id.cmp(&b.account_id))
    });
    accounts
}

#[derive(Debug, Serialize)]
pub struct AccountView {
    pub account_id: String,
    pub status: &'static str,
    pub is_suspended: bool,
    pub spend_today: f64,
    pub daily_limit_display: f64,
    pub spend_progress_percent: Option<String>,
    pub cpc: f64,
    pub outbound_clicks: i64,
    pub active_ads_count: i32,
    pub total_ads_count: i32,
    pub account_balance: f64,
    pub snapshot_time: DateTime<Utc>,
}

impl From<&MetricsSnapshot> for AccountView {
    fn from(s: &MetricsSnapshot) -> Self {
        Self {
            account_id: s.account_id.clone(),
            status: status_label(s.account_status),
            is_suspended: s.is_suspended(),
            spend_today: s.spend_today,
            daily_limit_display: s.daily_limit_display,
            spend_progress_percent: s.spend_progress_percent.clone(),
            cpc: s.cpc,
            outbound_clicks: s.outbound_clicks,
            active_ads_count: s.active_ads_count,
            total_ads_count: s.total_ads_count,
            account_balance: s.account_balance,
            snapshot_time: s.snapshot_time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub response_time_ms: i64,
    pub database_ok: bool,
    pub simulation_mode: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub accounts_monitored: i32,
    /// Share of accounts not suspended on the last run, in whole percent.
    pub success_rate: i64,
}

pub fn classify(database_ok: bool, response_time_ms: i64) -> HealthStatus {
    if !database_ok {
        HealthStatus::Unhealthy
    } else if response_time_ms > HEALTH_SLOW_RESPONSE_MS {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

pub async fn check_health<S: AccountStore + ?Sized>(store: &S) -> HealthReport {
    let started = Instant::now();
    let mut database_ok = true;
    let mut simulation_mode = false;
    let mut last_sync = None;
    let mut accounts_monitored = 0;
    let mut success_rate = 100;

    match store.simulation_config().await {
        Ok(config) => {
            simulation_mode = config.simulation_mode;
            last_sync = config.last_update;
            accounts_monitored = config.accounts_count;
            success_rate = ((1.0 - config.suspension_rate) * 100.0).round() as i64;
        }
        Err(e) => {
            log::error!("Health check: config read failed: {}", e);
            database_ok = false;
        }
    }

    if let Err(e) = store.recent_snapshots(HEALTH_RECENT_SNAPSHOTS).await {
        log::error!("Health check: metrics read failed: {}", e);
        database_ok = false;
    }

    let response_time_ms = started.elapsed().as_millis() as i64;

    HealthReport {
        status: classify(database_ok, response_time_ms),
        timestamp: Utc::now(),
        response_time_ms,
        database_ok,
        simulation_mode,
        last_sync,
        accounts_monitored,
        success_rate,
    }
}
