use crate::constants::{
    GROWTH_DECLINING, GROWTH_FAST, GROWTH_NORMAL, GROWTH_SLOW, PACING_DECLINING, PACING_FAST,
    PACING_NORMAL, PACING_SLOW, STATUS_ACTIVE, STATUS_SUSPENDED,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CapGrowthRate {
    Fast,
    Normal,
    Slow,
    Declining,
}

impl CapGrowthRate {
    /// Category-level volatility applied to intraday spend pacing.
    pub fn pacing_multiplier(self) -> f64 {
        match self {
            Self::Fast => PACING_FAST,
            Self::Normal => PACING_NORMAL,
            Self::Slow => PACING_SLOW,
            Self::Declining => PACING_DECLINING,
        }
    }

    /// Day-over-day compounding factor of the spend cap.
    pub fn daily_growth(self) -> f64 {
        match self {
            Self::Fast => GROWTH_FAST,
            Self::Normal => GROWTH_NORMAL,
            Self::Slow => GROWTH_SLOW,
            Self::Declining => GROWTH_DECLINING,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Normal => "normal",
            Self::Slow => "slow",
            Self::Declining => "declining",
        }
    }
}

impl fmt::Display for CapGrowthRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown cap growth rate '{0}'")]
pub struct UnknownGrowthRate(pub String);

impl FromStr for CapGrowthRate {
    type Err = UnknownGrowthRate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "normal" => Ok(Self::Normal),
            "slow" => Ok(Self::Slow),
            "declining" => Ok(Self::Declining),
            other => Err(UnknownGrowthRate(other.to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Suspended,
}

impl AccountStatus {
    pub fn code(self) -> i32 {
        match self {
            Self::Active => STATUS_ACTIVE,
            Self::Suspended => STATUS_SUSPENDED,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            STATUS_ACTIVE => Some(Self::Active),
            STATUS_SUSPENDED => Some(Self::Suspended),
            _ => None,
        }
    }

    pub fn is_suspended(self) -> bool {
        self == Self::Suspended
    }
}

/// Display label for a raw ad-platform status code.
pub fn status_label(code: i32) -> &'static str {
    match code {
        1 => "ACTIVE",
        2 => "PENDING_REVIEW",
        3 => "PENDING_ID_VERIFICATION",
        7 => "AD_PAUSED",
        9 => "IN_GRACE_PERIOD",
        100 => "SUSPENDED",
        _ => "UNKNOWN",
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccountDefinition {
    pub account_id: String,
    pub vendor_name: String,
    pub initial_cap_cents: i64,
    pub cap_growth_rate: CapGrowthRate,
    pub base_cpc: f64,
    pub suspension_probability: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub account_id: String,
    pub snapshot_time: DateTime<Utc>,
    pub daily_spend_limit: i64,
    pub spend_cap: i64,
    pub amount_spent: i64,
    pub spend_today: f64,
    pub daily_limit_display: f64,
    pub spend_progress_percent: Option<String>,
    pub cpc: f64,
    pub outbound_clicks: i64,
    pub active_ads_count: i32,
    pub total_ads_count: i32,
    pub account_balance: f64,
    pub account_status: i32,
    pub cap_source: String,
}

impl MetricsSnapshot {
    pub fn is_suspended(&self) -> bool {
        self.account_status == STATUS_SUSPENDED
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SimulationConfig {
    pub id: i32,
    pub simulation_mode: bool,
    pub update_interval: i32,
    pub last_update: Option<DateTime<Utc>>,
    pub accounts_count: i32,
    pub suspension_rate: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RunSummary {
    pub last_run_time: DateTime<Utc>,
    pub accounts_count: i32,
    pub suspension_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_rate_parses_case_insensitively() {
        assert_eq!("Fast".parse::<CapGrowthRate>(), Ok(CapGrowthRate::Fast));
        assert_eq!(" declining ".parse::<CapGrowthRate>(), Ok(CapGrowthRate::Declining));
        assert_eq!(
            "exploding".parse::<CapGrowthRate>().unwrap_err().to_string(),
            "unknown cap growth rate 'exploding'"
        );
        assert_eq!(CapGrowthRate::Slow.to_string(), "slow");
    }

    #[test]
    fn status_codes_round_trip() {
        assert_eq!(AccountStatus::from_code(1), Some(AccountStatus::Active));
        assert_eq!(AccountStatus::from_code(100), Some(AccountStatus::Suspended));
        assert_eq!(AccountStatus::from_code(7), None);
        assert_eq!(status_label(7), "AD_PAUSED");
        assert_eq!(status_label(42), "UNKNOWN");
    }
}
