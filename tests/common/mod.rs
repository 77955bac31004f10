#![allow(dead_code)]

use ad_metrics_simulator::models::{AccountDefinition, CapGrowthRate};
use ad_metrics_simulator::rng::RandomSource;
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};

/// Replays a fixed list of draws, wrapping around at the end.
pub struct ScriptedRng {
    draws: Vec<f64>,
    next: usize,
}

impl ScriptedRng {
    pub fn new(draws: &[f64]) -> Self {
        Self {
            draws: draws.to_vec(),
            next: 0,
        }
    }
}

impl RandomSource for ScriptedRng {
    fn next_f64(&mut self) -> f64 {
        let value = self.draws[self.next % self.draws.len()];
        self.next += 1;
        value
    }
}

pub fn now_at(hour: u32, minute: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .expect("offset")
        .with_ymd_and_hms(2024, 6, 15, hour, minute, 0)
        .unwrap()
}

pub fn account(id: &str, rate: CapGrowthRate, created_days_ago: i64, now: DateTime<FixedOffset>) -> AccountDefinition {
    AccountDefinition {
        account_id: id.to_string(),
        vendor_name: format!("Vendor {id}"),
        initial_cap_cents: 25_000,
        cap_growth_rate: rate,
        base_cpc: 0.75,
        suspension_probability: 0.0,
        created_at: now.with_timezone(&Utc) - Duration::days(created_days_ago),
    }
}
