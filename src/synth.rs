//! Metrics synthesizer: turns one account definition plus a wall-clock
//! instant into one believable `MetricsSnapshot`.
//!
//! All randomness comes from the caller's `RandomSource`. Per account the
//! draws happen in a fixed order: status, spend jitter, CPC jitter, ad
//! counts, balance.

use crate::constants::{
    ACTIVE_ADS_BASE, ACTIVE_ADS_SPREAD, BALANCE_MAX, BALANCE_MIN, CAP_SOURCE_SIMULATION,
    CPC_JITTER_MAX, CPC_JITTER_MIN, DIURNAL_BREAKPOINTS, INACTIVE_ADS_SPREAD, MINUTES_PER_DAY,
    SEGMENT_MINUTES, SPEND_JITTER_MAX, SPEND_JITTER_MIN, SUSPENDED_TOTAL_ADS_BASE,
    SUSPENDED_TOTAL_ADS_SPREAD,
};
use crate::models::{AccountDefinition, AccountStatus, MetricsSnapshot};
use crate::rng::RandomSource;
use chrono::{DateTime, TimeZone, Timelike, Utc};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceMetrics {
    pub cpc: f64,
    pub outbound_clicks: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdCounts {
    pub active: i32,
    pub total: i32,
}

pub fn minutes_since_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> u32 {
    now.hour() * 60 + now.minute()
}

/// Cumulative share of the daily budget that should be spent by minute `t`.
pub fn diurnal_fraction(t: u32) -> f64 {
    let t = t % MINUTES_PER_DAY;
    let segment = (t / SEGMENT_MINUTES).min(3) as usize;
    let from = DIURNAL_BREAKPOINTS[segment];
    let to = DIURNAL_BREAKPOINTS[segment + 1];
    let offset = (t - segment as u32 * SEGMENT_MINUTES) as f64 / SEGMENT_MINUTES as f64;

    from + (to - from) * offset
}

/// Amount spent so far today, in whole major units.
///
/// Paces against the nominal cap (`initial_cap_cents`), not the compounded
/// one, and is deliberately left unclamped: jitter and the fast pacing
/// multiplier can push it past 100 % of the cap.
pub fn spend_progress<Tz: TimeZone>(
    account: &AccountDefinition,
    now: &DateTime<Tz>,
    rng: &mut impl RandomSource,
) -> f64 {
    let fraction = diurnal_fraction(minutes_since_midnight(now));
    let jitter = rng.uniform(SPEND_JITTER_MIN, SPEND_JITTER_MAX);

    let spend = account.initial_cap_cents as f64 / 100.0
        * fraction
        * account.cap_growth_rate.pacing_multiplier()
        * jitter;

    spend.round().max(0.0)
}

/// Day 1 is the creation day. Creation timestamps in the future also map to day 1.
pub fn day_number(created_at: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let elapsed = (now - created_at).num_milliseconds();
    let whole_days = elapsed.div_euclid(MILLIS_PER_DAY);

    (whole_days + 1).clamp(1, u32::MAX as i64) as u32
}

pub fn daily_cap(account: &AccountDefinition, day_number: u32) -> i64 {
    let exponent = day_number.saturating_sub(1).min(i32::MAX as u32) as i32;
    let growth = account.cap_growth_rate.daily_growth().powi(exponent);

    (account.initial_cap_cents as f64 * growth).round() as i64
}

pub fn sample_status(account: &AccountDefinition, rng: &mut impl RandomSource) -> AccountStatus {
    if rng.chance(account.suspension_probability) {
        AccountStatus::Suspended
    } else {
        AccountStatus::Active
    }
}

pub fn performance_metrics(
    account: &AccountDefinition,
    spend: f64,
    rng: &mut impl RandomSource,
) -> PerformanceMetrics {
    let jitter = rng.uniform(CPC_JITTER_MIN, CPC_JITTER_MAX);
    let cpc = (account.base_cpc * jitter * 100.0).round() / 100.0;

    // A CPC that rounds to zero would divide by zero; report no clicks.
    let outbound_clicks = if spend > 0.0 && cpc > 0.0 {
        (spend / cpc).round() as i64
    } else {
        0
    };

    PerformanceMetrics {
        cpc,
        outbound_clicks,
    }
}

pub fn ad_counts(status: AccountStatus, rng: &mut impl RandomSource) -> AdCounts {
    if status.is_suspended() {
        let total = (SUSPENDED_TOTAL_ADS_BASE + rng.next_f64() * SUSPENDED_TOTAL_ADS_SPREAD).floor();
        return AdCounts {
            active: 0,
            total: total as i32,
        };
    }

    let active = (ACTIVE_ADS_BASE + rng.next_f64() * ACTIVE_ADS_SPREAD).floor() as i32;
    let inactive = (rng.next_f64() * INACTIVE_ADS_SPREAD).floor() as i32;

    AdCounts {
        active,
        total: active + inactive,
    }
}

pub fn account_balance(rng: &mut impl RandomSource) -> f64 {
    rng.uniform(BALANCE_MIN, BALANCE_MAX).round()
}

pub fn spend_progress_percent(spend_today: f64, daily_cap_cents: i64) -> Option<String> {
    if daily_cap_cents == 0 {
        return None;
    }

    let cap_major = daily_cap_cents as f64 / 100.0;
    let percent = spend_today / cap_major * 100.0;
    // ties round up, not to even
    Some(format!("{:.2}", (percent * 100.0).round() / 100.0))
}

pub fn synthesize_snapshot<Tz: TimeZone>(
    account: &AccountDefinition,
    now: &DateTime<Tz>,
    rng: &mut impl RandomSource,
) -> MetricsSnapshot {
    let snapshot_time = now.with_timezone(&Utc);
    let day = day_number(account.created_at, snapshot_time);

    let status = sample_status(account, rng);
    let daily_spend_limit = daily_cap(account, day);
    let spend_today = spend_progress(account, now, rng);
    let performance = performance_metrics(account, spend_today, rng);
    let ads = ad_counts(status, rng);
    let account_balance = account_balance(rng);

    MetricsSnapshot {
        account_id: account.account_id.clone(),
        snapshot_time,
        daily_spend_limit,
        spend_cap: daily_spend_limit,
        amount_spent: (spend_today * 100.0).round() as i64,
        spend_today,
        daily_limit_display: daily_spend_limit as f64 / 100.0,
        spend_progress_percent: spend_progress_percent(spend_today, daily_spend_limit),
        cpc: performance.cpc,
        outbound_clicks: performance.outbound_clicks,
        active_ads_count: ads.active,
        total_ads_count: ads.total,
        account_balance,
        account_status: status.code(),
        cap_source: CAP_SOURCE_SIMULATION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CapGrowthRate;
    use chrono::{Duration, FixedOffset};

    struct Scripted {
        draws: Vec<f64>,
        next: usize,
    }

    impl Scripted {
        fn new(draws: &[f64]) -> Self {
            Self {
                draws: draws.to_vec(),
                next: 0,
            }
        }
    }

    impl RandomSource for Scripted {
        fn next_f64(&mut self) -> f64 {
            let value = self.draws[self.next % self.draws.len()];
            self.next += 1;
            value
        }
    }

    fn account(rate: CapGrowthRate) -> AccountDefinition {
        AccountDefinition {
            account_id: "act_100".to_string(),
            vendor_name: "Vendor".to_string(),
            initial_cap_cents: 20_000,
            cap_growth_rate: rate,
            base_cpc: 0.5,
            suspension_probability: 0.1,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        }
    }

    fn local(hour: u32, minute: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn diurnal_curve_breakpoints() {
        assert_eq!(diurnal_fraction(0), 0.0);
        assert!((diurnal_fraction(360) - 0.05).abs() < 1e-12);
        assert!((diurnal_fraction(720) - 0.25).abs() < 1e-12);
        assert!((diurnal_fraction(1080) - 0.75).abs() < 1e-12);
        let last = diurnal_fraction(1439);
        assert!(last < 1.0 && last > 0.99);
    }

    #[test]
    fn diurnal_curve_is_non_decreasing() {
        let mut previous = 0.0;
        for t in 0..MINUTES_PER_DAY {
            let f = diurnal_fraction(t);
            assert!(f >= previous, "curve dipped at minute {t}");
            previous = f;
        }
    }

    #[test]
    fn minutes_use_local_wall_clock() {
        assert_eq!(minutes_since_midnight(&local(12, 30)), 750);
        assert_eq!(minutes_since_midnight(&local(0, 0)), 0);
    }

    #[test]
    fn day_number_counts_creation_day_as_one() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        assert_eq!(day_number(created, created), 1);
        assert_eq!(day_number(created, created + Duration::hours(23)), 1);
        assert_eq!(day_number(created, created + Duration::days(2)), 3);
        assert_eq!(day_number(created, created - Duration::days(4)), 1);
    }

    #[test]
    fn cap_compounds_from_day_one() {
        let acct = account(CapGrowthRate::Fast);
        assert_eq!(daily_cap(&acct, 1), 20_000);
        assert_eq!(daily_cap(&acct, 2), 20_400);
    }

    #[test]
    fn cpc_rounding_to_zero_yields_no_clicks() {
        let mut acct = account(CapGrowthRate::Normal);
        acct.base_cpc = 0.001;
        let metrics = performance_metrics(&acct, 50.0, &mut Scripted::new(&[0.5]));
        assert_eq!(metrics.cpc, 0.0);
        assert_eq!(metrics.outbound_clicks, 0);
    }

    #[test]
    fn zero_spend_yields_no_clicks() {
        let acct = account(CapGrowthRate::Normal);
        let metrics = performance_metrics(&acct, 0.0, &mut Scripted::new(&[0.5]));
        assert_eq!(metrics.outbound_clicks, 0);
        assert_eq!(metrics.cpc, 0.5);
    }

    #[test]
    fn percent_is_none_only_for_zero_cap() {
        assert_eq!(spend_progress_percent(10.0, 0), None);
        assert_eq!(spend_progress_percent(0.0, 100).as_deref(), Some("0.00"));
        assert_eq!(spend_progress_percent(300.0, 20_000).as_deref(), Some("150.00"));
    }

    #[test]
    fn percent_rounds_ties_upward() {
        assert_eq!(spend_progress_percent(1.0, 80_000).as_deref(), Some("0.13"));
        assert_eq!(spend_progress_percent(5.0, 400_000).as_deref(), Some("0.13"));
    }

    #[test]
    fn scripted_draws_produce_exact_snapshot() {
        // status, spend jitter, cpc jitter, active ads, inactive ads, balance
        let mut rng = Scripted::new(&[0.9, 0.25, 0.5, 0.5, 0.5, 0.5]);
        let acct = account(CapGrowthRate::Normal);
        let now = local(12, 0);

        let snapshot = synthesize_snapshot(&acct, &now, &mut rng);

        assert_eq!(snapshot.account_status, 1);
        assert_eq!(snapshot.daily_spend_limit, 20_000);
        assert_eq!(snapshot.spend_cap, 20_000);
        assert_eq!(snapshot.spend_today, 51.0);
        assert_eq!(snapshot.amount_spent, 5_100);
        assert_eq!(snapshot.daily_limit_display, 200.0);
        assert_eq!(snapshot.spend_progress_percent.as_deref(), Some("25.50"));
        assert_eq!(snapshot.cpc, 0.5);
        assert_eq!(snapshot.outbound_clicks, 102);
        assert_eq!(snapshot.active_ads_count, 13);
        assert_eq!(snapshot.total_ads_count, 18);
        assert_eq!(snapshot.account_balance, 5_050.0);
        assert_eq!(snapshot.cap_source, "SIMULATION");
        assert_eq!(snapshot.snapshot_time, now.with_timezone(&Utc));
    }

    #[test]
    fn suspended_branch_zeroes_active_ads() {
        let counts = ad_counts(AccountStatus::Suspended, &mut Scripted::new(&[0.999_999]));
        assert_eq!(counts.active, 0);
        assert_eq!(counts.total, 19);
    }
}
