// Worker Settings
pub const WORKER_INTERVAL_SECS: u64 = 1800; // 30 minutes

// Data origin tag written on every synthesized snapshot
pub const CAP_SOURCE_SIMULATION: &str = "SIMULATION";

// Account status codes
pub const STATUS_ACTIVE: i32 = 1;
pub const STATUS_SUSPENDED: i32 = 100;

// Diurnal pacing: segment starts in minutes since midnight
pub const MINUTES_PER_DAY: u32 = 1440;
pub const SEGMENT_MINUTES: u32 = 360;

// Cumulative share of the daily cap spent at each segment boundary
pub const DIURNAL_BREAKPOINTS: [f64; 5] = [0.0, 0.05, 0.25, 0.75, 1.0];

// Pacing multipliers by growth category
pub const PACING_FAST: f64 = 1.15;
pub const PACING_NORMAL: f64 = 1.05;
pub const PACING_SLOW: f64 = 0.95;
pub const PACING_DECLINING: f64 = 0.85;

// Daily compounding of the spend cap by growth category
pub const GROWTH_FAST: f64 = 1.02;
pub const GROWTH_NORMAL: f64 = 1.01;
pub const GROWTH_SLOW: f64 = 1.005;
pub const GROWTH_DECLINING: f64 = 0.99;

// Jitter bands
pub const SPEND_JITTER_MIN: f64 = 0.95;
pub const SPEND_JITTER_MAX: f64 = 1.05;
pub const CPC_JITTER_MIN: f64 = 0.8;
pub const CPC_JITTER_MAX: f64 = 1.2;

// Ad counts
pub const SUSPENDED_TOTAL_ADS_BASE: f64 = 5.0;
pub const SUSPENDED_TOTAL_ADS_SPREAD: f64 = 15.0;
pub const ACTIVE_ADS_BASE: f64 = 3.0;
pub const ACTIVE_ADS_SPREAD: f64 = 20.0;
pub const INACTIVE_ADS_SPREAD: f64 = 10.0;

// Synthetic balance range in major units
pub const BALANCE_MIN: f64 = 100.0;
pub const BALANCE_MAX: f64 = 10000.0;

// Health probe
pub const HEALTH_SLOW_RESPONSE_MS: i64 = 5000;
pub const HEALTH_RECENT_SNAPSHOTS: i64 = 10;

// Row id of the single simulation_config record
pub const SIMULATION_CONFIG_ID: i32 = 1;
