//! ad-metrics-simulator: writes synthetic ad-account snapshots on a schedule.
//!
//! Usage:
//!   ad-metrics-simulator                              run the worker loop
//!   ad-metrics-simulator --once [--user U --password P]
//!   ad-metrics-simulator --status

use ad_metrics_simulator::auth::{CredentialVerifier, Permission, StaticCredentials};
use ad_metrics_simulator::config::{resolve_interval, Config};
use ad_metrics_simulator::dashboard::{check_health, latest_per_account, AccountView};
use ad_metrics_simulator::db::Database;
use ad_metrics_simulator::rng::SimRng;
use ad_metrics_simulator::store::AccountStore;
use ad_metrics_simulator::worker::SimulationWorker;
use serde_json::json;
use std::env;
use std::error::Error;
use std::sync::Arc;

const STATUS_SNAPSHOT_WINDOW: i64 = 5000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database connection
    let db = Arc::new(Database::new(&config.database_url, config.verify_tls).await?);

    if has_flag(&args, "--status") {
        let health = check_health(db.as_ref()).await;
        let snapshots = db.recent_snapshots(STATUS_SNAPSHOT_WINDOW).await?;
        let accounts: Vec<AccountView> = latest_per_account(&snapshots)
            .iter()
            .map(AccountView::from)
            .collect();

        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "health": health,
                "total_accounts": accounts.len(),
                "accounts": accounts,
            }))?
        );
        return Ok(());
    }

    let rng = SimRng::from_seed_option(config.seed);
    if let Some(seed) = rng.seed() {
        log::info!("Using fixed simulation seed {}", seed);
    }
    let worker = SimulationWorker::new(db.clone(), rng);

    if has_flag(&args, "--once") {
        // Manual trigger is gated when dashboard users are configured
        if let Some(users) = config.dashboard_users.as_deref() {
            let credentials = StaticCredentials::parse(users)?;
            let user = credentials.authenticate(
                arg_value(&args, "--user").unwrap_or_default(),
                arg_value(&args, "--password").unwrap_or_default(),
            )?;
            user.require(Permission::ManageAccounts)?;
            log::info!("Manual run triggered by {}", user.username);
        }

        let outcome = worker.run_once().await?;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let stored_minutes = match db.simulation_config().await {
        Ok(stored) => Some(stored.update_interval),
        Err(e) => {
            log::warn!("Could not read stored update interval: {}", e);
            None
        }
    };
    let interval = resolve_interval(config.interval, stored_minutes);

    log::info!("Starting simulation worker, interval {:?}", interval);
    worker.run(interval).await;

    Ok(())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn arg_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}
