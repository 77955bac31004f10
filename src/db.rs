use crate::constants::SIMULATION_CONFIG_ID;
use crate::models::{AccountDefinition, CapGrowthRate, MetricsSnapshot, RunSummary, SimulationConfig};
use crate::store::{AccountStore, StoreError};
use async_trait::async_trait;
use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode};
use postgres_openssl::MakeTlsConnector;
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_postgres::{Client, Config, Row};

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] tokio_postgres::Error),
    #[error("SSL error: {0}")]
    SslError(#[from] openssl::error::ErrorStack),
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        StoreError::Connection(err.to_string())
    }
}

const SNAPSHOT_COLUMNS: &str = "account_id, snapshot_time, daily_spend_limit, spend_cap, amount_spent, \
     spend_today, daily_limit_display, spend_progress_percent, cpc, outbound_clicks, \
     active_ads_count, total_ads_count, account_balance, account_status, cap_source";

pub struct Database {
    client: Mutex<Client>,
}

impl Database {
    pub async fn new(database_url: &str, verify_tls: bool) -> Result<Self, DatabaseError> {
        // Configure SSL
        let mut builder = SslConnector::builder(SslMethod::tls())?;
        if !verify_tls {
            // For development only, use proper verification in production
            log::warn!("TLS certificate verification is disabled for the database connection");
            builder.set_verify(SslVerifyMode::NONE);
        }
        let connector = MakeTlsConnector::new(builder.build());

        // Parse the connection config from URL
        let mut config = Config::from_str(database_url)
            .map_err(|e| DatabaseError::InvalidConnectionString(e.to_string()))?;

        let (client, connection) = config
            .connect_timeout(std::time::Duration::from_secs(5))
            .connect(connector)
            .await
            .map_err(DatabaseError::ConnectionError)?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("Database connection error: {}", e);
            }
        });

        log::info!("Connected to database");
        Ok(Self {
            client: Mutex::new(client),
        })
    }
}

fn read_err(e: tokio_postgres::Error) -> StoreError {
    StoreError::Read(e.to_string())
}

fn write_err(e: tokio_postgres::Error) -> StoreError {
    StoreError::Write(e.to_string())
}

fn account_from_row(row: &Row) -> Result<AccountDefinition, StoreError> {
    let rate: String = row.get(3);
    let cap_growth_rate = CapGrowthRate::from_str(&rate)
        .map_err(|e| StoreError::Read(format!("account {}: {}", row.get::<_, String>(0), e)))?;

    Ok(AccountDefinition {
        account_id: row.get(0),
        vendor_name: row.get(1),
        initial_cap_cents: row.get(2),
        cap_growth_rate,
        base_cpc: row.get(4),
        suspension_probability: row.get(5),
        created_at: row.get(6),
    })
}

fn snapshot_from_row(row: &Row) -> MetricsSnapshot {
    MetricsSnapshot {
        account_id: row.get(0),
        snapshot_time: row.get(1),
        daily_spend_limit: row.get(2),
        spend_cap: row.get(3),
        amount_spent: row.get(4),
        spend_today: row.get(5),
        daily_limit_display: row.get(6),
        spend_progress_percent: row.get(7),
        cpc: row.get(8),
        outbound_clicks: row.get(9),
        active_ads_count: row.get(10),
        total_ads_count: row.get(11),
        account_balance: row.get(12),
        account_status: row.get(13),
        cap_source: row.get(14),
    }
}

#[async_trait]
impl AccountStore for Database {
    async fn simulation_config(&self) -> Result<SimulationConfig, StoreError> {
        let client = self.client.lock().await;
        let row = client
            .query_one(
                "SELECT id, simulation_mode, update_interval, last_update, accounts_count, suspension_rate
                 FROM simulation_config
                 WHERE id = $1",
                &[&SIMULATION_CONFIG_ID],
            )
            .await
            .map_err(read_err)?;

        Ok(SimulationConfig {
            id: row.get(0),
            simulation_mode: row.get(1),
            update_interval: row.get(2),
            last_update: row.get(3),
            accounts_count: row.get(4),
            suspension_rate: row.get(5),
        })
    }

    async fn list_account_definitions(&self) -> Result<Vec<AccountDefinition>, StoreError> {
        let client = self.client.lock().await;
        let rows = client
            .query(
                "SELECT
                    account_id,
                    vendor_name,
                    initial_cap_cents,
                    cap_growth_rate,
                    base_cpc,
                    suspension_probability,
                    created_at
                 FROM mock_ad_accounts
                 ORDER BY account_id",
                &[],
            )
            .await
            .map_err(read_err)?;

        rows.iter().map(account_from_row).collect()
    }

    async fn append_snapshots(&self, snapshots: &[MetricsSnapshot]) -> Result<(), StoreError> {
        let mut client = self.client.lock().await;
        let tx = client.transaction().await.map_err(write_err)?;

        let insert = format!(
            "INSERT INTO mock_account_metrics ({SNAPSHOT_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)"
        );
        let statement = tx.prepare(&insert).await.map_err(write_err)?;

        for s in snapshots {
            tx.execute(
                &statement,
                &[
                    &s.account_id,
                    &s.snapshot_time,
                    &s.daily_spend_limit,
                    &s.spend_cap,
                    &s.amount_spent,
                    &s.spend_today,
                    &s.daily_limit_display,
                    &s.spend_progress_percent,
                    &s.cpc,
                    &s.outbound_clicks,
                    &s.active_ads_count,
                    &s.total_ads_count,
                    &s.account_balance,
                    &s.account_status,
                    &s.cap_source,
                ],
            )
            .await
            .map_err(write_err)?;
        }

        // Dropping the transaction without commit rolls the batch back
        tx.commit().await.map_err(write_err)?;
        Ok(())
    }

    async fn update_run_summary(&self, summary: &RunSummary) -> Result<(), StoreError> {
        let client = self.client.lock().await;
        let updated = client
            .execute(
                "UPDATE simulation_config
                 SET last_update = $1, accounts_count = $2, suspension_rate = $3
                 WHERE id = $4",
                &[
                    &summary.last_run_time,
                    &summary.accounts_count,
                    &summary.suspension_rate,
                    &SIMULATION_CONFIG_ID,
                ],
            )
            .await
            .map_err(write_err)?;

        if updated == 0 {
            return Err(StoreError::Write("simulation_config row missing".to_string()));
        }
        Ok(())
    }

    async fn recent_snapshots(&self, limit: i64) -> Result<Vec<MetricsSnapshot>, StoreError> {
        let client = self.client.lock().await;
        let query = format!(
            "SELECT {SNAPSHOT_COLUMNS}
             FROM mock_account_metrics
             ORDER BY snapshot_time DESC
             LIMIT $1"
        );
        let rows = client.query(&query, &[&limit]).await.map_err(read_err)?;

        Ok(rows.iter().map(snapshot_from_row).collect())
    }
}
