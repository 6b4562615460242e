//! Database layer — migrations, ledger state load/persist, and the event journal.

use std::str::FromStr;

use impact_ledger::{
    CharityFunds, Device, DeviceId, Donation, DonationLedger, DonationStatus, ImpactRegistry,
    LedgerEvent, LedgerState, Principal, ProjectImpact, Reading,
};
use serde::{Deserialize, Serialize};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Sqlite, SqlitePool, Transaction,
};
use tracing::info;

use crate::errors::{HostError, Result};

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);

    // Every in-memory connection is its own database.
    let max_connections = if url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Column codecs
// ─────────────────────────────────────────────────────────

fn parse_column<T: FromStr>(table: &str, column: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| HostError::Corrupt(format!("{table}.{column} = `{raw}`")))
}

fn to_sql_id(table: &str, id: u64) -> Result<i64> {
    i64::try_from(id).map_err(|_| HostError::Corrupt(format!("{table} id {id} exceeds i64")))
}

fn from_sql_id(table: &str, id: i64) -> Result<u64> {
    u64::try_from(id).map_err(|_| HostError::Corrupt(format!("{table} id {id} is negative")))
}

fn principal_column(table: &str, column: &str, raw: String) -> Result<Principal> {
    Principal::new(raw).map_err(|e| HostError::Corrupt(format!("{table}.{column}: {e}")))
}

// ─────────────────────────────────────────────────────────
// State load
// ─────────────────────────────────────────────────────────

/// Rebuild the full ledger state from the four map tables.
pub async fn load_state(pool: &SqlitePool) -> Result<LedgerState> {
    let next_id: Option<(i64,)> = sqlx::query_as("SELECT next_id FROM ledger_meta WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    let next_id = from_sql_id("ledger_meta", next_id.map(|(v,)| v).unwrap_or(0))?;

    let rows: Vec<(i64, String, String, String, String)> =
        sqlx::query_as("SELECT id, donor, charity, amount, status FROM donations")
            .fetch_all(pool)
            .await?;
    let mut donations = Vec::with_capacity(rows.len());
    for (id, donor, charity, amount, status) in rows {
        donations.push((
            from_sql_id("donations", id)?,
            Donation {
                donor: principal_column("donations", "donor", donor)?,
                charity: principal_column("donations", "charity", charity)?,
                amount: parse_column("donations", "amount", &amount)?,
                status: parse_column::<DonationStatus>("donations", "status", &status)?,
            },
        ));
    }

    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT charity, total_funds FROM charity_funds")
            .fetch_all(pool)
            .await?;
    let mut funds = Vec::with_capacity(rows.len());
    for (charity, total) in rows {
        funds.push((
            principal_column("charity_funds", "charity", charity)?,
            CharityFunds {
                total_funds: parse_column("charity_funds", "total_funds", &total)?,
            },
        ));
    }

    let rows: Vec<(String, String, String, String, String)> = sqlx::query_as(
        "SELECT device_id, project_id, device_type, reading_timestamp, reading_value FROM devices",
    )
    .fetch_all(pool)
    .await?;
    let mut devices = Vec::with_capacity(rows.len());
    for (device_id, project_id, device_type, timestamp, value) in rows {
        devices.push((
            DeviceId::new(device_id)
                .map_err(|e| HostError::Corrupt(format!("devices.device_id: {e}")))?,
            Device {
                project_id: parse_column("devices", "project_id", &project_id)?,
                device_type,
                last_reading: Reading {
                    timestamp: parse_column("devices", "reading_timestamp", &timestamp)?,
                    value: parse_column("devices", "reading_value", &value)?,
                },
            },
        ));
    }

    let rows: Vec<(String, String, String)> =
        sqlx::query_as("SELECT project_id, total_impact, last_updated FROM project_impact")
            .fetch_all(pool)
            .await?;
    let mut impact = Vec::with_capacity(rows.len());
    for (project_id, total, last_updated) in rows {
        impact.push((
            parse_column("project_impact", "project_id", &project_id)?,
            ProjectImpact {
                total_impact: parse_column("project_impact", "total_impact", &total)?,
                last_updated: parse_column("project_impact", "last_updated", &last_updated)?,
            },
        ));
    }

    let corrupt = |e: impact_ledger::LedgerError| HostError::Corrupt(e.to_string());
    Ok(LedgerState {
        donations: DonationLedger::from_records(next_id, donations, funds).map_err(corrupt)?,
        telemetry: ImpactRegistry::from_records(devices, impact).map_err(corrupt)?,
    })
}

// ─────────────────────────────────────────────────────────
// State persist
// ─────────────────────────────────────────────────────────

/// Write the records touched by `events` (read back from `state`) and append
/// the events to the journal, all in one transaction.
pub async fn persist(pool: &SqlitePool, state: &LedgerState, events: &[LedgerEvent]) -> Result<()> {
    let mut tx = pool.begin().await?;

    for event in events {
        match event {
            LedgerEvent::DonationReceived {
                donation_id,
                charity,
                ..
            } => {
                upsert_donation(&mut tx, state, *donation_id).await?;
                upsert_charity_funds(&mut tx, state, charity).await?;
                sqlx::query("UPDATE ledger_meta SET next_id = ?1 WHERE id = 1")
                    .bind(to_sql_id("ledger_meta", state.donations.next_id())?)
                    .execute(&mut *tx)
                    .await?;
            }
            LedgerEvent::FundsReleased { donation_id, .. } => {
                upsert_donation(&mut tx, state, *donation_id).await?;
            }
            LedgerEvent::DeviceRegistered { device_id, .. } => {
                upsert_device(&mut tx, state, device_id).await?;
            }
            LedgerEvent::ReadingRecorded {
                device_id,
                project_id,
                ..
            } => {
                upsert_device(&mut tx, state, device_id).await?;
                let impact = state.telemetry.get_project_impact(*project_id);
                sqlx::query(
                    r#"
                    INSERT INTO project_impact (project_id, total_impact, last_updated)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT (project_id) DO UPDATE
                        SET total_impact = excluded.total_impact,
                            last_updated = excluded.last_updated
                    "#,
                )
                .bind(project_id.to_string())
                .bind(impact.total_impact.to_string())
                .bind(impact.last_updated.to_string())
                .execute(&mut *tx)
                .await?;
            }
        }

        let project_id = event.project_id().map(|id| id.to_string());
        sqlx::query(
            "INSERT INTO events (event_type, subject, project_id, payload) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(event.topic())
        .bind(event.subject())
        .bind(project_id)
        .bind(serde_json::to_string(event)?)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

async fn upsert_donation(
    tx: &mut Transaction<'_, Sqlite>,
    state: &LedgerState,
    donation_id: u64,
) -> Result<()> {
    let donation = state
        .donations
        .get_donation(donation_id)
        .map_err(|e| HostError::Corrupt(format!("donation {donation_id}: {e}")))?;
    sqlx::query(
        r#"
        INSERT INTO donations (id, donor, charity, amount, status)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT (id) DO UPDATE SET status = excluded.status
        "#,
    )
    .bind(to_sql_id("donations", donation_id)?)
    .bind(donation.donor.as_str())
    .bind(donation.charity.as_str())
    .bind(donation.amount.to_string())
    .bind(donation.status.as_str())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn upsert_charity_funds(
    tx: &mut Transaction<'_, Sqlite>,
    state: &LedgerState,
    charity: &Principal,
) -> Result<()> {
    let funds = state.donations.get_charity_funds(charity);
    sqlx::query(
        r#"
        INSERT INTO charity_funds (charity, total_funds) VALUES (?1, ?2)
        ON CONFLICT (charity) DO UPDATE SET total_funds = excluded.total_funds
        "#,
    )
    .bind(charity.as_str())
    .bind(funds.total_funds.to_string())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn upsert_device(
    tx: &mut Transaction<'_, Sqlite>,
    state: &LedgerState,
    device_id: &DeviceId,
) -> Result<()> {
    let device = state
        .telemetry
        .get_device_info(device_id)
        .map_err(|e| HostError::Corrupt(format!("device {device_id}: {e}")))?;
    sqlx::query(
        r#"
        INSERT INTO devices (device_id, project_id, device_type, reading_timestamp, reading_value)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT (device_id) DO UPDATE
            SET project_id        = excluded.project_id,
                device_type       = excluded.device_type,
                reading_timestamp = excluded.reading_timestamp,
                reading_value     = excluded.reading_value
        "#,
    )
    .bind(device_id.as_str())
    .bind(device.project_id.to_string())
    .bind(device.device_type.as_str())
    .bind(device.last_reading.timestamp.to_string())
    .bind(device.last_reading.value.to_string())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// A journal entry as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_type: String,
    pub subject: String,
    pub project_id: Option<String>,
    pub payload: String,
    pub created_at: i64,
}

/// Fetch all journal entries for a given project, oldest first.
pub async fn get_events_for_project(pool: &SqlitePool, project_id: u64) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_type, subject, project_id, payload, created_at
        FROM   events
        WHERE  project_id = ?1
        ORDER  BY id ASC
        "#,
    )
    .bind(project_id.to_string())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch all journal entries, oldest first.
pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_type, subject, project_id, payload, created_at
        FROM   events
        ORDER  BY id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
