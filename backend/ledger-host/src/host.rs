//! Serializes invocations against the in-memory ledger and commits each
//! mutating call to SQLite before the next one is observed.

use impact_ledger::{ErrorKind, Ledger, Operation, Receipt, ReleasePolicy};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::db;
use crate::errors::Result;

pub struct LedgerHost {
    pool: SqlitePool,
    ledger: Mutex<Ledger<ReleasePolicy>>,
}

impl LedgerHost {
    /// Load the persisted state and wrap it for serialized access.
    pub async fn open(pool: SqlitePool, policy: ReleasePolicy) -> Result<Self> {
        let state = db::load_state(&pool).await?;
        info!(
            donations = state.donations.next_id(),
            devices = state.telemetry.devices().count(),
            "Ledger state loaded"
        );
        Ok(Self {
            pool,
            ledger: Mutex::new(Ledger::with_state(state, policy)),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run one operation. Ledger failures come back as a failed [`Receipt`];
    /// only storage failures are errors.
    pub async fn invoke(&self, op: Operation) -> Result<Receipt> {
        let name = op.name();
        let mut ledger = self.ledger.lock().await;

        if op.is_read_only() {
            return Ok(ledger.execute(op).into());
        }

        // The previous call committed, so this is what the database holds.
        let committed = ledger.state().clone();
        let result = ledger.execute(op);
        let events = ledger.take_events();

        if let Err(e) = &result {
            match e.kind() {
                ErrorKind::Unauthorized => warn!(operation = name, "Unauthorized invocation: {e}"),
                kind => debug!(operation = name, ?kind, "Invocation rejected: {e}"),
            }
            return Ok(result.into());
        }

        if let Err(e) = db::persist(&self.pool, ledger.state(), &events).await {
            error!(operation = name, "Persist failed, restoring committed state: {e}");
            ledger.restore(committed);
            return Err(e);
        }

        info!(operation = name, events = events.len(), "Invocation committed");
        Ok(result.into())
    }
}
