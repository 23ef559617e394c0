//! Postgres connection handle
//!
//! [`PgHandle`] is the one process-wide store handle. How many connections it
//! may open, how many it keeps idle between operations and how long a
//! connection may live are all explicit in [`PoolPolicy`]. The default policy
//! keeps nothing idle, so each operation pays for a fresh connection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_postgres::{Client, NoTls};

use super::errors::{StoreError, StoreResult};

/// Connection reuse policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolPolicy {
    /// Upper bound on simultaneously open connections, `None` for unbounded
    pub max_open: Option<usize>,
    /// Connections kept open between operations
    pub max_idle: usize,
    /// Age after which a connection is not reused, `None` for unlimited
    pub max_lifetime: Option<Duration>,
}

impl PoolPolicy {
    /// Unbounded, nothing idle, unlimited lifetime
    pub const NO_REUSE: PoolPolicy = PoolPolicy {
        max_open: None,
        max_idle: 0,
        max_lifetime: None,
    };

    pub fn reuses_connections(&self) -> bool {
        self.max_idle > 0
    }
}

impl Default for PoolPolicy {
    fn default() -> Self {
        Self::NO_REUSE
    }
}

/// Counters exposed for tests and startup logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub opened: u64,
    pub reused: u64,
    pub idle: usize,
}

struct Idle<T> {
    conn: T,
    opened_at: Instant,
}

/// Idle connection slots bounded by `max_idle` and `max_lifetime`
pub(crate) struct IdleSlots<T> {
    slots: Mutex<Vec<Idle<T>>>,
    max_idle: usize,
    max_lifetime: Option<Duration>,
}

impl<T> IdleSlots<T> {
    pub(crate) fn new(policy: &PoolPolicy) -> Self {
        Self {
            slots: Mutex::new(Vec::with_capacity(policy.max_idle)),
            max_idle: policy.max_idle,
            max_lifetime: policy.max_lifetime,
        }
    }

    fn expired(&self, opened_at: Instant) -> bool {
        self.max_lifetime
            .map(|limit| opened_at.elapsed() >= limit)
            .unwrap_or(false)
    }

    /// Most recently returned live connection, dropping expired ones on the way.
    pub(crate) fn take(&self) -> Option<(T, Instant)> {
        let mut slots = self.slots.lock();
        while let Some(idle) = slots.pop() {
            if !self.expired(idle.opened_at) {
                return Some((idle.conn, idle.opened_at));
            }
        }
        None
    }

    /// Keep `conn` for reuse if policy allows. Returns false if it was dropped.
    pub(crate) fn offer(&self, conn: T, opened_at: Instant) -> bool {
        if self.max_idle == 0 || self.expired(opened_at) {
            return false;
        }
        let mut slots = self.slots.lock();
        if slots.len() >= self.max_idle {
            return false;
        }
        slots.push(Idle { conn, opened_at });
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.lock().len()
    }
}

/// Process-wide Postgres handle
pub struct PgHandle {
    config: tokio_postgres::Config,
    policy: PoolPolicy,
    permits: Option<Arc<Semaphore>>,
    idle: IdleSlots<Client>,
    opened: AtomicU64,
    reused: AtomicU64,
}

impl PgHandle {
    /// Parse the connection string. No connection is opened here.
    pub fn new(database_url: &str, policy: PoolPolicy) -> StoreResult<Self> {
        let config = database_url
            .parse::<tokio_postgres::Config>()
            .map_err(|e| StoreError::connect_failed(format!("invalid database url: {}", e)))?;
        Ok(Self::with_config(config, policy))
    }

    pub fn with_config(config: tokio_postgres::Config, policy: PoolPolicy) -> Self {
        Self {
            config,
            permits: policy.max_open.map(|n| Arc::new(Semaphore::new(n))),
            idle: IdleSlots::new(&policy),
            policy,
            opened: AtomicU64::new(0),
            reused: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> &PoolPolicy {
        &self.policy
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            opened: self.opened.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            idle: self.idle.len(),
        }
    }

    /// Check out a connection, reusing an idle one when the policy keeps any.
    pub async fn acquire(&self) -> StoreResult<PgConn<'_>> {
        let permit = match &self.permits {
            Some(sem) => Some(
                sem.clone()
                    .acquire_owned()
                    .await
                    .map_err(|e| StoreError::connect_failed(e.to_string()))?,
            ),
            None => None,
        };

        while let Some((client, opened_at)) = self.idle.take() {
            if client.is_closed() {
                continue;
            }
            self.reused.fetch_add(1, Ordering::Relaxed);
            return Ok(PgConn::new(self, client, opened_at, permit));
        }

        let client = self.connect().await?;
        Ok(PgConn::new(self, client, Instant::now(), permit))
    }

    async fn connect(&self) -> StoreResult<Client> {
        let (client, connection) = self
            .config
            .connect(NoTls)
            .await
            .map_err(|e| StoreError::connect_failed(e.to_string()))?;
        self.opened.fetch_add(1, Ordering::Relaxed);

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::debug!(error = %e, "postgres connection closed with error");
            }
        });

        Ok(client)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    InFlight,
    Failed,
    Done,
}

/// A checked-out connection
///
/// Dropped without [`release`](PgConn::release) or [`fail`](PgConn::fail) it is
/// treated as abandoned mid-statement: a cancel request is sent and the
/// connection is closed.
pub struct PgConn<'a> {
    handle: &'a PgHandle,
    client: Option<Client>,
    opened_at: Instant,
    outcome: Outcome,
    _permit: Option<OwnedSemaphorePermit>,
}

impl<'a> PgConn<'a> {
    fn new(
        handle: &'a PgHandle,
        client: Client,
        opened_at: Instant,
        permit: Option<OwnedSemaphorePermit>,
    ) -> Self {
        Self {
            handle,
            client: Some(client),
            opened_at,
            outcome: Outcome::InFlight,
            _permit: permit,
        }
    }

    pub fn client(&self) -> StoreResult<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| StoreError::connect_failed("connection already released"))
    }

    /// Statement finished; the connection may be kept idle.
    pub fn release(mut self) {
        self.outcome = Outcome::Done;
    }

    /// Statement failed; the connection is closed.
    pub fn fail(mut self) {
        self.outcome = Outcome::Failed;
    }
}

impl Drop for PgConn<'_> {
    fn drop(&mut self) {
        let Some(client) = self.client.take() else {
            return;
        };
        match self.outcome {
            Outcome::Done if !client.is_closed() => {
                self.handle.idle.offer(client, self.opened_at);
            }
            Outcome::InFlight => {
                let token = client.cancel_token();
                if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                    runtime.spawn(async move {
                        if let Err(e) = token.cancel_query(NoTls).await {
                            tracing::debug!(error = %e, "cancel request failed");
                        }
                    });
                }
            }
            _ => {}
        }
    }
}
