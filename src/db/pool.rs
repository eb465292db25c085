//! Lazily created, process-wide connection pool.
//!
//! DESIGN
//! ======
//! `LazyPool` is a single-flight memoized initializer. The first caller
//! installs a `Shared` connect future; every caller that arrives while it is
//! in flight clones and awaits the same future, so exactly one connect runs
//! per attempt. A successful pool is kept for the life of the process.
//!
//! ERROR HANDLING
//! ==============
//! A failed attempt is removed from the slot entirely (not cached as an
//! error). Every waiter of that attempt receives the same error, and the next
//! `acquire` starts a fresh attempt. The slot is tagged with an attempt
//! number so a late waiter of an old attempt never clears a newer one.
//!
//! Each attempt runs on its own task and settles the slot itself, so a
//! connect still completes when every caller waiting on it has gone away.

use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use tracing::{error, info};

use crate::config::DbConfig;

/// Pool creation failed. Cloneable so every coalesced waiter gets a copy.
#[derive(Debug, Clone, thiserror::Error)]
#[error("database connection failed: {0}")]
pub struct PoolError(pub Arc<sqlx::Error>);

/// Produces a fresh connect attempt each time it is called.
pub type Connector<P> = Arc<dyn Fn() -> BoxFuture<'static, Result<P, sqlx::Error>> + Send + Sync>;

type PendingConnect<P> = Shared<BoxFuture<'static, Result<P, PoolError>>>;

enum Slot<P: Clone> {
    Empty,
    Pending { attempt: u64, connect: PendingConnect<P> },
    Ready(P),
}

struct SlotState<P: Clone> {
    slot: Slot<P>,
    attempts: u64,
}

/// The application's shared Postgres pool.
pub type DbPool = LazyPool<PgPool>;

pub struct LazyPool<P: Clone + Send + Sync + 'static> {
    connector: Connector<P>,
    state: Arc<Mutex<SlotState<P>>>,
}

impl<P: Clone + Send + Sync + 'static> LazyPool<P> {
    #[must_use]
    pub fn new(connector: Connector<P>) -> Self {
        Self { connector, state: Arc::new(Mutex::new(SlotState { slot: Slot::Empty, attempts: 0 })) }
    }

    /// Return the shared pool, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns the connect error of the attempt this call joined or started.
    pub async fn acquire(&self) -> Result<P, PoolError> {
        let (attempt, connect) = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let in_flight = match &state.slot {
                Slot::Ready(pool) => return Ok(pool.clone()),
                Slot::Pending { attempt, connect } => Some((*attempt, connect.clone())),
                Slot::Empty => None,
            };
            match in_flight {
                Some(joined) => joined,
                None => self.start_attempt(&mut state),
            }
        };

        let result = connect.await;
        settle(&self.state, attempt, &result);
        result
    }

    fn start_attempt(&self, state: &mut SlotState<P>) -> (u64, PendingConnect<P>) {
        state.attempts += 1;
        let attempt = state.attempts;
        let connecting = (self.connector)();
        let slot = Arc::clone(&self.state);
        let task = tokio::spawn(async move {
            let result = connecting.await.map_err(|e| PoolError(Arc::new(e)));
            settle(&slot, attempt, &result);
            result
        });
        let connect = task
            .map(|joined| {
                joined.unwrap_or_else(|e| Err(PoolError(Arc::new(sqlx::Error::Io(std::io::Error::other(e))))))
            })
            .boxed()
            .shared();
        state.slot = Slot::Pending { attempt, connect: connect.clone() };
        (attempt, connect)
    }

    /// `true` once a pool has been created successfully.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        matches!(state.slot, Slot::Ready(_))
    }
}

impl DbPool {
    /// Build the Postgres-backed lazy pool. Nothing connects until the first
    /// `acquire`.
    #[must_use]
    pub fn from_config(config: DbConfig) -> Self {
        let config = Arc::new(config);
        Self::new(Arc::new(move || {
            let config = Arc::clone(&config);
            async move { connect(&config).await }.boxed()
        }))
    }
}

async fn connect(config: &DbConfig) -> Result<PgPool, sqlx::Error> {
    let options = connect_options(config)?;
    info!(
        host = options.get_host(),
        database = options.get_database().unwrap_or_default(),
        user = options.get_username(),
        "db: connecting"
    );

    let result = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout)
        .connect_with(options)
        .await;

    match &result {
        Ok(_) => info!("db: connected"),
        Err(e) => error!(error = %e, "db: connection failed, next request will retry"),
    }
    result
}

pub(crate) fn connect_options(config: &DbConfig) -> Result<PgConnectOptions, sqlx::Error> {
    let mut options = match &config.url {
        Some(url) => url.parse::<PgConnectOptions>()?,
        None => {
            let mut options = PgConnectOptions::new()
                .host(&config.host)
                .port(config.port)
                .ssl_mode(if config.require_tls { PgSslMode::Require } else { PgSslMode::Prefer });
            if let Some(user) = &config.user {
                options = options.username(user);
            }
            if let Some(password) = &config.password {
                options = options.password(password);
            }
            if let Some(database) = &config.database {
                options = options.database(database);
            }
            options
        }
    };

    let statement_timeout = format!("{}s", config.statement_timeout.as_secs());
    options = options.options([("statement_timeout", statement_timeout.as_str())]);
    Ok(options)
}

/// Record the outcome of `attempt`, unless the slot has moved on to a newer
/// attempt already.
fn settle<P: Clone>(state: &Mutex<SlotState<P>>, attempt: u64, result: &Result<P, PoolError>) {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    if !matches!(&state.slot, Slot::Pending { attempt: a, .. } if *a == attempt) {
        return;
    }
    state.slot = match result {
        Ok(pool) => Slot::Ready(pool.clone()),
        Err(_) => Slot::Empty,
    };
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod tests;
