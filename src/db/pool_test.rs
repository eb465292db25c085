use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
struct FakePool(usize);

/// Connector that counts attempts, sleeps briefly so callers overlap, and
/// fails the first `failures` attempts.
fn counting_connector(calls: Arc<AtomicUsize>, failures: usize) -> Connector<FakePool> {
    Arc::new(move || {
        let calls = Arc::clone(&calls);
        async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(Duration::from_millis(20)).await;
            if n <= failures { Err(sqlx::Error::PoolTimedOut) } else { Ok(FakePool(n)) }
        }
        .boxed()
    })
}

// =============================================================================
// coalescing
// =============================================================================

#[tokio::test]
async fn concurrent_first_acquire_connects_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pool = Arc::new(LazyPool::new(counting_connector(Arc::clone(&calls), 0)));

    let waiters = (0..8).map(|_| {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move { pool.acquire().await })
    });
    let results = futures::future::join_all(waiters).await;

    for result in results {
        assert_eq!(result.unwrap().unwrap(), FakePool(1));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(pool.is_ready());
}

#[tokio::test]
async fn ready_pool_is_reused_without_reconnecting() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pool = LazyPool::new(counting_connector(Arc::clone(&calls), 0));

    let first = pool.acquire().await.unwrap();
    let second = pool.acquire().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn not_ready_before_first_acquire() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pool = LazyPool::new(counting_connector(Arc::clone(&calls), 0));
    assert!(!pool.is_ready());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn connect_finishes_after_only_caller_is_dropped() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pool = LazyPool::new(counting_connector(Arc::clone(&calls), 0));

    let abandoned = tokio::time::timeout(Duration::from_millis(2), pool.acquire()).await;
    assert!(abandoned.is_err());
    assert!(!pool.is_ready());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(pool.is_ready());
    assert_eq!(pool.acquire().await.unwrap(), FakePool(1));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// =============================================================================
// failure reset
// =============================================================================

#[tokio::test]
async fn failed_attempt_reaches_every_waiter() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pool = Arc::new(LazyPool::new(counting_connector(Arc::clone(&calls), 1)));

    let waiters = (0..4).map(|_| {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move { pool.acquire().await })
    });
    let results = futures::future::join_all(waiters).await;

    for result in results {
        let err = result.unwrap().unwrap_err();
        assert!(matches!(*err.0, sqlx::Error::PoolTimedOut));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!pool.is_ready());
}

#[tokio::test]
async fn next_acquire_after_failure_starts_fresh_attempt() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pool = LazyPool::new(counting_connector(Arc::clone(&calls), 1));

    assert!(pool.acquire().await.is_err());
    let recovered = pool.acquire().await.unwrap();

    assert_eq!(recovered, FakePool(2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(pool.is_ready());
}

#[tokio::test]
async fn pool_error_message_includes_cause() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pool = LazyPool::new(counting_connector(calls, 1));
    let msg = pool.acquire().await.unwrap_err().to_string();
    assert!(msg.starts_with("database connection failed"));
    assert!(msg.contains("timed out"));
}

// =============================================================================
// connect options
// =============================================================================

fn parts_config() -> DbConfig {
    DbConfig {
        url: None,
        host: "db.internal".into(),
        port: 6543,
        user: Some("registrar".into()),
        password: Some("hunter2".into()),
        database: Some("placements".into()),
        require_tls: true,
        max_connections: 5,
        connect_timeout: Duration::from_secs(30),
        statement_timeout: Duration::from_secs(30),
    }
}

#[test]
fn connect_options_from_parts() {
    let options = connect_options(&parts_config()).unwrap();
    assert_eq!(options.get_host(), "db.internal");
    assert_eq!(options.get_port(), 6543);
    assert_eq!(options.get_username(), "registrar");
    assert_eq!(options.get_database(), Some("placements"));
}

#[test]
fn connect_options_url_wins_over_parts() {
    let mut config = parts_config();
    config.url = Some("postgres://svc:pw@10.0.0.7:5432/tracker".into());
    let options = connect_options(&config).unwrap();
    assert_eq!(options.get_host(), "10.0.0.7");
    assert_eq!(options.get_username(), "svc");
    assert_eq!(options.get_database(), Some("tracker"));
}

#[test]
fn connect_options_rejects_bad_url() {
    let mut config = parts_config();
    config.url = Some("not a url".into());
    assert!(connect_options(&config).is_err());
}

#[tokio::test]
async fn from_config_does_not_connect_eagerly() {
    let pool = DbPool::from_config(parts_config());
    assert!(!pool.is_ready());
}
