//! # Redis
//!
//! RAM database.
//!
//! Core purpose is to hold the leaderboard sorted set so every server replica
//! ranks against the same board.
//!
//! ## Requirements
//!
//! - Fast ranked inserts and range reads
//! - Small dataset, the board is capped (1000 members by default)
//! - Never hang a request on a dead Redis
//!
//! ## Connection lifecycle
//!
//! - Client is opened eagerly, a bad URL is a configuration error
//! - Connection is made on first use, not at startup
//! - After a failed call the cached connection is health checked with `PING`
//!   before reuse, and replaced when the check fails
//! - One caller reconnects at a time, everyone else fails fast meanwhile
//! - A whole store operation (connect, health check and commands) shares one
//!   timeout, nothing is retried beyond the manager's single retry
use std::{
    future::Future,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use parking_lot::Mutex;
use redis::{
    Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use tokio::{sync::Mutex as AsyncMutex, time::timeout};
use tracing::{info, warn};

use crate::error::StoreError;

pub struct RedisConnector {
    client: Client,
    config: ConnectionManagerConfig,
    timeout: Duration,
    connection: Mutex<Option<ConnectionManager>>,
    reconnecting: AsyncMutex<()>,
    healthy: AtomicBool,
}

pub fn init_redis(redis_url: &str, call_timeout: Duration) -> Result<RedisConnector, StoreError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(call_timeout);

    let client = Client::open(redis_url)?;

    Ok(RedisConnector {
        client,
        config,
        timeout: call_timeout,
        connection: Mutex::new(None),
        reconnecting: AsyncMutex::new(()),
        healthy: AtomicBool::new(false),
    })
}

impl RedisConnector {
    /// Hands out a live connection, connecting or reconnecting as needed.
    ///
    /// The cached slot is only locked to clone or replace the manager, never
    /// across an await.
    pub async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        let cached = self.connection.lock().clone();

        if let Some(mut connection) = cached {
            if self.healthy.load(Ordering::Acquire) {
                return Ok(connection);
            }

            let ping = redis::cmd("PING");
            match ping.query_async::<String>(&mut connection).await {
                Ok(_) => {
                    self.healthy.store(true, Ordering::Release);
                    return Ok(connection);
                }
                Err(e) => warn!("Redis health check failed, reconnecting: {e}"),
            }
        }

        let Ok(_reconnect) = self.reconnecting.try_lock() else {
            return Err(StoreError::Reconnecting);
        };

        self.connection.lock().take();

        let connection = self
            .client
            .get_connection_manager_with_config(self.config.clone())
            .await?;

        info!("Connected to Redis");
        self.healthy.store(true, Ordering::Release);
        *self.connection.lock() = Some(connection.clone());

        Ok(connection)
    }

    /// Runs one store operation under the configured timeout. Failures mark
    /// the connection for a health check on next use.
    pub async fn within<T, F>(&self, operation: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let result = match timeout(self.timeout, operation).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout),
        };

        if result.is_err() {
            self.healthy.store(false, Ordering::Release);
        }

        result
    }
}
