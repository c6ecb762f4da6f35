// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Key-value cache with typed JSON operations.
//!
//! Backed by Redis in production. An in-memory backend keeps tests and
//! local development free of a running server; both backends speak the
//! same byte-oriented protocol so callers cannot tell them apart.

use crate::error::AppError;
use dashmap::DashMap;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Key-value cache client.
#[derive(Clone)]
pub struct Cacher {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Redis(redis::aio::ConnectionManager),
    Memory(Arc<DashMap<String, Vec<u8>>>),
}

impl Cacher {
    /// Connect to Redis.
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let client = redis::Client::open(url)
            .map_err(|e| AppError::Database(format!("Invalid Redis URL: {}", e)))?;
        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Redis: {}", e)))?;

        tracing::info!("Connected to Redis");

        Ok(Self {
            backend: Backend::Redis(manager),
        })
    }

    /// Create an in-memory cache for testing and local development.
    pub fn new_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(DashMap::new())),
        }
    }

    /// Get raw bytes for a key. `Ok(None)` when the key is absent.
    pub async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        match &self.backend {
            Backend::Redis(manager) => {
                let mut conn = manager.clone();
                conn.get(key)
                    .await
                    .map_err(|e| AppError::Database(format!("Redis GET {}: {}", key, e)))
            }
            Backend::Memory(map) => Ok(map.get(key).map(|v| v.value().clone())),
        }
    }

    /// Set raw bytes for a key with no expiry.
    pub async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), AppError> {
        match &self.backend {
            Backend::Redis(manager) => {
                let mut conn = manager.clone();
                let _: () = conn
                    .set(key, value)
                    .await
                    .map_err(|e| AppError::Database(format!("Redis SET {}: {}", key, e)))?;
                Ok(())
            }
            Backend::Memory(map) => {
                map.insert(key.to_string(), value);
                Ok(())
            }
        }
    }

    /// Get a JSON-serialized object. `Ok(None)` when the key is absent.
    pub async fn get_object<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        let data = match self.get_bytes(key).await? {
            Some(data) => data,
            None => return Ok(None),
        };
        let value = serde_json::from_slice(&data)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Corrupt cache entry {}: {}", key, e)))?;
        Ok(Some(value))
    }

    /// Store a JSON-serialized object with no expiry.
    pub async fn set_object<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let data = serde_json::to_vec(value)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Serialize cache entry: {}", e)))?;
        self.set_bytes(key, data).await
    }

    /// Delete a key.
    pub async fn del(&self, key: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Redis(manager) => {
                let mut conn = manager.clone();
                let _: () = conn
                    .del(key)
                    .await
                    .map_err(|e| AppError::Database(format!("Redis DEL {}: {}", key, e)))?;
                Ok(())
            }
            Backend::Memory(map) => {
                map.remove(key);
                Ok(())
            }
        }
    }
}
