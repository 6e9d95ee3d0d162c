use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::client::{BackendError, RetrofitBackend};

/// Transport-agnostic backend configuration.
///
/// `backend` must match the [`BackendFactory::backend_name`] of a
/// registered factory.  `base_url` is passed through to that factory
/// unchanged; its meaning is entirely backend-specific.
///
/// | backend | base_url examples                        |
/// |---------|------------------------------------------|
/// | `http`  | `http://localhost:8000`, `https://api.example.org/v1` |
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"http"`).
    pub backend: String,
    /// Opaque value forwarded to the factory's `create` method.
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            backend: "http".to_string(),
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

/// One implementation per transport.  Each backend crate exports a single
/// unit struct that implements this trait and is registered with a
/// [`BackendRegistry`] at startup.
#[async_trait]
pub trait BackendFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Build a ready-to-use client. Implementations validate their
    /// configuration here; no request is sent.
    async fn create(
        &self,
        config: &BackendConfig,
    ) -> Result<Arc<dyn RetrofitBackend>, BackendError>;
}

/// Registry of [`BackendFactory`] instances, keyed by backend name.
///
/// Typical lifetime:
/// 1. Create with `BackendRegistry::new()`.
/// 2. Call `register` once per known backend.
/// 3. Call `create` whenever a client is needed.
pub struct BackendRegistry {
    factories: HashMap<&'static str, Box<dyn BackendFactory>>,
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory.
    ///
    /// If a factory with the same [`BackendFactory::backend_name`] is
    /// already present it is silently replaced.
    pub fn register(
        &mut self,
        factory: Box<dyn BackendFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch to the factory that matches `config.backend` and return
    /// the client it produces.
    ///
    /// # Errors
    /// * [`BackendError::Configuration`]: no factory is registered for
    ///   the requested backend name.
    /// * Any error the chosen factory itself returns.
    pub async fn create(
        &self,
        config: &BackendConfig,
    ) -> Result<Arc<dyn RetrofitBackend>, BackendError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                BackendError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config).await
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
