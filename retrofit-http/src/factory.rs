use std::sync::Arc;

use async_trait::async_trait;

use retrofit_core::backend::{BackendConfig, BackendError, BackendFactory, RetrofitBackend};

use crate::client::HttpBackend;

/// [`BackendFactory`] for the JSON-over-HTTP service.
///
/// Register this with a [`retrofit_core::backend::BackendRegistry`] to make
/// the `"http"` backend available:
///
/// ```rust,no_run
/// use retrofit_core::backend::BackendRegistry;
/// use retrofit_http::HttpBackendFactory;
///
/// let mut registry = BackendRegistry::new();
/// registry.register(Box::new(HttpBackendFactory));
/// ```
pub struct HttpBackendFactory;

#[async_trait]
impl BackendFactory for HttpBackendFactory {
    fn backend_name(&self) -> &'static str {
        "http"
    }

    /// Build a client for `config.base_url`, e.g. `http://localhost:8000`.
    ///
    /// Only the URL is checked here; whether the service is up is for the
    /// health check to find out.
    async fn create(
        &self,
        config: &BackendConfig,
    ) -> Result<Arc<dyn RetrofitBackend>, BackendError> {
        let backend = HttpBackend::new(&config.base_url)?;
        tracing::info!(base_url = %backend.base_url(), "http backend configured");
        Ok(Arc::new(backend))
    }
}

#[cfg(test)]
mod tests {
    use retrofit_core::backend::{BackendConfig, BackendError, BackendFactory, BackendRegistry};

    use super::HttpBackendFactory;

    #[test]
    fn backend_name_is_http() {
        assert_eq!(HttpBackendFactory.backend_name(), "http");
    }

    #[tokio::test]
    async fn creates_backend_for_default_config() {
        let result = HttpBackendFactory.create(&BackendConfig::default()).await;
        assert!(
            result.is_ok(),
            "failed to create http backend: {:#?}",
            result.err()
        );
    }

    #[tokio::test]
    async fn registry_dispatches_to_http_factory() {
        let mut registry = BackendRegistry::new();
        registry.register(Box::new(HttpBackendFactory));

        assert_eq!(registry.available_backends(), vec!["http"]);
        assert!(registry.create(&BackendConfig::default()).await.is_ok());
    }

    #[tokio::test]
    async fn invalid_base_url_is_a_configuration_error() {
        let config = BackendConfig {
            backend: "http".to_string(),
            base_url: "localhost".to_string(),
        };

        let result = HttpBackendFactory.create(&config).await;

        assert!(matches!(result, Err(BackendError::Configuration(_))));
    }
}
