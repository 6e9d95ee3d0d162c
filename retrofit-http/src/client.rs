use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use retrofit_core::{
    BackendError, Building, BuildingStub, CalculatorRequest, CalculatorResult, Contractor,
    RetrofitBackend,
};

#[derive(Deserialize)]
struct StreetsBody {
    #[serde(default)]
    streets: Vec<String>,
}

#[derive(Deserialize)]
struct ContractorsBody {
    #[serde(default)]
    contractors: Vec<Contractor>,
}

/// [`RetrofitBackend`] speaking JSON over HTTP to the retrofit service.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Validates `base_url`; no request is sent.
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| BackendError::Configuration(format!("invalid base URL '{base_url}': {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(BackendError::Configuration(format!(
                "base URL must be an http(s) URL, got '{base_url}'"
            )));
        }

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` extended by `segments`, each percent-encoded.
    pub fn endpoint(
        &self,
        segments: &[&str],
    ) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                BackendError::Configuration(format!("'{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T, BackendError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, ?query, "GET");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        read_json(response).await
    }
}

/// Non-success statuses become [`BackendError::Status`] carrying the
/// response text.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), %body, "request failed");
        return Err(BackendError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| BackendError::Connection(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode(e.to_string()))
}

#[async_trait]
impl RetrofitBackend for HttpBackend {
    async fn health(&self) -> Result<(), BackendError> {
        let _: serde_json::Value = self.get_json(&["health"], &[]).await?;
        Ok(())
    }

    async fn list_streets(
        &self,
        postal_code: &str,
    ) -> Result<Vec<String>, BackendError> {
        let body: StreetsBody = self
            .get_json(&["addresses", "streets"], &[("postcode", postal_code)])
            .await?;
        Ok(body.streets)
    }

    async fn list_buildings(
        &self,
        postal_code: &str,
        street: &str,
    ) -> Result<Vec<BuildingStub>, BackendError> {
        // The cascade route answers with a bare array.
        self.get_json(
            &["buildings"],
            &[("postal_code", postal_code), ("street", street)],
        )
        .await
    }

    async fn get_building(
        &self,
        building_id: &str,
    ) -> Result<Building, BackendError> {
        self.get_json(&["buildings", building_id], &[]).await
    }

    async fn run_calculator(
        &self,
        request: &CalculatorRequest,
    ) -> Result<CalculatorResult, BackendError> {
        let url = self.endpoint(&["calculator"])?;
        tracing::debug!(%url, subtype = %request.subtype, "POST");
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        read_json(response).await
    }

    async fn list_contractors(
        &self,
        specialization: &str,
    ) -> Result<Vec<Contractor>, BackendError> {
        let body: ContractorsBody = self
            .get_json(&["contractors"], &[("specialization", specialization)])
            .await?;
        Ok(body.contractors)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn endpoint_appends_segments_to_base_path() {
        let backend = HttpBackend::new("https://api.example.org/v1/").unwrap();

        let url = backend.endpoint(&["addresses", "streets"]).unwrap();

        assert_eq!(url.as_str(), "https://api.example.org/v1/addresses/streets");
    }

    #[test]
    fn endpoint_percent_encodes_building_id() {
        let backend = HttpBackend::new("http://localhost:8000").unwrap();

        let url = backend.endpoint(&["buildings", "Weserstr. 12/A"]).unwrap();

        assert_eq!(url.as_str(), "http://localhost:8000/buildings/Weserstr.%2012%2FA");
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(matches!(
            HttpBackend::new("not a url"),
            Err(BackendError::Configuration(_))
        ));
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(matches!(
            HttpBackend::new("ftp://example.org"),
            Err(BackendError::Configuration(_))
        ));
    }
}
