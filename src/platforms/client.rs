use crate::utils::error::{AppError, AtlasResult};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Thin GET client shared by the per-chain fetch clients.
///
/// One request per call. A non-2xx response becomes `ApiError` carrying the
/// body; transport failures become `NetworkError`.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
    headers: HeaderMap,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> AtlasResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::NetworkError(e.to_string()))?;

        Ok(HttpClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            headers: HeaderMap::new(),
        })
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> AtlasResult<Self> {
        let value: HeaderValue = value
            .parse()
            .map_err(|_| AppError::NetworkError(format!("invalid value for header {}", name)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> AtlasResult<Vec<u8>> {
        let url = match path.trim_start_matches('/') {
            "" => self.base_url.clone(),
            path => format!("{}/{}", self.base_url, path),
        };
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .headers(self.headers.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            return Err(AppError::ApiError(format!(
                "HTTP error: {}, body: {}",
                status,
                String::from_utf8_lossy(&body)
            )));
        }

        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = HttpClient::new("https://api.trongrid.io/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "https://api.trongrid.io");
    }

    #[test]
    fn test_invalid_header_value() {
        let client = HttpClient::new("https://api.trongrid.io", Duration::from_secs(5)).unwrap();
        assert!(client.with_header("TRON-PRO-API-KEY", "bad\nvalue").is_err());
    }
}
