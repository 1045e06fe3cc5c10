//! Request plumbing shared by every backend resource.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Url};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{ApiError, Result};

/// Connection settings for the backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api/v1/".to_string(),
            timeout: Duration::from_secs(15),
            user_agent: concat!("elibros-web/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Credentials attached to a backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth<'a> {
    Anonymous,
    Bearer(&'a str),
}

/// Client for the eLibros backend. Cheap to clone; clones share one
/// connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ApiError::Network {
                message: format!("failed to create HTTP client: {e}"),
                timeout: false,
            })?;

        Ok(Self {
            http,
            base_url: normalize_base(&config.base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying pool, shared with third-party lookups.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Whether the backend answers at all. Any HTTP status counts as up.
    pub async fn ping(&self) -> bool {
        match self.http.get(self.base_url.clone()).send().await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(error = %err, "backend ping failed");
                false
            }
        }
    }

    pub(crate) async fn get<T>(
        &self,
        path: &str,
        query: &[(&str, String)],
        auth: Auth<'_>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let request = self.request(Method::GET, path, auth)?.query(query);
        decode(self.execute(request, path).await?).await
    }

    pub(crate) async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        auth: Auth<'_>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(method, path, auth)?.json(body);
        decode(self.execute(request, path).await?).await
    }

    /// Sends a request whose response body is irrelevant (DELETE, logout...).
    pub(crate) async fn send_discarding<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        auth: Auth<'_>,
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.request(method, path, auth)?;
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request, path).await.map(|_| ())
    }

    fn request(&self, method: Method, path: &str, auth: Auth<'_>) -> Result<RequestBuilder> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Url {
                message: format!("{path}: {e}"),
            })?;

        let request = self.http.request(method, url);
        Ok(match auth {
            Auth::Anonymous => request,
            Auth::Bearer(token) => request.bearer_auth(token),
        })
    }

    async fn execute(&self, request: RequestBuilder, path: &str) -> Result<reqwest::Response> {
        let response = request.send().await.map_err(|err| {
            tracing::warn!(path, error = %err, "backend request failed");
            ApiError::from(err)
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(path, status = status.as_u16(), "backend request completed");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_status(status.as_u16(), &body);
        tracing::warn!(
            path,
            status = status.as_u16(),
            message = err.message(),
            "backend rejected request"
        );
        Err(err)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let bytes = response.bytes().await?;
    // 204 and empty bodies decode as JSON null so `()` and `Option<_>` work.
    let bytes: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
    serde_json::from_slice(bytes).map_err(|e| ApiError::Decode {
        message: e.to_string(),
    })
}

fn normalize_base(raw: &str) -> Result<Url> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw).map_err(|e| ApiError::Url {
        message: format!("{raw}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let url = normalize_base("http://backend:8000/api/v1").unwrap();
        assert_eq!(url.as_str(), "http://backend:8000/api/v1/");
        assert_eq!(
            url.join("livros/").unwrap().as_str(),
            "http://backend:8000/api/v1/livros/"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(ApiClient::new(&config), Err(ApiError::Url { .. })));
    }
}
