use crate::utils::error::{OpenGinError, Result};
use crate::utils::validation::validate_url;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("opendata/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// JSON-over-HTTP access to one OpenGIN service rooted at `base_url`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(field_name: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        Self::with_client(build_client(timeout)?, field_name, base_url)
    }

    /// Shares an existing connection pool; `Client` clones are cheap.
    pub fn with_client(client: Client, field_name: &str, base_url: &str) -> Result<Self> {
        validate_url(field_name, base_url)?;
        let base_url = Url::parse(base_url).map_err(|e| OpenGinError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Appends percent-encoded path segments to the base URL.
    pub fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| OpenGinError::ConfigError {
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url_for(segments)?;
        tracing::debug!("GET {}", url);
        let response = self.send(self.client.get(url.clone()).query(query), &url).await?;
        read_json(response).await
    }

    pub async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url_for(segments)?;
        tracing::debug!("POST {}", url);
        let response = self.send(self.client.post(url.clone()).json(body), &url).await?;
        read_json(response).await
    }

    pub async fn put_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url_for(segments)?;
        tracing::debug!("PUT {}", url);
        let response = self.send(self.client.put(url.clone()).json(body), &url).await?;
        read_json(response).await
    }

    pub async fn delete(&self, segments: &[&str]) -> Result<()> {
        let url = self.url_for(segments)?;
        tracing::debug!("DELETE {}", url);
        self.send(self.client.delete(url.clone()), &url).await?;
        Ok(())
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("{} -> {}", url, status);

        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(OpenGinError::NotFound {
                path: url.path().to_string(),
            });
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!("OpenGIN request to {} failed with {}", url, status);
        Err(OpenGinError::ApiError {
            status: status.as_u16(),
            body,
        })
    }
}

/// An empty body decodes as JSON `null`, so `()` and `Option<T>` targets work.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_slice(b"null")?);
    }
    Ok(serde_json::from_slice(&bytes)?)
}
