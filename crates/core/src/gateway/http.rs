use std::future::Future;

use reqwest::{Client, Url};
use serde_json::Value;

use super::{GatewayError, Transport};

/// Transport backed by `reqwest`, rooted at a single origin.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base: Url,
    client: Client,
}

impl HttpTransport {
    /// Build a transport for `base` (e.g. `http://localhost:8000`).
    pub fn new(base: &str) -> Result<Self, GatewayError> {
        let base = Url::parse(base).map_err(|err| GatewayError::InvalidBase {
            base: base.to_string(),
            reason: err.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(GatewayError::InvalidBase {
                base: base.to_string(),
                reason: "not a hierarchical URL".to_string(),
            });
        }
        let client = Client::builder()
            .user_agent(concat!("insightiq/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| GatewayError::Transport {
                path: String::new(),
                source,
            })?;
        Ok(Self { base, client })
    }

    /// `path` appended to the base path, so `https://host/iq` keeps its `/iq` prefix.
    fn url(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let prefix = self.base.path().trim_end_matches('/');
        let joined = format!("{prefix}/{}", path.trim_start_matches('/'));
        url.set_path(&joined);
        url
    }
}

impl Transport for HttpTransport {
    fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = Result<Value, GatewayError>> + Send {
        let request = self.client.get(self.url(path)).query(query);
        let path = path.to_string();
        async move { read_json(path, request).await }
    }

    fn post_json(
        &self,
        path: &str,
        body: Option<Value>,
    ) -> impl Future<Output = Result<Value, GatewayError>> + Send {
        let mut request = self.client.post(self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let path = path.to_string();
        async move { read_json(path, request).await }
    }
}

async fn read_json(path: String, request: reqwest::RequestBuilder) -> Result<Value, GatewayError> {
    let response = request
        .send()
        .await
        .map_err(|source| GatewayError::Transport {
            path: path.clone(),
            source,
        })?;
    let status = response.status();
    if !status.is_success() {
        return Err(GatewayError::Status {
            path,
            status: status.as_u16(),
        });
    }
    let text = response
        .text()
        .await
        .map_err(|source| GatewayError::Transport {
            path: path.clone(),
            source,
        })?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|source| GatewayError::Decode { path, source })
}
