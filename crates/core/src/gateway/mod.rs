//! Remote data gateway: one typed call per API endpoint over a pluggable transport.

mod http;
#[cfg(test)]
pub(crate) mod testing;

use std::{future::Future, sync::Arc};

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::models::{
    AlertPayload, Competitor, CompetitorsResponse, Domain, DomainsResponse, FeedItem,
    FeedResponse, ForecastPoint, ForecastResponse, InsightReport, InsightsResponse,
    StatusResponse,
};

pub use http::HttpTransport;

/// Severity attached to alerts raised from the insight panel.
pub const ALERT_SEVERITY: &str = "info";
/// Message attached to alerts raised from the insight panel.
pub const ALERT_MESSAGE: &str = "User created alert from UI";

/// Failures surfaced by a gateway call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never completed.
    #[error("request to {path} failed: {source}")]
    Transport {
        /// Endpoint path.
        path: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("{path} returned HTTP {status}")]
    Status {
        /// Endpoint path.
        path: String,
        /// HTTP status code.
        status: u16,
    },
    /// The body was not the JSON shape we expected.
    #[error("malformed response from {path}: {source}")]
    Decode {
        /// Endpoint path.
        path: String,
        /// Parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// The configured base endpoint is not a valid URL.
    #[error("invalid API base {base:?}: {reason}")]
    InvalidBase {
        /// Configured origin.
        base: String,
        /// Parser message.
        reason: String,
    },
}

/// Raw JSON exchange with the API origin.
///
/// Query values are passed unencoded; implementations percent-encode them.
pub trait Transport: Send + Sync + 'static {
    /// Issue a GET and parse the body as JSON.
    fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = Result<Value, GatewayError>> + Send;

    /// Issue a POST with an optional JSON body and parse the reply.
    fn post_json(
        &self,
        path: &str,
        body: Option<Value>,
    ) -> impl Future<Output = Result<Value, GatewayError>> + Send;
}

/// Whose feed to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedScope {
    /// Every item for a domain.
    Domain(String),
    /// Items mentioning one company within a domain.
    Company {
        /// Company name.
        company: String,
        /// Domain slug.
        domain: String,
    },
}

impl FeedScope {
    fn query(&self, limit: usize) -> Vec<(&'static str, String)> {
        let mut query = Vec::with_capacity(3);
        match self {
            FeedScope::Domain(domain) => query.push(("domain", domain.clone())),
            FeedScope::Company { company, domain } => {
                query.push(("company", company.clone()));
                query.push(("domain", domain.clone()));
            }
        }
        query.push(("limit", limit.to_string()));
        query
    }
}

/// Typed front for every endpoint the client reads or writes.
pub struct Gateway<T> {
    transport: Arc<T>,
}

impl<T> Clone for Gateway<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> Gateway<T> {
    /// Wrap a transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `GET /api/health`.
    pub async fn health(&self) -> Result<String, GatewayError> {
        let response: StatusResponse = self.fetch("/api/health", Vec::new()).await?;
        Ok(response.status)
    }

    /// `GET /api/domains`.
    pub async fn domains(&self) -> Result<Vec<Domain>, GatewayError> {
        let response: DomainsResponse = self.fetch("/api/domains", Vec::new()).await?;
        Ok(response.domains)
    }

    /// `GET /api/competitors?domain`.
    pub async fn competitors(&self, domain: &str) -> Result<Vec<Competitor>, GatewayError> {
        let response: CompetitorsResponse = self
            .fetch("/api/competitors", vec![("domain", domain.to_string())])
            .await?;
        Ok(response.competitors)
    }

    /// `GET /api/csv-sample?domain`.
    pub async fn csv_sample(&self, domain: &str) -> Result<Vec<FeedItem>, GatewayError> {
        let response: FeedResponse = self
            .fetch("/api/csv-sample", vec![("domain", domain.to_string())])
            .await?;
        Ok(response.items)
    }

    /// `GET /api/news`.
    pub async fn news(
        &self,
        scope: &FeedScope,
        limit: usize,
    ) -> Result<Vec<FeedItem>, GatewayError> {
        let response: FeedResponse = self.fetch("/api/news", scope.query(limit)).await?;
        Ok(response.items)
    }

    /// `GET /api/social`.
    pub async fn social(
        &self,
        scope: &FeedScope,
        limit: usize,
    ) -> Result<Vec<FeedItem>, GatewayError> {
        let response: FeedResponse = self.fetch("/api/social", scope.query(limit)).await?;
        Ok(response.items)
    }

    /// `GET /api/insights?company&domain`.
    pub async fn insights(
        &self,
        company: &str,
        domain: &str,
    ) -> Result<InsightReport, GatewayError> {
        let response: InsightsResponse = self
            .fetch(
                "/api/insights",
                vec![
                    ("company", company.to_string()),
                    ("domain", domain.to_string()),
                ],
            )
            .await?;
        Ok(response.into())
    }

    /// `GET /api/forecast?company&days`.
    pub async fn forecast(
        &self,
        company: &str,
        days: u32,
    ) -> Result<Vec<ForecastPoint>, GatewayError> {
        let response: ForecastResponse = self
            .fetch(
                "/api/forecast",
                vec![("company", company.to_string()), ("days", days.to_string())],
            )
            .await?;
        Ok(response.forecast)
    }

    /// `POST /api/regenerate-csvs`, returning the server's status label.
    ///
    /// An empty reply yields an empty label.
    pub async fn regenerate_derived_data(&self) -> Result<String, GatewayError> {
        let path = "/api/regenerate-csvs";
        let value = self.transport.post_json(path, None).await?;
        if value.is_null() {
            return Ok(String::new());
        }
        let response: StatusResponse =
            serde_json::from_value(value).map_err(|source| GatewayError::Decode {
                path: path.to_string(),
                source,
            })?;
        Ok(response.status)
    }

    /// `POST /api/webhook/alerts` with a fixed severity and message.
    pub async fn create_alert(&self, title: &str) -> Result<AlertPayload, GatewayError> {
        let path = "/api/webhook/alerts";
        let payload = AlertPayload {
            title: title.to_string(),
            severity: ALERT_SEVERITY.to_string(),
            message: ALERT_MESSAGE.to_string(),
        };
        let body = serde_json::to_value(&payload).map_err(|source| GatewayError::Decode {
            path: path.to_string(),
            source,
        })?;
        self.transport.post_json(path, Some(body)).await?;
        Ok(payload)
    }

    async fn fetch<R: DeserializeOwned>(
        &self,
        path: &'static str,
        query: Vec<(&'static str, String)>,
    ) -> Result<R, GatewayError> {
        debug!(path, ?query, "GET");
        let value = self.transport.get_json(path, &query).await?;
        serde_json::from_value(value).map_err(|source| GatewayError::Decode {
            path: path.to_string(),
            source,
        })
    }
}
