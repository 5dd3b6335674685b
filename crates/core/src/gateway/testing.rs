//! Recording transport used by the crate's tests.

use std::{collections::HashMap, future::Future, sync::Arc};

use parking_lot::Mutex;
use serde_json::Value;

use super::{GatewayError, Transport};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Answers each path with a canned JSON body; unknown paths get a 404.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeTransport {
    routes: Arc<Mutex<HashMap<String, Value>>>,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, path: &str, body: Value) -> Self {
        self.set_route(path, body);
        self
    }

    pub fn set_route(&self, path: &str, body: Value) {
        self.routes.lock().insert(path.to_string(), body);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.lock().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.log
            .lock()
            .iter()
            .filter(|request| request.path == path)
            .cloned()
            .collect()
    }

    pub fn last_request(&self, path: &str) -> Option<RecordedRequest> {
        self.requests_to(path).pop()
    }

    fn answer(
        &self,
        method: &'static str,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> Result<Value, GatewayError> {
        self.log.lock().push(RecordedRequest {
            method,
            path: path.to_string(),
            query,
            body,
        });
        self.routes
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| GatewayError::Status {
                path: path.to_string(),
                status: 404,
            })
    }
}

impl Transport for FakeTransport {
    fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = Result<Value, GatewayError>> + Send {
        let query = query
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        let result = self.answer("GET", path, query, None);
        async move {
            tokio::task::yield_now().await;
            result
        }
    }

    fn post_json(
        &self,
        path: &str,
        body: Option<Value>,
    ) -> impl Future<Output = Result<Value, GatewayError>> + Send {
        let result = self.answer("POST", path, Vec::new(), body);
        async move { result }
    }
}
