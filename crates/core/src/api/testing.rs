//! In-memory transport for exercising the client and store without a network.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::{
    error::{ApiError, ApiResult},
    transport::{ApiRequest, ApiResponse, Method, Transport},
};

type Route = (String, String);

#[derive(Default)]
struct Script {
    queued: VecDeque<ApiResult<ApiResponse>>,
    last: Option<ApiResult<ApiResponse>>,
}

/// Replays queued responses per `(method, path)` and records every request.
///
/// Once a route's queue drains, its last response is repeated.
/// Unscripted routes answer `404 {"message": "no route"}`.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<Route, Script>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and JSON body.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(method, path, Ok(ApiResponse { status, body }));
    }

    /// Queue a transport failure.
    pub fn fail(&self, method: Method, path: &str, detail: &str) {
        self.push(method, path, Err(ApiError::network(detail)));
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    fn push(&self, method: Method, path: &str, result: ApiResult<ApiResponse>) {
        self.scripts
            .lock()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .queued
            .push_back(result);
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let key = (request.method.to_string(), request.path.clone());
        self.requests.lock().push(request);

        let mut scripts = self.scripts.lock();
        let Some(script) = scripts.get_mut(&key) else {
            return not_found();
        };
        if let Some(next) = script.queued.pop_front() {
            script.last = Some(next.clone());
            return next;
        }
        script.last.clone().unwrap_or_else(not_found)
    }
}

fn not_found() -> ApiResult<ApiResponse> {
    Ok(ApiResponse {
        status: 404,
        body: serde_json::json!({ "message": "no route" }),
    })
}
