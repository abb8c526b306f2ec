//! Testing utilities for pagekit workspace
//!
//! Shared test helpers, fixtures, and a scripted in-memory transport.

#![allow(missing_docs)]

use async_trait::async_trait;
use pagekit_block::{Block, Document};
use pagekit_procedure::{HttpRequest, HttpResponse, Method, Transport, TransportError};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Scripted answer for a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Response(HttpResponse),
    Error(String),
}

impl Reply {
    /// 200 with a JSON body
    pub fn json(body: Value) -> Self {
        Self::Response(HttpResponse::new(200, "OK", body.to_string()))
    }

    /// Status with an empty body
    pub fn status(status: u16, text: &str) -> Self {
        Self::Response(HttpResponse::new(status, text, ""))
    }

    /// 200 with a raw body
    pub fn raw(body: &str) -> Self {
        Self::Response(HttpResponse::new(200, "OK", body))
    }

    /// Transport failure
    pub fn error(message: &str) -> Self {
        Self::Error(message.to_string())
    }
}

/// In-memory transport answering from a route table
///
/// Every request is recorded before it is answered. Each route holds a
/// queue of replies; the last reply of a queue repeats. Unknown routes get
/// `404 Not Found`. While held, requests are recorded but not answered until
/// [`ScriptedTransport::release`].
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    requests: Mutex<Vec<HttpRequest>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue `reply` for `method url`
    pub fn on(&self, method: Method, url: &str, reply: Reply) -> &Self {
        self.routes
            .lock()
            .entry((method, url.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    /// Queue a JSON reply for `GET url`
    pub fn on_get(&self, url: &str, body: Value) -> &Self {
        self.on(Method::Get, url, Reply::json(body))
    }

    /// Hold every response until released
    pub fn hold(&self) {
        *self.gate.lock() = Some(Arc::new(Semaphore::new(0)));
    }

    /// Answer held and future requests
    pub fn release(&self) {
        if let Some(gate) = self.gate.lock().take() {
            gate.close();
        }
    }

    /// Every request received, in order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Number of requests received for `method url`
    pub fn calls_to(&self, method: Method, url: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    fn next_reply(&self, method: Method, url: &str) -> Reply {
        let mut routes = self.routes.lock();
        let Some(queue) = routes.get_mut(&(method, url.to_string())) else {
            return Reply::status(404, "Not Found");
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap_or_else(|| Reply::status(404, "Not Found"))
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let (method, url) = (request.method, request.url.clone());
        self.requests.lock().push(request);

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            // Closed on release
            let _ = gate.acquire().await;
        }

        match self.next_reply(method, &url) {
            Reply::Response(response) => Ok(response),
            Reply::Error(message) => Err(TransportError::new(message)),
        }
    }
}

/// Parse a block from JSON
pub fn block(value: Value) -> Block {
    serde_json::from_value(value).unwrap()
}

/// Parse a document from a JSON list of blocks
pub fn document(blocks: Value) -> Document {
    serde_json::from_value(json!({ "blocks": blocks })).unwrap()
}

/// Body served for `GET /users/1` by [`profile_transport`]
pub fn user_body() -> Value {
    json!({
        "name": "Ada",
        "email": "ada@example.com",
        "accountBalance": 19.99,
        "active": true,
        "roles": ["admin", "editor"]
    })
}

/// Profile page: a query-provider around a greeting card and an edit form
///
/// Paths:
/// - `0`: query-provider (`user` from `/users/1`)
/// - `0.blocks.0`: card greeting the user
/// - `0.blocks.1`: form `saveUser` (`PATCH /users/1`)
/// - `0.blocks.1.blocks.0`: required string input `name`, empty default
/// - `0.blocks.1.blocks.1`: number input `balance` bound to the account balance
/// - `0.blocks.1.blocks.2`: optional checkbox `notify`, checked
pub fn profile_document() -> Document {
    document(json!([{
        "type": "query-provider",
        "queries": [{ "id": "user", "endpoint": "/users/1" }],
        "blocks": [
            {
                "type": "card",
                "title": "Profile",
                "blocks": [{ "type": "text", "text": "Hello {{query.user.data.name}}" }]
            },
            {
                "type": "form",
                "mutation": {
                    "id": "saveUser",
                    "method": "PATCH",
                    "url": "/users/1",
                    "requestBody": [
                        { "key": "name", "value": "{{this.name}}" },
                        { "key": "balance", "value": "{{this.balance}}" }
                    ]
                },
                "blocks": [
                    { "type": "form-string-input", "id": "name", "label": "Name", "defaultValue": "" },
                    {
                        "type": "form-number-input",
                        "id": "balance",
                        "label": "Balance",
                        "defaultValue": { "type": "variable", "value": "query.user.data.accountBalance" }
                    },
                    {
                        "type": "form-checkbox",
                        "id": "notify",
                        "label": "Notify",
                        "optional": true,
                        "defaultValue": { "type": "boolean", "value": true }
                    }
                ]
            }
        ]
    }]))
}

/// Transport serving [`user_body`] and accepting the profile mutation
pub fn profile_transport() -> Arc<ScriptedTransport> {
    let transport = ScriptedTransport::new();
    transport
        .on_get("/users/1", user_body())
        .on(Method::Patch, "/users/1", Reply::status(200, "OK"));
    transport
}
