//! Procedure client
//!
//! Owns the transport, the session's query cache and request defaults.
//! Queries are cached and single-flighted; mutations are one-shot.

use crate::cache::{QueryCache, QueryKey, QueryResult, QueryState, SharedQuery};
use crate::error::{FailureReason, ProcedureError};
use crate::request::{HttpRequest, RequestDefaults};
use crate::transport::Transport;
use futures::future::FutureExt;
use pagekit_block::{Mutation, Query};
use pagekit_template::Scope;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Successful mutation response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResponse {
    pub status: u16,
}

/// Lifecycle of a form's mutation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum MutationState {
    /// Not submitted yet
    #[default]
    Idle,
    /// Request in flight
    Submitting,
    /// 2xx received
    Success { status: u16 },
    /// Terminal failure, message shown to the user
    Error { message: String },
}

impl MutationState {
    /// Check if a request is in flight
    #[inline]
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }
}

/// Query and mutation executor for one page session
#[derive(Debug, Clone)]
pub struct QueryClient {
    transport: Arc<dyn Transport>,
    cache: QueryCache,
    defaults: Arc<RequestDefaults>,
}

impl QueryClient {
    /// Create client with an empty cache of `cache_capacity` entries
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, cache_capacity: u64) -> Self {
        Self {
            transport,
            cache: QueryCache::new(cache_capacity),
            defaults: Arc::new(RequestDefaults::default()),
        }
    }

    /// With request defaults
    #[inline]
    #[must_use]
    pub fn with_defaults(mut self, defaults: RequestDefaults) -> Self {
        self.defaults = Arc::new(defaults);
        self
    }

    /// Request defaults in use
    #[inline]
    #[must_use]
    pub fn defaults(&self) -> &RequestDefaults {
        &self.defaults
    }

    /// Query cache of this session
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Resolve `query` to its request and cache key
    ///
    /// # Errors
    /// Returns template or URL failures
    pub fn resolve_query(
        &self,
        query: &Query,
        scope: &Scope,
    ) -> Result<(QueryKey, HttpRequest), ProcedureError> {
        let request = self.defaults.query_request(query, scope)?;
        Ok((QueryKey::new(query.id.clone(), request.url.clone()), request))
    }

    /// Shared future for `query`, issuing the GET on first reference
    ///
    /// The returned future only makes progress while polled.
    ///
    /// # Errors
    /// Returns template or URL failures raised while resolving the request
    pub async fn request(
        &self,
        query: &Query,
        scope: &Scope,
    ) -> Result<(QueryKey, SharedQuery), ProcedureError> {
        let (key, request) = self.resolve_query(query, scope)?;
        let transport = Arc::clone(&self.transport);
        let fetch_key = key.clone();
        let fetch = async move {
            execute_query(transport.as_ref(), &fetch_key, request)
                .await
                .map_err(Arc::new)
        }
        .boxed();

        let shared = self.cache.get_or_insert(key.clone(), fetch).await;
        Ok((key, shared))
    }

    /// Resolve, issue and await `query`
    ///
    /// # Errors
    /// Returns resolution failures or the query's terminal failure
    pub async fn fetch(&self, query: &Query, scope: &Scope) -> QueryResult {
        let (_, shared) = self.request(query, scope).await.map_err(Arc::new)?;
        shared.await
    }

    /// State of a previously requested query
    pub async fn state(&self, key: &QueryKey) -> Option<QueryState> {
        self.cache.state(key).await
    }

    /// Invalidate every cached query result
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Issue `mutation` without touching the cache
    ///
    /// `scope` should carry the submitting form's `this` namespace.
    ///
    /// # Errors
    /// Returns resolution failures, transport failures, or a non-2xx status
    #[tracing::instrument(skip(self, mutation, scope), fields(id = %mutation.id, method = %mutation.method))]
    pub async fn execute_mutation(
        &self,
        mutation: &Mutation,
        scope: &Scope,
    ) -> Result<MutationResponse, ProcedureError> {
        let request = self.defaults.mutation_request(mutation, scope)?;
        tracing::info!(url = %request.url, "issuing mutation");

        let response = self.transport.execute(request).await.map_err(|err| {
            tracing::warn!(error = %err, "mutation transport failed");
            ProcedureError::mutation(&mutation.id, FailureReason::Transport(err.message))
        })?;

        if !response.is_success() {
            tracing::warn!(status = response.status, "mutation rejected");
            return Err(ProcedureError::mutation(
                &mutation.id,
                FailureReason::Status {
                    status: response.status,
                    text: response.status_text,
                },
            ));
        }

        tracing::info!(status = response.status, "mutation succeeded");
        Ok(MutationResponse {
            status: response.status,
        })
    }

    /// Issue `mutation` and invalidate every cached query on success
    ///
    /// # Errors
    /// See [`QueryClient::execute_mutation`]
    pub async fn mutate(
        &self,
        mutation: &Mutation,
        scope: &Scope,
    ) -> Result<MutationResponse, ProcedureError> {
        let response = self.execute_mutation(mutation, scope).await?;
        self.invalidate_all();
        Ok(response)
    }
}

#[tracing::instrument(skip(transport, key, request), fields(id = %key.id, url = %key.url))]
async fn execute_query(
    transport: &dyn Transport,
    key: &QueryKey,
    request: HttpRequest,
) -> Result<Arc<Value>, ProcedureError> {
    tracing::info!("issuing query");
    let fail = |reason: FailureReason| {
        tracing::warn!(%reason, "query failed");
        ProcedureError::query(&key.id, &key.url, reason)
    };

    let response = transport
        .execute(request)
        .await
        .map_err(|err| fail(FailureReason::Transport(err.message)))?;

    if !response.is_success() {
        return Err(fail(FailureReason::Status {
            status: response.status,
            text: response.status_text,
        }));
    }

    let body: Value = serde_json::from_str(&response.body)
        .map_err(|err| fail(FailureReason::InvalidJson(err.to_string())))?;

    tracing::debug!("query settled");
    Ok(Arc::new(body))
}
