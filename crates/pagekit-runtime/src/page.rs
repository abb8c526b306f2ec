//! Page session
//!
//! A [`Page`] is one view of a document: it owns the query cache, the
//! submission status of every form and the dismissed error boundaries. The
//! document itself is immutable while rendering; only
//! [`Page::replace_block`] changes its shape, and each such edit starts a new
//! document generation. Mutations started under an older generation have
//! their results discarded.

use crate::compile::{Compiler, FormStatus, PendingQuery};
use crate::config::PageConfig;
use crate::error::RuntimeError;
use crate::node::{RenderNode, RenderedForm};
use dashmap::{DashMap, DashSet};
use pagekit_block::{Block, BlockPath, Document};
use pagekit_form::{complete_submission, extract, Submission};
use pagekit_procedure::{MutationResponse, MutationState, ProcedureError, QueryClient, Transport};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use ulid::Ulid;

/// Unique page session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Ulid);

impl SessionId {
    /// Generate new session ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a form submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Required fields empty or omitted; no network call was made
    Rejected { missing: Vec<String> },
    /// Form already submitting; no network call was made
    InFlight,
    /// Mutation returned 2xx and cached queries were invalidated
    Succeeded { status: u16 },
    /// Mutation failed on the network boundary
    Failed { error: ProcedureError },
    /// Form unmounted or page closed before the mutation finished; its
    /// result was discarded
    Cancelled,
}

impl SubmitOutcome {
    /// Status on success, error otherwise
    ///
    /// # Errors
    /// Returns the validation, network or cancellation error
    pub fn into_result(self) -> Result<u16, RuntimeError> {
        match self {
            Self::Succeeded { status } => Ok(status),
            Self::Rejected { missing } => Err(RuntimeError::MissingFields(missing)),
            Self::InFlight => Err(RuntimeError::InFlight),
            Self::Failed { error } => Err(RuntimeError::Procedure(error)),
            Self::Cancelled => Err(RuntimeError::Cancelled),
        }
    }
}

/// Returns a form left `Submitting` to `Idle` when its submit ends early
///
/// Covers decoding errors and submit futures dropped mid-flight. Forms of a
/// newer document generation are left alone.
struct SubmitGuard<'p> {
    page: &'p Page,
    path: &'p BlockPath,
    generation: u64,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        let _document = self.page.document.read();
        if self.page.generation() != self.generation {
            return;
        }
        if let Some(mut status) = self.page.forms.get_mut(self.path) {
            if status.state.is_submitting() {
                status.state = MutationState::Idle;
            }
        }
    }
}

/// One live view of a document
pub struct Page {
    id: SessionId,
    config: PageConfig,
    document: RwLock<Arc<Document>>,
    client: QueryClient,
    forms: DashMap<BlockPath, FormStatus>,
    dismissed: DashSet<BlockPath>,
    pending: Mutex<Vec<PendingQuery>>,
    /// Bumped by every structural edit
    generation: AtomicU64,
    closed: AtomicBool,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("forms", &self.forms.len())
            .field("dismissed", &self.dismissed.len())
            .field("pending", &self.pending.lock().len())
            .field("generation", &self.generation())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Page {
    /// Create session over `transport`
    ///
    /// # Errors
    /// Returns [`RuntimeError::Document`] if the document has invalid or
    /// duplicate ids, [`RuntimeError::Config`] if the base URL is invalid
    pub fn new(
        document: Document,
        transport: Arc<dyn Transport>,
        config: PageConfig,
    ) -> Result<Self, RuntimeError> {
        document.validate()?;
        let client = QueryClient::new(transport, config.query_cache_capacity)
            .with_defaults(config.request_defaults()?);
        let id = SessionId::new();
        tracing::info!(session = %id, blocks = document.blocks.len(), "page session opened");

        Ok(Self {
            id,
            config,
            document: RwLock::new(Arc::new(document)),
            client,
            forms: DashMap::new(),
            dismissed: DashSet::new(),
            pending: Mutex::new(Vec::new()),
            generation: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        })
    }

    /// Create session over the production HTTP transport
    ///
    /// # Errors
    /// Returns [`RuntimeError::Config`] if the client or base URL is invalid
    pub fn connect(document: Document, config: PageConfig) -> Result<Self, RuntimeError> {
        let transport = config.transport()?;
        Self::new(document, Arc::new(transport), config)
    }

    /// Session ID
    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Current document
    #[must_use]
    pub fn document(&self) -> Arc<Document> {
        Arc::clone(&self.document.read())
    }

    /// Procedure client of this session
    #[inline]
    #[must_use]
    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    /// Document generation, bumped by every [`Page::replace_block`]
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Check if the session was closed
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// One compile pass without waiting on the network
    ///
    /// Providers whose queries are unsettled render as
    /// [`RenderNode::Suspended`]; their queries are driven by
    /// [`Page::settle`].
    pub async fn snapshot(&self) -> Vec<RenderNode> {
        let document = self.document();
        let compilation = Compiler::new(&self.client, &self.forms, &self.dismissed)
            .compile(&document.blocks)
            .await;
        *self.pending.lock() = compilation.pending;
        compilation.nodes
    }

    /// Drive every query the last snapshot waited on to completion
    pub async fn settle(&self) {
        let pending = std::mem::take(&mut *self.pending.lock());
        if pending.is_empty() {
            return;
        }
        tracing::debug!(session = %self.id, queries = pending.len(), "settling queries");
        futures::future::join_all(pending.into_iter().map(|pending| pending.query)).await;
    }

    /// Compile until no subtree is suspended
    ///
    /// Bounded by `max_render_passes`; a page still waiting after the last
    /// pass is returned with its suspended nodes.
    pub async fn refresh(&self) -> Vec<RenderNode> {
        let mut nodes = self.snapshot().await;
        for _ in 1..self.config.max_render_passes {
            if !nodes.iter().any(RenderNode::is_suspended) {
                break;
            }
            self.settle().await;
            nodes = self.snapshot().await;
        }
        if nodes.iter().any(RenderNode::is_suspended) {
            tracing::warn!(
                session = %self.id,
                passes = self.config.max_render_passes,
                "render pass limit reached with suspended subtrees"
            );
        }
        nodes
    }

    /// Mount the page and render it
    ///
    /// A mount makes failed queries retryable.
    #[tracing::instrument(skip(self), fields(session = %self.id))]
    pub async fn render(&self) -> Vec<RenderNode> {
        self.client.cache().evict_failed().await;
        let nodes = self.refresh().await;
        tracing::info!(nodes = nodes.len(), "page rendered");
        nodes
    }

    /// Run the submission handler of `form`
    ///
    /// Extracts the `this` namespace, rejects missing required fields
    /// without a network call, then issues the mutation. Fields the
    /// submission omits are treated as cleared. A form that is already
    /// submitting is refused. Success invalidates every cached query.
    ///
    /// # Errors
    /// Returns decoding errors, and template or URL errors raised while
    /// building the mutation request
    #[tracing::instrument(
        skip(self, form, submission),
        fields(session = %self.id, form = %form.path, mutation = %form.mutation.id)
    )]
    pub async fn submit(
        &self,
        form: &RenderedForm,
        submission: &Submission,
    ) -> Result<SubmitOutcome, RuntimeError> {
        if self.is_closed() {
            return Ok(SubmitOutcome::Cancelled);
        }
        let generation = {
            let _document = self.document.read();
            if !self.begin_submission(&form.path) {
                tracing::warn!("form already submitting");
                return Ok(SubmitOutcome::InFlight);
            }
            self.generation()
        };
        let _guard = SubmitGuard {
            page: self,
            path: &form.path,
            generation,
        };

        let extraction = extract(&complete_submission(submission, &form.fields)?)?;
        let missing = extraction.missing();
        if !missing.is_empty() {
            tracing::warn!(?missing, "submission rejected");
            self.forms.insert(
                form.path.clone(),
                FormStatus {
                    state: MutationState::Idle,
                    missing: missing.clone(),
                },
            );
            return Ok(SubmitOutcome::Rejected { missing });
        }

        let scope = form.scope.clone().with_this(extraction.variables());
        let result = self.client.execute_mutation(&form.mutation, &scope).await;
        self.finish_submission(&form.path, generation, result)
    }

    /// Move the form to `Submitting` unless it already is
    fn begin_submission(&self, path: &BlockPath) -> bool {
        let mut status = self.forms.entry(path.clone()).or_default();
        if status.state.is_submitting() {
            return false;
        }
        *status = FormStatus {
            state: MutationState::Submitting,
            missing: Vec::new(),
        };
        true
    }

    /// Apply a mutation result unless its form was unmounted meanwhile
    fn finish_submission(
        &self,
        path: &BlockPath,
        generation: u64,
        result: Result<MutationResponse, ProcedureError>,
    ) -> Result<SubmitOutcome, RuntimeError> {
        if self.is_closed() {
            tracing::info!("page closed, discarding mutation result");
            return Ok(SubmitOutcome::Cancelled);
        }

        // Edits bump the generation under the write lock
        let _document = self.document.read();
        if self.generation() != generation {
            if result.is_ok() {
                self.client.invalidate_all();
            }
            tracing::info!(generation, "form unmounted, discarding mutation result");
            return Ok(SubmitOutcome::Cancelled);
        }

        match result {
            Ok(response) => {
                self.client.invalidate_all();
                self.set_state(
                    path,
                    MutationState::Success {
                        status: response.status,
                    },
                );
                Ok(SubmitOutcome::Succeeded {
                    status: response.status,
                })
            }
            Err(error) if error.is_network() => {
                self.set_state(
                    path,
                    MutationState::Error {
                        message: error.to_string(),
                    },
                );
                Ok(SubmitOutcome::Failed { error })
            }
            Err(error) => {
                self.set_state(path, MutationState::Idle);
                Err(error.into())
            }
        }
    }

    fn set_state(&self, path: &BlockPath, state: MutationState) {
        self.forms.insert(
            path.clone(),
            FormStatus {
                state,
                missing: Vec::new(),
            },
        );
    }

    /// Hide the error at `path` until the next edit
    ///
    /// Applies to error boundaries and to a form's mutation error or
    /// rejected fields.
    pub fn dismiss(&self, path: &BlockPath) {
        self.dismissed.insert(path.clone());
        if let Some(mut status) = self.forms.get_mut(path) {
            if matches!(status.state, MutationState::Error { .. }) {
                status.state = MutationState::Idle;
            }
            status.missing.clear();
        }
        tracing::debug!(session = %self.id, %path, "error dismissed");
    }

    /// Replace the block at `path`, leaving siblings untouched
    ///
    /// Paths computed before the edit may no longer be valid; form status
    /// and dismissed errors are reset. Queries the replaced subtree was
    /// still waiting on are dropped, and mutations in flight have their
    /// results discarded.
    ///
    /// # Errors
    /// Returns [`RuntimeError::Edit`] if `path` does not address a block,
    /// [`RuntimeError::Document`] if the edited document has invalid ids
    pub async fn replace_block(&self, path: &BlockPath, block: Block) -> Result<(), RuntimeError> {
        {
            let mut document = self.document.write();
            let replaced = document.replace(path, block)?;
            replaced.validate()?;
            *document = Arc::new(replaced);
            self.generation.fetch_add(1, Ordering::AcqRel);
            self.forms.clear();
            self.dismissed.clear();
        }

        let unmounted = {
            let mut pending = self.pending.lock();
            let (unmounted, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut *pending)
                .into_iter()
                .partition(|query| query.provider == *path || path.is_ancestor_of(&query.provider));
            let unmounted: Vec<_> = unmounted
                .into_iter()
                .filter(|query| !kept.iter().any(|other| other.key == query.key))
                .map(|query| query.key)
                .collect();
            *pending = kept;
            unmounted
        };
        for key in &unmounted {
            self.client.cache().evict_pending(key).await;
        }

        tracing::info!(
            session = %self.id,
            %path,
            generation = self.generation(),
            dropped = unmounted.len(),
            "block replaced"
        );
        Ok(())
    }

    /// Tear the session down
    ///
    /// Pending queries lose their last reference; mutations still in flight
    /// complete on the network but their results are not applied.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.pending.lock().clear();
        tracing::info!(session = %self.id, "page session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagekit_test_utils::{document, profile_document, profile_transport};
    use serde_json::json;

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn outcome_into_result() {
        assert_eq!(SubmitOutcome::Succeeded { status: 201 }.into_result().unwrap(), 201);
        let err = SubmitOutcome::Rejected {
            missing: vec!["name".to_string()],
        }
        .into_result()
        .unwrap_err();
        assert_eq!(err.to_string(), "missing required fields: name");
        assert!(matches!(
            SubmitOutcome::Cancelled.into_result(),
            Err(RuntimeError::Cancelled)
        ));
        let err = SubmitOutcome::InFlight.into_result().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let config = PageConfig::new().with_base_url("::nope::");
        let err = Page::new(profile_document(), profile_transport(), config).unwrap_err();
        assert!(matches!(err, RuntimeError::Config(_)));
    }

    #[tokio::test]
    async fn replace_block_swaps_document() {
        let page = Page::new(
            document(json!([{ "type": "text", "text": "before" }])),
            profile_transport(),
            PageConfig::new(),
        )
        .unwrap();
        let path = BlockPath::root().append(0);

        page.replace_block(&path, pagekit_test_utils::block(json!({ "type": "text", "text": "after" })))
            .await
            .unwrap();
        assert_eq!(page.generation(), 1);

        let nodes = page.render().await;
        assert!(matches!(&nodes[0], RenderNode::Text { text, .. } if text == "after"));
    }

    #[tokio::test]
    async fn replace_block_rejects_bad_path() {
        let page = Page::new(profile_document(), profile_transport(), PageConfig::new()).unwrap();
        let err = page
            .replace_block(
                &BlockPath::root().append(9),
                pagekit_test_utils::block(json!({ "type": "text", "text": "x" })),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Edit(_)));
        assert_eq!(page.generation(), 0);
    }

    #[test]
    fn invalid_field_id_fails_construction() {
        let doc = document(json!([{
            "type": "form",
            "mutation": { "id": "save", "method": "POST", "url": "/save" },
            "blocks": [{ "type": "form-string-input", "id": "a.b", "label": "A", "defaultValue": "" }]
        }]));

        let err = Page::new(doc, profile_transport(), PageConfig::new()).unwrap_err();

        assert!(matches!(err, RuntimeError::Document(_)));
        assert_eq!(err.kind(), crate::ErrorKind::Edit);
    }

    #[tokio::test]
    async fn replace_block_validates_the_new_block() {
        let page = Page::new(profile_document(), profile_transport(), PageConfig::new()).unwrap();
        let path: BlockPath = "0.blocks.1.blocks.0".parse().unwrap();

        let err = page
            .replace_block(
                &path,
                pagekit_test_utils::block(json!({
                    "type": "form-string-input",
                    "id": "balance",
                    "label": "Clash",
                    "defaultValue": ""
                })),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RuntimeError::Document(_)));
        assert_eq!(page.generation(), 0);
        assert_eq!(page.document().as_ref(), &profile_document());
    }

    #[tokio::test]
    async fn second_submit_while_submitting_is_refused() {
        let transport = profile_transport();
        let page = Page::new(profile_document(), transport.clone(), PageConfig::new()).unwrap();
        let path: BlockPath = "0.blocks.1".parse().unwrap();
        assert!(page.begin_submission(&path));
        assert!(!page.begin_submission(&path));

        let nodes = page.render().await;
        let form = crate::find_form(&nodes, &path).cloned().unwrap();
        assert_eq!(form.state, MutationState::Submitting);

        let outcome = page.submit(&form, &form.defaults).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::InFlight);
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn close_is_idempotent() {
        let page = Page::new(profile_document(), profile_transport(), PageConfig::new()).unwrap();
        page.close();
        page.close();
        assert!(page.is_closed());
    }
}
