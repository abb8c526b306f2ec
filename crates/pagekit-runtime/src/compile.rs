//! Block compiler
//!
//! One pass over the document. Each block gets its path, is dispatched on
//! its variant and has its properties resolved against the scope visible at
//! that point. Query-providers request their queries and either expose the
//! results to their subtree or suspend it. Failures become error boundaries
//! at the smallest containing block; siblings always compile.

use crate::error::RuntimeError;
use crate::node::{collect_fields, ErrorBoundary, FieldValue, RenderNode, RenderedField, RenderedForm};
use dashmap::{DashMap, DashSet};
use futures::future::{BoxFuture, FutureExt};
use pagekit_block::{
    Block, BlockPath, CardBlock, DialogBlock, FieldBase, FormBlock, QueryProviderBlock, Slot,
    TwoColumnsBlock,
};
use pagekit_form::{default_submission, field_keys, FieldKey};
use pagekit_procedure::{MutationState, QueryClient, QueryKey, QueryState, SharedQuery};
use pagekit_template::{
    interpolate, normalize_iso_date, resolve_boolean_source, resolve_number_source,
    resolve_string_array_source, Scope, TemplateError,
};
use serde_json::{json, Value};

/// Submit label used when a form declares none
pub const DEFAULT_SUBMIT_LABEL: &str = "Submit";

/// Submission status of one form, kept across compile passes
#[derive(Debug, Clone, Default)]
pub(crate) struct FormStatus {
    pub(crate) state: MutationState,
    pub(crate) missing: Vec<String>,
}

/// Unsettled query and the provider waiting on it
#[derive(Clone)]
pub(crate) struct PendingQuery {
    pub(crate) provider: BlockPath,
    pub(crate) key: QueryKey,
    pub(crate) query: SharedQuery,
}

/// Result of one compile pass
pub(crate) struct Compilation {
    pub(crate) nodes: Vec<RenderNode>,
    /// Unsettled queries the suspended subtrees wait on
    pub(crate) pending: Vec<PendingQuery>,
}

pub(crate) struct Compiler<'p> {
    client: &'p QueryClient,
    forms: &'p DashMap<BlockPath, FormStatus>,
    dismissed: &'p DashSet<BlockPath>,
    pending: Vec<PendingQuery>,
}

impl<'p> Compiler<'p> {
    pub(crate) fn new(
        client: &'p QueryClient,
        forms: &'p DashMap<BlockPath, FormStatus>,
        dismissed: &'p DashSet<BlockPath>,
    ) -> Self {
        Self {
            client,
            forms,
            dismissed,
            pending: Vec::new(),
        }
    }

    /// Compile top-level blocks
    pub(crate) async fn compile(mut self, blocks: &[Block]) -> Compilation {
        let root = BlockPath::root();
        let scope = Scope::empty();
        let nodes = self.compile_list(blocks, &root, None, &scope).await;
        Compilation {
            nodes,
            pending: self.pending,
        }
    }

    fn compile_list<'b>(
        &'b mut self,
        blocks: &'b [Block],
        parent: &'b BlockPath,
        slot: Option<Slot>,
        scope: &'b Scope,
    ) -> BoxFuture<'b, Vec<RenderNode>> {
        async move {
            let mut nodes = Vec::with_capacity(blocks.len());
            for (index, block) in blocks.iter().enumerate() {
                let path = match slot {
                    Some(slot) => parent.child(slot, index),
                    None => parent.append(index),
                };
                if let Some(node) = self.compile_block(block, path, scope).await {
                    nodes.push(node);
                }
            }
            nodes
        }
        .boxed()
    }

    /// Compile one block, catching its failure at its boundary
    ///
    /// Returns `None` for a dismissed boundary.
    async fn compile_block(&mut self, block: &Block, path: BlockPath, scope: &Scope) -> Option<RenderNode> {
        let result = match block {
            Block::Text(text) => interpolate(&text.text, scope)
                .map(|text| RenderNode::Text {
                    path: path.clone(),
                    text,
                })
                .map_err(RuntimeError::from),
            Block::Card(card) => self.card(card, &path, scope).await,
            Block::Dialog(dialog) => self.dialog(dialog, &path, scope).await,
            Block::TwoColumns(columns) => self.two_columns(columns, &path, scope).await,
            Block::QueryProvider(provider) => self.query_provider(provider, &path, scope).await,
            Block::Form(form) => self.form(form, &path, scope).await,
            Block::FormCheckbox(field) => field_node(block, &path, &field.field, scope, |scope| {
                Ok(FieldValue::Checkbox {
                    checked: resolve_boolean_source(&field.default_value, scope)?,
                })
            }),
            Block::FormInput(field) => field_node(block, &path, &field.field, scope, |scope| {
                Ok(FieldValue::Input {
                    input_type: field.input_type,
                    value: interpolate(&field.default_value, scope)?,
                })
            }),
            Block::FormNumberInput(field) => field_node(block, &path, &field.field, scope, |scope| {
                Ok(FieldValue::Number {
                    value: resolve_number_source(&field.default_value, scope)?,
                    min: field.min,
                    max: field.max,
                    step: field.step,
                })
            }),
            Block::FormSelect(field) => field_node(block, &path, &field.field, scope, |scope| {
                Ok(FieldValue::Select {
                    options: resolve_string_array_source(&field.options, scope)?,
                    value: interpolate(&field.default_value, scope)?,
                })
            }),
            Block::FormStringInput(field) => field_node(block, &path, &field.field, scope, |scope| {
                Ok(FieldValue::String {
                    value: interpolate(&field.default_value, scope)?,
                })
            }),
            Block::FormTextarea(field) => field_node(block, &path, &field.field, scope, |scope| {
                Ok(FieldValue::Textarea {
                    value: interpolate(&field.default_value, scope)?,
                    rows: field.rows,
                })
            }),
            Block::FormDateInput(field) => field_node(block, &path, &field.field, scope, |scope| {
                Ok(FieldValue::Date {
                    value: normalize_iso_date(&interpolate(&field.default_value, scope)?)?,
                })
            }),
        };

        match result {
            Ok(node) => Some(node),
            Err(err) => self.boundary(path, &err),
        }
    }

    fn boundary(&self, path: BlockPath, err: &RuntimeError) -> Option<RenderNode> {
        if self.dismissed.contains(&path) {
            tracing::debug!(%path, error = %err, "error boundary dismissed");
            return None;
        }
        tracing::debug!(%path, kind = %err.kind(), error = %err, "block failed to compile");
        Some(RenderNode::Error(ErrorBoundary {
            path,
            kind: err.kind(),
            message: err.to_string(),
        }))
    }

    async fn card(&mut self, card: &CardBlock, path: &BlockPath, scope: &Scope) -> Result<RenderNode, RuntimeError> {
        let title = interpolate(&card.title, scope)?;
        let description = card
            .description
            .as_ref()
            .map(|d| interpolate(d, scope))
            .transpose()?;
        let children = self.compile_list(&card.blocks, path, Some(Slot::Blocks), scope).await;
        Ok(RenderNode::Card {
            path: path.clone(),
            title,
            description,
            children,
        })
    }

    async fn dialog(&mut self, dialog: &DialogBlock, path: &BlockPath, scope: &Scope) -> Result<RenderNode, RuntimeError> {
        let title = interpolate(&dialog.title, scope)?;
        let trigger_label = interpolate(&dialog.trigger_label, scope)?;
        let children = self.compile_list(&dialog.blocks, path, Some(Slot::Blocks), scope).await;
        Ok(RenderNode::Dialog {
            path: path.clone(),
            title,
            trigger_label,
            children,
        })
    }

    async fn two_columns(
        &mut self,
        columns: &TwoColumnsBlock,
        path: &BlockPath,
        scope: &Scope,
    ) -> Result<RenderNode, RuntimeError> {
        let left = self
            .compile_list(&columns.left_blocks, path, Some(Slot::LeftBlocks), scope)
            .await;
        let right = self
            .compile_list(&columns.right_blocks, path, Some(Slot::RightBlocks), scope)
            .await;
        Ok(RenderNode::TwoColumns {
            path: path.clone(),
            left,
            right,
        })
    }

    /// Request every query, then expose, suspend or fail the subtree
    ///
    /// Readiness is conjunctive: the subtree compiles only once all queries
    /// settled. The first failure replaces the subtree.
    async fn query_provider(
        &mut self,
        provider: &QueryProviderBlock,
        path: &BlockPath,
        scope: &Scope,
    ) -> Result<RenderNode, RuntimeError> {
        let mut entries = Vec::with_capacity(provider.queries.len());
        let mut pending = Vec::new();
        let mut waiting = Vec::new();
        let mut failure = None;

        for query in &provider.queries {
            let (key, shared) = self.client.request(query, scope).await?;
            match QueryState::of(&shared) {
                QueryState::Settled(body) => {
                    entries.push((query.id.clone(), json!({ "data": Value::clone(&body) })));
                }
                QueryState::Pending => {
                    pending.push(query.id.clone());
                    waiting.push(PendingQuery {
                        provider: path.clone(),
                        key,
                        query: shared,
                    });
                }
                QueryState::Failed(err) => {
                    if failure.is_none() {
                        failure = Some(err);
                    }
                }
            }
        }

        if let Some(err) = failure {
            return Err(RuntimeError::Procedure((*err).clone()));
        }
        if !pending.is_empty() {
            tracing::debug!(%path, ?pending, "query-provider suspended");
            self.pending.extend(waiting);
            return Ok(RenderNode::Suspended {
                path: path.clone(),
                pending,
            });
        }

        let scope = scope.extend_query(entries);
        let children = self
            .compile_list(&provider.blocks, path, Some(Slot::Blocks), &scope)
            .await;
        Ok(RenderNode::QueryProvider {
            path: path.clone(),
            children,
        })
    }

    async fn form(&mut self, form: &FormBlock, path: &BlockPath, scope: &Scope) -> Result<RenderNode, RuntimeError> {
        let submit_label = form
            .submit_label
            .as_ref()
            .map(|label| interpolate(label, scope))
            .transpose()?
            .unwrap_or_else(|| DEFAULT_SUBMIT_LABEL.to_string());
        let children = self.compile_list(&form.blocks, path, Some(Slot::Blocks), scope).await;

        // Fields whose default failed to resolve submit as empty
        let fields = field_keys(&form.blocks);
        let rendered: Vec<&RenderedField> = children.iter().flat_map(collect_fields).collect();
        let values: Vec<(FieldKey, Value)> = fields
            .iter()
            .map(|key| {
                let value = rendered
                    .iter()
                    .find(|field| field.key == *key)
                    .map_or_else(|| Value::String(String::new()), |field| field.value.to_value());
                (key.clone(), value)
            })
            .collect();
        let defaults = default_submission(values.iter().map(|(key, value)| (key, value)));

        let status = self
            .forms
            .get(path)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        Ok(RenderNode::Form(RenderedForm {
            path: path.clone(),
            mutation: form.mutation.clone(),
            submit_label,
            state: status.state,
            missing: status.missing,
            children,
            fields,
            defaults,
            scope: scope.clone(),
        }))
    }
}

fn field_node(
    block: &Block,
    path: &BlockPath,
    base: &FieldBase,
    scope: &Scope,
    value: impl FnOnce(&Scope) -> Result<FieldValue, TemplateError>,
) -> Result<RenderNode, RuntimeError> {
    let key = FieldKey::new(block.block_type(), base.id.clone(), base.optional);
    Ok(RenderNode::Field(RenderedField {
        path: path.clone(),
        name: key.encode(),
        label: interpolate(&base.label, scope)?,
        description: interpolate(&base.description, scope)?,
        value: value(scope)?,
        key,
    }))
}
