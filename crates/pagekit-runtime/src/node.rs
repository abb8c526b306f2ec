//! Compiled page tree
//!
//! Output of one compile pass: every property resolved, every error caught
//! at the smallest containing block.

use crate::error::ErrorKind;
use pagekit_block::{BlockPath, InputType, Mutation};
use pagekit_form::{FieldKey, Submission};
use pagekit_procedure::MutationState;
use pagekit_template::Scope;
use serde::Serialize;
use serde_json::Value;

/// Node of a compiled page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RenderNode {
    Text {
        path: BlockPath,
        text: String,
    },
    Card {
        path: BlockPath,
        title: String,
        description: Option<String>,
        children: Vec<RenderNode>,
    },
    Dialog {
        path: BlockPath,
        title: String,
        trigger_label: String,
        children: Vec<RenderNode>,
    },
    TwoColumns {
        path: BlockPath,
        left: Vec<RenderNode>,
        right: Vec<RenderNode>,
    },
    QueryProvider {
        path: BlockPath,
        children: Vec<RenderNode>,
    },
    Form(RenderedForm),
    Field(RenderedField),
    /// Subtree waiting on unsettled queries
    Suspended {
        path: BlockPath,
        pending: Vec<String>,
    },
    /// Dismissible error boundary
    Error(ErrorBoundary),
}

impl RenderNode {
    /// Path of the block this node was compiled from
    #[must_use]
    pub fn path(&self) -> &BlockPath {
        match self {
            Self::Text { path, .. }
            | Self::Card { path, .. }
            | Self::Dialog { path, .. }
            | Self::TwoColumns { path, .. }
            | Self::QueryProvider { path, .. }
            | Self::Suspended { path, .. } => path,
            Self::Form(form) => &form.path,
            Self::Field(field) => &field.path,
            Self::Error(boundary) => &boundary.path,
        }
    }

    /// Direct children in slot order
    #[must_use]
    pub fn children(&self) -> Vec<&RenderNode> {
        match self {
            Self::Card { children, .. }
            | Self::Dialog { children, .. }
            | Self::QueryProvider { children, .. } => children.iter().collect(),
            Self::Form(form) => form.children.iter().collect(),
            Self::TwoColumns { left, right, .. } => left.iter().chain(right).collect(),
            Self::Text { .. } | Self::Field(_) | Self::Suspended { .. } | Self::Error(_) => {
                Vec::new()
            }
        }
    }

    /// Node at `path` in this subtree
    #[must_use]
    pub fn find(&self, path: &BlockPath) -> Option<&RenderNode> {
        if self.path() == path {
            return Some(self);
        }
        if !self.path().is_ancestor_of(path) {
            return None;
        }
        self.children().into_iter().find_map(|child| child.find(path))
    }

    /// Check if any node of this subtree is suspended
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        matches!(self, Self::Suspended { .. }) || self.children().iter().any(|c| c.is_suspended())
    }

    /// Every error boundary of this subtree, depth-first
    #[must_use]
    pub fn errors(&self) -> Vec<&ErrorBoundary> {
        match self {
            Self::Error(boundary) => vec![boundary],
            _ => self.children().into_iter().flat_map(RenderNode::errors).collect(),
        }
    }
}

/// Find the node at `path` in a compiled page
#[must_use]
pub fn find_node<'a>(nodes: &'a [RenderNode], path: &BlockPath) -> Option<&'a RenderNode> {
    nodes.iter().find_map(|node| node.find(path))
}

/// Find the form at `path` in a compiled page
#[must_use]
pub fn find_form<'a>(nodes: &'a [RenderNode], path: &BlockPath) -> Option<&'a RenderedForm> {
    match find_node(nodes, path)? {
        RenderNode::Form(form) => Some(form),
        _ => None,
    }
}

/// Error caught at a block boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBoundary {
    pub path: BlockPath,
    pub kind: ErrorKind,
    pub message: String,
}

/// Compiled form with everything its submission handler needs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedForm {
    pub path: BlockPath,
    pub mutation: Mutation,
    pub submit_label: String,
    pub state: MutationState,
    /// Ids rejected by the last submission
    pub missing: Vec<String>,
    pub children: Vec<RenderNode>,
    /// Fields owned by this form, in document order
    pub fields: Vec<FieldKey>,
    /// What submitting the form unchanged would send
    pub defaults: Submission,
    /// `query` namespace visible where the form was compiled
    #[serde(skip)]
    pub scope: Scope,
}

impl RenderedForm {
    /// Label of field `id`, falling back to the id
    #[must_use]
    pub fn label_of(&self, id: &str) -> String {
        self.children
            .iter()
            .flat_map(collect_fields)
            .find(|field| field.key.id == id)
            .map_or_else(|| id.to_string(), |field| field.label.clone())
    }
}

/// Rendered fields of a form body, not descending into nested forms
pub(crate) fn collect_fields(node: &RenderNode) -> Vec<&RenderedField> {
    match node {
        RenderNode::Field(field) => vec![field],
        RenderNode::Form(_) => Vec::new(),
        _ => node.children().into_iter().flat_map(collect_fields).collect(),
    }
}

/// Compiled form field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedField {
    pub path: BlockPath,
    /// Transportable name of the field
    pub name: String,
    pub key: FieldKey,
    pub label: String,
    pub description: String,
    pub value: FieldValue,
}

/// Resolved default value of a field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FieldValue {
    Checkbox {
        checked: bool,
    },
    Input {
        input_type: InputType,
        value: String,
    },
    Number {
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
    },
    Select {
        options: Vec<String>,
        value: String,
    },
    String {
        value: String,
    },
    Textarea {
        value: String,
        rows: Option<u32>,
    },
    Date {
        value: String,
    },
}

impl FieldValue {
    /// Value as the form engine would coerce it from a submission
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Checkbox { checked } => Value::Bool(*checked),
            Self::Number { value, .. } => {
                serde_json::Number::from_f64(*value).map_or(Value::Null, Value::Number)
            }
            Self::Input { value, .. }
            | Self::Select { value, .. }
            | Self::String { value }
            | Self::Textarea { value, .. }
            | Self::Date { value } => Value::String(value.clone()),
        }
    }
}
