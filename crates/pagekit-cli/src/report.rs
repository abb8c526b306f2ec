//! Plain-text output

use pagekit_block::{Block, Document, TemplateString};
use pagekit_procedure::MutationState;
use pagekit_runtime::{FieldValue, RenderNode, RenderedForm, SubmitOutcome};
use pagekit_template::Template;
use std::fmt::{self, Write};

/// Indented outline of a compiled page
#[must_use]
pub fn outline(nodes: &[RenderNode]) -> String {
    Outline(nodes).to_string()
}

struct Outline<'a>(&'a [RenderNode]);

impl fmt::Display for Outline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|node| write_node(f, node, 0))
    }
}

fn write_node(out: &mut impl Write, node: &RenderNode, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    let path = node.path();
    match node {
        RenderNode::Text { text, .. } => writeln!(out, "{indent}{path} text {text:?}"),
        RenderNode::Card { title, description, .. } => match description {
            Some(description) => writeln!(out, "{indent}{path} card {title:?} ({description})"),
            None => writeln!(out, "{indent}{path} card {title:?}"),
        },
        RenderNode::Dialog { title, trigger_label, .. } => {
            writeln!(out, "{indent}{path} dialog {title:?} [{trigger_label}]")
        }
        RenderNode::TwoColumns { .. } => writeln!(out, "{indent}{path} two-columns"),
        RenderNode::QueryProvider { .. } => writeln!(out, "{indent}{path} query-provider"),
        RenderNode::Form(form) => writeln!(
            out,
            "{indent}{path} form {} [{}] {}",
            form.mutation.id,
            form.submit_label,
            state_label(&form.state)
        ),
        RenderNode::Field(field) => writeln!(
            out,
            "{indent}{path} {} {:?} = {}{}",
            field.key.block_type,
            field.label,
            field_value(&field.value),
            if field.key.optional { " (optional)" } else { "" }
        ),
        RenderNode::Suspended { pending, .. } => {
            writeln!(out, "{indent}{path} waiting on {}", pending.join(", "))
        }
        RenderNode::Error(boundary) => {
            writeln!(out, "{indent}{path} error[{}] {}", boundary.kind, boundary.message)
        }
    }?;
    for child in node.children() {
        write_node(out, child, depth + 1)?;
    }
    Ok(())
}

fn state_label(state: &MutationState) -> String {
    match state {
        MutationState::Idle => "idle".to_string(),
        MutationState::Submitting => "submitting".to_string(),
        MutationState::Success { status } => format!("success ({status})"),
        MutationState::Error { message } => format!("error: {message}"),
    }
}

fn field_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Checkbox { checked } => checked.to_string(),
        FieldValue::Number { .. } => value.to_value().to_string(),
        FieldValue::Select { options, value } => format!("{value:?} of [{}]", options.join(", ")),
        FieldValue::Input { value, .. }
        | FieldValue::String { value }
        | FieldValue::Textarea { value, .. }
        | FieldValue::Date { value } => format!("{value:?}"),
    }
}

/// One line per block: path, type and placeholder references
#[must_use]
pub fn path_listing(document: &Document) -> String {
    PathListing(document).to_string()
}

struct PathListing<'a>(&'a Document);

impl fmt::Display for PathListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (path, block_type) in self.0.paths() {
            let references = self
                .0
                .get(&path)
                .map(block_references)
                .unwrap_or_default();
            if references.is_empty() {
                writeln!(f, "{path}\t{block_type}")?;
            } else {
                writeln!(f, "{path}\t{block_type}\t{}", references.join(" "))?;
            }
        }
        Ok(())
    }
}

/// Placeholder paths in a block's own properties, children excluded
#[must_use]
pub fn block_references(block: &Block) -> Vec<String> {
    let mut templates: Vec<&TemplateString> = Vec::new();
    let mut variables: Vec<&str> = Vec::new();

    match block {
        Block::Text(text) => templates.push(&text.text),
        Block::Card(card) => {
            templates.push(&card.title);
            templates.extend(card.description.as_ref());
        }
        Block::Dialog(dialog) => templates.extend([&dialog.title, &dialog.trigger_label]),
        Block::TwoColumns(_) => {}
        Block::QueryProvider(provider) => {
            for query in &provider.queries {
                templates.push(&query.endpoint);
                templates.extend(query.query_params.iter().map(|kv| &kv.value));
            }
        }
        Block::Form(form) => {
            templates.extend(form.submit_label.as_ref());
            let mutation = &form.mutation;
            templates.push(&mutation.url);
            templates.extend(
                mutation
                    .query_params
                    .iter()
                    .chain(&mutation.request_headers)
                    .chain(&mutation.request_body)
                    .map(|kv| &kv.value),
            );
        }
        Block::FormCheckbox(field) => {
            if let pagekit_block::BooleanSource::Variable(path) = &field.default_value {
                variables.push(path);
            }
        }
        Block::FormNumberInput(field) => {
            if let pagekit_block::NumberSource::Variable(path) = &field.default_value {
                variables.push(path);
            }
        }
        Block::FormSelect(field) => {
            if let pagekit_block::StringArraySource::Variable(path) = &field.options {
                variables.push(path);
            }
            templates.push(&field.default_value);
        }
        Block::FormInput(field) => templates.push(&field.default_value),
        Block::FormStringInput(field) => templates.push(&field.default_value),
        Block::FormTextarea(field) => templates.push(&field.default_value),
        Block::FormDateInput(field) => templates.push(&field.default_value),
    }
    if let Some(base) = block.field() {
        templates.extend([&base.label, &base.description]);
    }

    let mut references: Vec<String> = variables.into_iter().map(str::to_string).collect();
    for template in templates {
        let parsed = Template::parse(template.as_str());
        references.extend(parsed.references().into_iter().map(|p| p.as_str().to_string()));
    }
    let mut seen = std::collections::HashSet::new();
    references.retain(|reference| seen.insert(reference.clone()));
    references
}

/// Human summary of a submission
#[must_use]
pub fn describe_outcome(form: &RenderedForm, outcome: &SubmitOutcome) -> String {
    match outcome {
        SubmitOutcome::Rejected { missing } => {
            let labels: Vec<String> = missing.iter().map(|id| form.label_of(id)).collect();
            format!("missing required fields: {}", labels.join(", "))
        }
        SubmitOutcome::Succeeded { status } => {
            format!("mutation \"{}\" succeeded ({status})", form.mutation.id)
        }
        SubmitOutcome::InFlight => {
            format!("mutation \"{}\" is already running", form.mutation.id)
        }
        SubmitOutcome::Failed { error } => error.to_string(),
        SubmitOutcome::Cancelled => "form unmounted before the mutation finished".to_string(),
    }
}
