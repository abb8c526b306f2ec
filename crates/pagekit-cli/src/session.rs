//! Loading documents and driving a page

use anyhow::{bail, Context, Result};
use pagekit_block::{BlockPath, Document};
use pagekit_runtime::{find_form, Page, PageConfig, RenderedForm, RuntimeError, SubmitOutcome};
use std::path::Path;

/// Read, parse and validate a document file
///
/// # Errors
/// Returns an error if the file is unreadable, malformed or has invalid ids
pub fn load_document(path: &Path) -> Result<Document> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("could not read document {}", path.display()))?;
    let document = Document::from_json(&raw)
        .with_context(|| format!("could not parse document {}", path.display()))?;
    document
        .validate()
        .with_context(|| format!("document {} failed validation", path.display()))?;
    tracing::debug!(path = %path.display(), blocks = document.blocks.len(), "document loaded");
    Ok(document)
}

/// Configuration from `path`, or defaults
///
/// # Errors
/// Returns an error if the file is unreadable or malformed
pub fn load_config(path: Option<&Path>) -> Result<PageConfig> {
    match path {
        Some(path) => PageConfig::load(path)
            .with_context(|| format!("could not load config {}", path.display())),
        None => Ok(PageConfig::default()),
    }
}

/// Parse a `name=value` field assignment
///
/// # Errors
/// Returns a message if there is no `=` or the name is empty
pub fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got \"{raw}\"")),
    }
}

/// Render the page, fill the form at `path` and submit it
///
/// Fields not assigned keep their rendered defaults.
///
/// # Errors
/// Returns an error if `path` is not a form, a field id is unknown, or the
/// submission itself errors
pub async fn submit_form(
    page: &Page,
    path: &BlockPath,
    fields: &[(String, String)],
) -> Result<(RenderedForm, SubmitOutcome)> {
    let nodes = page.render().await;
    let form = find_form(&nodes, path)
        .cloned()
        .ok_or_else(|| RuntimeError::NotAForm(path.clone()))?;

    let mut submission = form.defaults.clone();
    for (id, value) in fields {
        if !submission.set_field(id, value.as_str()) {
            bail!("form at \"{path}\" has no field \"{id}\"");
        }
    }

    let outcome = page
        .submit(&form, &submission)
        .await
        .with_context(|| format!("could not submit form at \"{path}\""))?;
    Ok((form, outcome))
}
