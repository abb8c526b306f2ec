use pagekit_block::BlockPath;
use pagekit_cli::{describe_outcome, load_document, outline, submit_form};
use pagekit_procedure::Method;
use pagekit_runtime::{Page, PageConfig, SubmitOutcome};
use pagekit_test_utils::{profile_document, profile_transport};
use pretty_assertions::assert_eq;
use std::io::Write;

fn profile_page() -> (Page, std::sync::Arc<pagekit_test_utils::ScriptedTransport>) {
    let transport = profile_transport();
    let page = Page::new(profile_document(), transport.clone(), PageConfig::new()).unwrap();
    (page, transport)
}

#[test]
fn loads_and_validates_documents() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "blocks": [{{ "type": "text", "text": "hi" }}] }}"#).unwrap();
    assert_eq!(load_document(file.path()).unwrap().blocks.len(), 1);

    let mut duplicate = tempfile::NamedTempFile::new().unwrap();
    write!(
        duplicate,
        r#"{{ "blocks": [{{
            "type": "form",
            "mutation": {{ "id": "m", "method": "POST", "url": "/x" }},
            "blocks": [
                {{ "type": "form-string-input", "id": "a", "label": "A", "defaultValue": "" }},
                {{ "type": "form-string-input", "id": "a", "label": "A", "defaultValue": "" }}
            ]
        }}] }}"#
    )
    .unwrap();
    let err = load_document(duplicate.path()).unwrap_err();
    assert!(format!("{err:#}").contains("duplicate field id 'a'"));
}

#[tokio::test]
async fn outline_shows_resolved_page() {
    let (page, _) = profile_page();
    let text = outline(&page.render().await);

    assert_eq!(
        text.lines().collect::<Vec<_>>(),
        vec![
            "0 query-provider",
            "  0.blocks.0 card \"Profile\"",
            "    0.blocks.0.blocks.0 text \"Hello Ada\"",
            "  0.blocks.1 form saveUser [Submit] idle",
            "    0.blocks.1.blocks.0 form-string-input \"Name\" = \"\"",
            "    0.blocks.1.blocks.1 form-number-input \"Balance\" = 19.99",
            "    0.blocks.1.blocks.2 form-checkbox \"Notify\" = true (optional)",
        ]
    );
}

#[tokio::test]
async fn submit_reports_missing_labels() {
    let (page, transport) = profile_page();
    let path: BlockPath = "0.blocks.1".parse().unwrap();

    let (form, outcome) = submit_form(&page, &path, &[]).await.unwrap();

    assert_eq!(describe_outcome(&form, &outcome), "missing required fields: Name");
    assert_eq!(transport.calls_to(Method::Patch, "/users/1"), 0);
}

#[tokio::test]
async fn submit_fills_fields_by_id() {
    let (page, transport) = profile_page();
    let path: BlockPath = "0.blocks.1".parse().unwrap();

    let (form, outcome) = submit_form(&page, &path, &[("name".to_string(), "Grace".to_string())])
        .await
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::Succeeded { status: 200 });
    assert_eq!(describe_outcome(&form, &outcome), "mutation \"saveUser\" succeeded (200)");
    assert_eq!(
        describe_outcome(&form, &SubmitOutcome::InFlight),
        "mutation \"saveUser\" is already running"
    );
    assert_eq!(transport.calls_to(Method::Patch, "/users/1"), 1);
}

#[tokio::test]
async fn submit_rejects_unknown_targets() {
    let (page, _) = profile_page();

    let err = submit_form(&page, &"0.blocks.0".parse().unwrap(), &[])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "block at \"0.blocks.0\" is not a form");

    let err = submit_form(
        &page,
        &"0.blocks.1".parse().unwrap(),
        &[("nickname".to_string(), "G".to_string())],
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "form at \"0.blocks.1\" has no field \"nickname\"");
}
