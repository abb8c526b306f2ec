use pagekit_block::{BlockPath, Slot};
use pagekit_procedure::{Method, QueryState};
use pagekit_runtime::{find_node, ErrorKind, FieldValue, Page, PageConfig, RenderNode};
use pagekit_test_utils::{block, document, profile_document, profile_transport, user_body, Reply, ScriptedTransport};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn page(doc: pagekit_block::Document, transport: &Arc<ScriptedTransport>) -> Page {
    Page::new(doc, transport.clone(), PageConfig::new()).unwrap()
}

fn field_value(nodes: &[RenderNode], path: &str) -> FieldValue {
    match find_node(nodes, &path.parse().unwrap()) {
        Some(RenderNode::Field(field)) => field.value.clone(),
        other => panic!("expected field at {path}, found {other:?}"),
    }
}

#[tokio::test]
async fn literal_checkbox_renders_without_network() {
    let transport = ScriptedTransport::new();
    let page = page(
        document(json!([{
            "type": "form",
            "mutation": { "id": "accept", "method": "POST", "url": "/terms" },
            "blocks": [{
                "type": "form-checkbox",
                "id": "terms",
                "label": "Accept",
                "defaultValue": { "type": "boolean", "value": true }
            }]
        }])),
        &transport,
    );

    let nodes = page.render().await;

    assert_eq!(field_value(&nodes, "0.blocks.0"), FieldValue::Checkbox { checked: true });
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn number_default_comes_from_query() {
    let transport = profile_transport();
    let page = page(profile_document(), &transport);

    let nodes = page.render().await;

    assert_eq!(
        field_value(&nodes, "0.blocks.1.blocks.1"),
        FieldValue::Number { value: 19.99, min: None, max: None, step: None }
    );
    match find_node(&nodes, &"0.blocks.0.blocks.0".parse().unwrap()) {
        Some(RenderNode::Text { text, .. }) => assert_eq!(text, "Hello Ada"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(transport.calls_to(Method::Get, "/users/1"), 1);
}

#[tokio::test]
async fn non_number_default_is_caught_at_the_field() {
    let transport = ScriptedTransport::new();
    let mut body = user_body();
    body["accountBalance"] = json!("lots");
    transport.on_get("/users/1", body);
    let page = page(profile_document(), &transport);

    let nodes = page.render().await;

    let errors: Vec<_> = nodes.iter().flat_map(RenderNode::errors).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path.as_str(), "0.blocks.1.blocks.1");
    assert_eq!(errors[0].kind, ErrorKind::Type);
    assert_eq!(
        errors[0].message,
        "variable \"query.user.data.accountBalance\" is pointing to a value that is not a number"
    );
    // Siblings still compile
    assert!(matches!(
        find_node(&nodes, &"0.blocks.1.blocks.0".parse().unwrap()),
        Some(RenderNode::Field(_))
    ));
    assert_eq!(
        field_value(&nodes, "0.blocks.1.blocks.2"),
        FieldValue::Checkbox { checked: true }
    );
}

#[tokio::test]
async fn unresolved_reference_outside_provider() {
    let transport = ScriptedTransport::new();
    let page = page(
        document(json!([
            { "type": "text", "text": "Hi {{query.user.data.name}}" },
            { "type": "text", "text": "still here" }
        ])),
        &transport,
    );

    let nodes = page.render().await;

    assert!(matches!(&nodes[0], RenderNode::Error(e) if e.kind == ErrorKind::Reference));
    assert!(matches!(&nodes[1], RenderNode::Text { text, .. } if text == "still here"));
}

#[tokio::test]
async fn provider_suspends_until_queries_settle() {
    let transport = profile_transport();
    transport.hold();
    let page = Arc::new(page(profile_document(), &transport));

    let nodes = page.snapshot().await;
    assert!(matches!(&nodes[0], RenderNode::Suspended { pending, .. } if pending == &["user"]));

    let rendering = {
        let page = Arc::clone(&page);
        tokio::spawn(async move { page.refresh().await })
    };
    tokio::task::yield_now().await;
    transport.release();
    let nodes = rendering.await.unwrap();

    assert!(!nodes[0].is_suspended());
    assert!(matches!(&nodes[0], RenderNode::QueryProvider { .. }));
    assert_eq!(transport.calls_to(Method::Get, "/users/1"), 1);
}

#[tokio::test]
async fn failed_query_replaces_provider_and_retries_on_remount() {
    let transport = ScriptedTransport::new();
    transport
        .on(Method::Get, "/users/1", Reply::status(503, "Service Unavailable"))
        .on_get("/users/1", user_body());
    let page = page(profile_document(), &transport);

    let nodes = page.render().await;
    let errors = nodes[0].errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Network);
    assert_eq!(
        errors[0].message,
        "query \"user\" failed for /users/1: status 503 Service Unavailable"
    );

    // Refresh keeps the failure, a new mount retries
    let nodes = page.refresh().await;
    assert!(matches!(&nodes[0], RenderNode::Error(_)));
    let nodes = page.render().await;
    assert!(matches!(&nodes[0], RenderNode::QueryProvider { .. }));
    assert_eq!(transport.calls_to(Method::Get, "/users/1"), 2);
}

#[tokio::test]
async fn dismissed_boundary_is_hidden_until_edit() {
    let transport = ScriptedTransport::new();
    let page = page(
        document(json!([{ "type": "text", "text": "{{query.missing}}" }])),
        &transport,
    );
    let path = BlockPath::root().append(0);

    assert_eq!(page.render().await.len(), 1);
    page.dismiss(&path);
    assert!(page.render().await.is_empty());

    page.replace_block(&path, block(json!({ "type": "text", "text": "{{query.other}}" })))
        .await
        .unwrap();
    let nodes = page.render().await;
    assert!(matches!(&nodes[0], RenderNode::Error(_)));
}

#[tokio::test]
async fn shared_query_across_providers_is_fetched_once() {
    let transport = ScriptedTransport::new();
    transport.on_get("/users/1", user_body());
    let provider = json!({
        "type": "query-provider",
        "queries": [{ "id": "user", "endpoint": "/users/1" }],
        "blocks": [{ "type": "text", "text": "{{query.user.data.email}}" }]
    });
    let page = page(
        document(json!([{
            "type": "two-columns",
            "leftBlocks": [provider.clone()],
            "rightBlocks": [provider]
        }])),
        &transport,
    );

    let nodes = page.render().await;

    let root = BlockPath::root().append(0);
    for slot in [Slot::LeftBlocks, Slot::RightBlocks] {
        let text = root.child(slot, 0).child(Slot::Blocks, 0);
        assert!(matches!(
            find_node(&nodes, &text),
            Some(RenderNode::Text { text, .. }) if text == "ada@example.com"
        ));
    }
    assert_eq!(transport.calls_to(Method::Get, "/users/1"), 1);
}

#[tokio::test]
async fn closed_page_drops_pending_queries() {
    let transport = profile_transport();
    transport.hold();
    let page = page(profile_document(), &transport);

    page.snapshot().await;
    page.close();
    page.settle().await;

    let key = pagekit_procedure::QueryKey::new("user", "/users/1");
    assert!(matches!(page.client().state(&key).await, Some(QueryState::Pending)));
    assert!(page.is_closed());
}

#[tokio::test]
async fn replacing_a_provider_drops_its_pending_queries() {
    let transport = profile_transport();
    transport.hold();
    let page = page(profile_document(), &transport);
    let key = pagekit_procedure::QueryKey::new("user", "/users/1");

    page.snapshot().await;

    // Edits inside the provider keep it waiting on the query
    page.replace_block(
        &"0.blocks.0".parse().unwrap(),
        block(json!({ "type": "text", "text": "Profile" })),
    )
    .await
    .unwrap();
    assert!(matches!(page.client().state(&key).await, Some(QueryState::Pending)));

    page.replace_block(&BlockPath::root().append(0), block(json!({ "type": "text", "text": "gone" })))
        .await
        .unwrap();
    assert!(page.client().state(&key).await.is_none());

    transport.release();
    let nodes = page.render().await;
    assert!(matches!(&nodes[0], RenderNode::Text { text, .. } if text == "gone"));
    assert_eq!(transport.calls_to(Method::Get, "/users/1"), 0);
}
