use sandgraph_audit::{AuditReadContext, AuditRepository};
use sandgraph_domain::AuditAction;
use sandgraph_graph::ElementRef;

use crate::{tests::fixtures::*, work_queue::WorkQueueMessage};

#[tokio::test]
async fn source_update_preserves_the_sandbox() {
    let fixture = EngineFixture::new();
    fixture.graph.insert_vertex(fixture.sandboxed_vertex("v1"));

    let updated = fixture
        .visibility_service()
        .update_element_visibility_source(
            &ElementRef::vertex("v1"),
            "CONFIDENTIAL",
            &workspace_id(),
            ACTOR,
            &member_auths(),
        )
        .await
        .unwrap();

    let descriptor = updated.visibility_descriptor().expect("descriptor");
    assert_eq!(descriptor.source(), Some("CONFIDENTIAL"));
    assert!(descriptor.contains_workspace(&workspace_id()));
    // The enforced label now requires both the workspace and the source
    // term.
    assert!(!updated.visibility().is_public());

    let history = fixture
        .audit
        .find_by_row_prefix(
            "v1",
            &AuditReadContext::system(&fixture.system_context),
        )
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action(), AuditAction::Update);

    let messages = fixture.work_queue.messages();
    assert_eq!(messages.len(), 1);
    assert!(matches!(
        messages[0],
        WorkQueueMessage::ElementVisibilityChange(_)
    ));
    assert_eq!(fixture.graph.flush_count(), 1);
}

#[tokio::test]
async fn source_update_on_a_public_vertex_stays_unsandboxed() {
    let fixture = EngineFixture::new();
    fixture.graph.insert_vertex(public_vertex("v1"));

    let updated = fixture
        .visibility_service()
        .update_element_visibility_source(
            &ElementRef::vertex("v1"),
            "RESTRICTED",
            &workspace_id(),
            ACTOR,
            &member_auths(),
        )
        .await
        .unwrap();

    let descriptor = updated.visibility_descriptor().expect("descriptor");
    assert_eq!(descriptor.source(), Some("RESTRICTED"));
    assert!(descriptor.is_public());
}
