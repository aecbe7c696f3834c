use sandgraph_domain::{SandboxStatus, WorkspaceEntity, WorkspaceId};
use serde_json::json;

use crate::{
    services::DiffItem,
    tests::fixtures::*,
};

#[tokio::test]
async fn diff_lists_sandboxed_items_in_insertion_order() {
    let fixture = EngineFixture::new();

    // v1 is fully private with one private property; v2 is public but
    // carries a workspace edit shadowing a public value.
    let v1 = fixture
        .sandboxed_vertex("v1")
        .with_property(fixture.sandboxed_property("k1", "fullName", json!("Alice")));
    let v2 = public_vertex("v2")
        .with_property(public_property("k1", "title", json!("Dr")))
        .with_property(fixture.sandboxed_property("k1", "title", json!("Prof")));
    fixture.graph.insert_vertex(v1);
    fixture.graph.insert_vertex(v2);
    let edge = fixture.sandboxed_edge("e1", "knows", "v1", "v2");
    fixture.graph.insert_edge(edge.clone());

    let entities = vec![
        WorkspaceEntity::new("v1", true),
        WorkspaceEntity::new("v2", false),
    ];
    let diff = fixture
        .diff_service()
        .diff(&workspace(), &entities, &[edge], &member_auths())
        .await
        .unwrap();

    assert_eq!(diff.len(), 4);
    let DiffItem::Vertex(vertex_item) = &diff[0] else {
        panic!("expected a vertex diff first");
    };
    assert_eq!(vertex_item.vertex.id(), "v1");
    assert_eq!(vertex_item.sandbox_status, SandboxStatus::Private);
    assert!(vertex_item.visible);

    let DiffItem::Property(property_item) = &diff[1] else {
        panic!("expected v1's property diff second");
    };
    assert_eq!(property_item.element.id, "v1");
    assert_eq!(property_item.sandbox_status, SandboxStatus::Private);
    assert!(property_item.existing_property.is_none());

    let DiffItem::Property(shadowed) = &diff[2] else {
        panic!("expected v2's shadowing property diff third");
    };
    assert_eq!(shadowed.element.id, "v2");
    assert_eq!(shadowed.sandbox_status, SandboxStatus::Partial);
    let existing = shadowed.existing_property.as_ref().expect("public value");
    assert_eq!(existing.value(), &json!("Dr"));

    let DiffItem::Edge(edge_item) = &diff[3] else {
        panic!("expected the edge diff last");
    };
    assert_eq!(edge_item.edge.id(), "e1");
    assert_eq!(edge_item.sandbox_status, SandboxStatus::Private);
}

#[tokio::test]
async fn diff_skips_unreadable_and_missing_entities() {
    let fixture = EngineFixture::new();

    // Sandboxed to a different workspace: not readable with these
    // credentials, so it contributes nothing, and neither does a stale
    // membership entry.
    let other = WorkspaceId::new(OTHER_WORKSPACE);
    let descriptor = sandgraph_domain::VisibilityDescriptor::sandboxed(other);
    let label = fixture.label_for(&descriptor);
    fixture.graph.insert_vertex(
        sandgraph_graph::Vertex::new("foreign", label).with_visibility_descriptor(descriptor),
    );

    let entities = vec![
        WorkspaceEntity::new("foreign", true),
        WorkspaceEntity::new("missing", true),
    ];
    let diff = fixture
        .diff_service()
        .diff(&workspace(), &entities, &[], &member_auths())
        .await
        .unwrap();

    assert!(diff.is_empty());
}

#[tokio::test]
async fn diff_is_deterministic_for_fixed_inputs() {
    let fixture = EngineFixture::new();
    fixture.graph.insert_vertex(
        fixture
            .sandboxed_vertex("v1")
            .with_property(fixture.sandboxed_property("k1", "fullName", json!("Alice"))),
    );
    fixture.graph.insert_vertex(fixture.sandboxed_vertex("v2"));
    let edge = fixture.sandboxed_edge("e1", "knows", "v1", "v2");
    fixture.graph.insert_edge(edge.clone());

    let entities = vec![
        WorkspaceEntity::new("v1", true),
        WorkspaceEntity::new("v2", false),
    ];
    let service = fixture.diff_service();
    let first = service
        .diff(&workspace(), &entities, &[edge.clone()], &member_auths())
        .await
        .unwrap();
    let second = service
        .diff(&workspace(), &entities, &[edge], &member_auths())
        .await
        .unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn published_vertex_disappears_from_the_diff() {
    let fixture = EngineFixture::new();
    fixture.define_property("fullName", false);
    fixture.graph.insert_vertex(
        fixture
            .sandboxed_vertex("v1")
            .with_property(fixture.sandboxed_property("k1", "fullName", json!("Alice"))),
    );

    let entities = vec![WorkspaceEntity::new("v1", true)];
    let before = fixture
        .diff_service()
        .diff(&workspace(), &entities, &[], &member_auths())
        .await
        .unwrap();
    assert_eq!(before.len(), 2);

    let report = fixture
        .publish_service()
        .publish(
            &[publish_vertex_item("v1", sandgraph_domain::SandboxStatus::Private)],
            &workspace_id(),
            ACTOR,
            &member_auths(),
        )
        .await
        .unwrap();
    assert!(report.all_succeeded());

    let after = fixture
        .diff_service()
        .diff(&workspace(), &entities, &[], &member_auths())
        .await
        .unwrap();
    assert!(after.is_empty());
}
