//! Dispatch behaviour tests.
//!
//! These tests verify:
//! - discovery and the operation table list exactly the same tools
//! - missing arguments, unknown tools and invalid payloads never reach GitHub
//! - each tool shapes its upstream request as documented
//! - upstream failures surface with their original cause

use std::collections::HashSet;
use std::sync::Arc;

use github_mcp::{
    DispatchError, Dispatcher, OperationTable, ToolContent, ToolResult, get_tool_definitions,
};
use github_test_utils::{RecordedCall, RecordingApi};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

fn setup(api: RecordingApi) -> (Arc<RecordingApi>, Dispatcher) {
    let api = Arc::new(api);
    let dispatcher = Dispatcher::new(OperationTable::new(), api.clone());
    (api, dispatcher)
}

fn only_text(result: &ToolResult) -> &str {
    assert_eq!(result.content.len(), 1, "envelope should hold one entry");
    match &result.content[0] {
        ToolContent::Text { text } => text,
    }
}

// ==========================================================================
// Discovery / table agreement
// ==========================================================================

#[test]
fn discovery_and_table_are_a_bijection() {
    let table = OperationTable::new();
    let tools = get_tool_definitions(&table);

    let listed: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    let unique: HashSet<&str> = listed.iter().copied().collect();
    assert_eq!(unique.len(), listed.len(), "discovery lists a tool twice");

    for operation in table.iter() {
        assert_eq!(
            listed.iter().filter(|name| **name == operation.name).count(),
            1,
            "{} should be listed exactly once",
            operation.name
        );
    }
    for name in &listed {
        assert!(table.contains(name), "{name} is listed but has no handler");
    }
}

#[test]
fn discovery_follows_table_order() {
    let table = OperationTable::new();
    let from_table: Vec<&str> = table.iter().map(|op| op.name).collect();
    let from_discovery: Vec<String> = get_tool_definitions(&table)
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(from_discovery, from_table);
}

#[tokio::test]
async fn every_listed_tool_dispatches_to_its_own_upstream_call() {
    let minimal: [(&str, Value); 6] = [
        ("create_repository", json!({"name": "demo"})),
        ("create_issue", json!({"owner": "o", "repo": "r", "title": "t"})),
        (
            "create_or_update_file",
            json!({"owner": "o", "repo": "r", "path": "p", "content": "c", "message": "m", "branch": "b"}),
        ),
        ("get_file_contents", json!({"owner": "o", "repo": "r", "path": "p"})),
        (
            "create_pull_request",
            json!({"owner": "o", "repo": "r", "title": "t", "head": "h", "base": "b"}),
        ),
        ("fork_repository", json!({"owner": "o", "repo": "r"})),
    ];

    let (api, dispatcher) = setup(RecordingApi::new());
    for (name, arguments) in &minimal {
        dispatcher.dispatch(name, Some(arguments.clone())).await.unwrap();
    }

    let called: Vec<&str> = api.calls().iter().map(RecordedCall::operation).collect();
    let expected: Vec<&str> = minimal.iter().map(|(name, _)| *name).collect();
    assert_eq!(called, expected);
}

// ==========================================================================
// Failure taxonomy
// ==========================================================================

#[tokio::test]
async fn missing_title_names_title() {
    let (api, dispatcher) = setup(RecordingApi::new());

    let err = dispatcher
        .dispatch("create_issue", Some(json!({"owner": "octo", "repo": "hello"})))
        .await
        .unwrap_err();

    match err {
        DispatchError::Validation(e) => {
            assert!(e.names("title"), "violations: {:?}", e.violations());
            assert!(e.to_string().contains("title"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn validation_reports_all_fields_not_just_the_first() {
    let (_, dispatcher) = setup(RecordingApi::new());

    let err = dispatcher
        .dispatch("create_pull_request", Some(json!({"owner": 1, "draft": "no"})))
        .await
        .unwrap_err();

    let DispatchError::Validation(e) = err else {
        panic!("expected validation error");
    };
    let paths: Vec<&str> = e.violations().iter().map(|v| v.path.as_str()).collect();
    assert_eq!(paths, vec!["owner", "repo", "title", "head", "base", "draft"]);
}

#[tokio::test]
async fn oversized_milestone_is_rejected_at_its_field() {
    let (api, dispatcher) = setup(RecordingApi::new());

    let err = dispatcher
        .dispatch(
            "create_issue",
            Some(json!({"owner": "o", "repo": "r", "title": "t", "milestone": u64::MAX})),
        )
        .await
        .unwrap_err();

    let DispatchError::Validation(e) = err else {
        panic!("expected validation error");
    };
    let paths: Vec<&str> = e.violations().iter().map(|v| v.path.as_str()).collect();
    assert_eq!(paths, vec!["milestone"]);
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn unknown_operation_never_calls_upstream() {
    let (api, dispatcher) = setup(RecordingApi::new());

    let err = dispatcher
        .dispatch("not_a_real_operation", Some(json!({})))
        .await
        .unwrap_err();

    match err {
        DispatchError::UnknownOperation(name) => assert_eq!(name, "not_a_real_operation"),
        other => panic!("expected unknown operation, got {other:?}"),
    }
    assert_eq!(api.call_count(), 0);
}

#[rstest]
#[case("create_issue")]
#[case("not_a_real_operation")]
#[tokio::test]
async fn missing_arguments_is_checked_before_lookup(#[case] name: &str) {
    let (api, dispatcher) = setup(RecordingApi::new());

    let err = dispatcher.dispatch(name, None).await.unwrap_err();

    assert!(matches!(err, DispatchError::MissingArguments), "got {err:?}");
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn upstream_failure_is_surfaced_not_retried() {
    let (api, dispatcher) = setup(RecordingApi::failing(409, "sha does not match"));

    let err = dispatcher
        .dispatch(
            "create_or_update_file",
            Some(json!({
                "owner": "octo", "repo": "hello", "path": "README.md",
                "content": "new", "message": "m", "branch": "main"
            })),
        )
        .await
        .unwrap_err();

    match &err {
        DispatchError::Upstream(cause) => {
            assert_eq!(cause.status(), Some(409));
            assert!(err.to_string().contains("sha does not match"));
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
    assert_eq!(api.call_count(), 1);
}

// ==========================================================================
// Per-tool request shaping
// ==========================================================================

#[tokio::test]
async fn file_content_is_base64_encoded_and_other_fields_unchanged() {
    let (api, dispatcher) = setup(RecordingApi::new());

    dispatcher
        .dispatch(
            "create_or_update_file",
            Some(json!({
                "owner": "octo",
                "repo": "hello",
                "path": "docs/hello.txt",
                "content": "hello",
                "message": "Add greeting",
                "branch": "main",
                "sha": "3b18e512dba79e4c8300dd08aeb37f8e728b8dad"
            })),
        )
        .await
        .unwrap();

    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    let RecordedCall::CreateOrUpdateFile(request) = &calls[0] else {
        panic!("unexpected call {:?}", calls[0]);
    };
    assert_eq!(request.content, "aGVsbG8=");
    assert_eq!(request.owner, "octo");
    assert_eq!(request.repo, "hello");
    assert_eq!(request.path, "docs/hello.txt");
    assert_eq!(request.message, "Add greeting");
    assert_eq!(request.branch, "main");
    assert_eq!(
        request.sha.as_deref(),
        Some("3b18e512dba79e4c8300dd08aeb37f8e728b8dad")
    );
}

#[tokio::test]
async fn fork_without_organization_leaves_it_unset() {
    let (api, dispatcher) = setup(RecordingApi::new());

    dispatcher
        .dispatch("fork_repository", Some(json!({"owner": "octo", "repo": "hello"})))
        .await
        .unwrap();

    let RecordedCall::ForkRepository(request) = &api.calls()[0] else {
        panic!("expected fork call");
    };
    assert_eq!(request.owner, "octo");
    assert_eq!(request.repo, "hello");
    assert!(request.organization.is_none());
}

#[tokio::test]
async fn extra_fields_are_ignored() {
    let (api, dispatcher) = setup(RecordingApi::new());

    dispatcher
        .dispatch(
            "create_issue",
            Some(json!({"owner": "o", "repo": "r", "title": "t", "priority": "high"})),
        )
        .await
        .unwrap();

    let RecordedCall::CreateIssue(request) = &api.calls()[0] else {
        panic!("expected issue call");
    };
    assert_eq!(request.title, "t");
    assert!(request.body.is_none());
    assert!(request.labels.is_none());
}

#[tokio::test]
async fn get_file_contents_passes_branch_through() {
    let (api, dispatcher) = setup(RecordingApi::new());

    dispatcher
        .dispatch(
            "get_file_contents",
            Some(json!({"owner": "o", "repo": "r", "path": "src/lib.rs", "branch": "dev"})),
        )
        .await
        .unwrap();

    let RecordedCall::GetFileContents(request) = &api.calls()[0] else {
        panic!("expected contents call");
    };
    assert_eq!(request.path, "src/lib.rs");
    assert_eq!(request.branch.as_deref(), Some("dev"));
}

// ==========================================================================
// Result envelope
// ==========================================================================

#[tokio::test]
async fn envelope_holds_pretty_printed_response() {
    let (_, dispatcher) = setup(RecordingApi::responding(json!({"id": 42})));

    let result = dispatcher
        .dispatch("create_repository", Some(json!({"name": "demo"})))
        .await
        .unwrap();

    assert_eq!(only_text(&result), "{\n  \"id\": 42\n}");
}

#[tokio::test]
async fn envelope_serializes_as_text_content() {
    let (_, dispatcher) = setup(RecordingApi::responding(json!({"number": 1})));

    let result = dispatcher
        .dispatch("create_issue", Some(json!({"owner": "o", "repo": "r", "title": "t"})))
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"content": [{"type": "text", "text": "{\n  \"number\": 1\n}"}]})
    );
}
