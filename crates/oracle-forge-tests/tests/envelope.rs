//! Envelope contract tests: success and failure shapes, bare payloads and
//! content-type branching.

use oracle_forge_client::{ActiveAdventure, Error, MALFORMED_JSON};
use oracle_forge_tests::spawn_stub_backend;
use serde_json::Value;

// ============================================================================
// Success Tests
// ============================================================================

#[tokio::test]
async fn test_envelope_success_has_data() {
    let stub = spawn_stub_backend().await;
    let client = stub.client();

    let envelope = client
        .list_adventures::<Vec<String>>()
        .await
        .expect("Request failed");

    assert!(envelope.success);
    assert_eq!(envelope.status, 200);
    assert_eq!(envelope.message.as_deref(), Some("Success"));
    assert_eq!(
        envelope.data,
        Some(vec!["greyhawk".to_string(), "saltmarsh".to_string()])
    );
    assert!(envelope.error.is_none());
}

#[tokio::test]
async fn test_bare_object_is_success() {
    let stub = spawn_stub_backend().await;
    let client = stub.client();

    let envelope = client.active_adventure().await.expect("Request failed");

    assert!(envelope.success);
    assert_eq!(
        envelope.data,
        Some(ActiveAdventure {
            active: Some("greyhawk".to_string())
        })
    );
}

#[tokio::test]
async fn test_bare_list_is_success() {
    let stub = spawn_stub_backend().await;
    let client = stub.client();

    let envelope = client
        .generator_categories::<Vec<String>>()
        .await
        .expect("Request failed");

    assert!(envelope.success);
    assert_eq!(envelope.data.map(|c| c.len()), Some(3));
}

#[tokio::test]
async fn test_health_bare_payload() {
    let stub = spawn_stub_backend().await;
    let client = stub.client();

    let envelope = client.health_check::<Value>().await.expect("Request failed");

    assert!(envelope.success);
    assert_eq!(envelope.data.unwrap()["status"], "healthy");
}

#[tokio::test]
async fn test_success_without_data_field() {
    let stub = spawn_stub_backend().await;
    let client = stub.client();

    let envelope = client
        .select_adventure::<Value>("greyhawk")
        .await
        .expect("Request failed");

    assert!(envelope.success);
    assert_eq!(envelope.data, Some(Value::Null));
    assert_eq!(envelope.message.as_deref(), Some("Adventure greyhawk selected"));
}

#[tokio::test]
async fn test_no_content_decodes_as_unit() {
    let stub = spawn_stub_backend().await;
    let client = stub.client();

    let envelope = client
        .delete_adventure::<()>("saltmarsh")
        .await
        .expect("Request failed");

    assert!(envelope.success);
    assert_eq!(envelope.status, 204);
    assert_eq!(envelope.data, Some(()));
}

// ============================================================================
// Failure Tests
// ============================================================================

#[tokio::test]
async fn test_structured_error_object() {
    let stub = spawn_stub_backend().await;
    let client = stub.client();

    let envelope = client
        .get_adventure::<Value>("missing")
        .await
        .expect("Request failed");

    assert!(!envelope.success);
    assert_eq!(envelope.status, 404);
    assert_eq!(envelope.error.as_deref(), Some("Adventure not found"));
    assert_eq!(envelope.error_code.as_deref(), Some("NOT_FOUND"));
    assert!(envelope.data.is_none());
}

#[tokio::test]
async fn test_string_error_and_into_result() {
    let stub = spawn_stub_backend().await;
    let client = stub.client();

    let envelope = client
        .get::<Value>("/test/bad-request", None)
        .await
        .expect("Request failed");

    assert!(!envelope.success);
    assert_eq!(envelope.error.as_deref(), Some("Bad things happened"));
    match envelope.into_result() {
        Err(Error::Application { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Bad things happened");
        }
        other => panic!("expected application error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_error_uses_status_text() {
    let stub = spawn_stub_backend().await;
    let client = stub.client();

    let envelope = client
        .get::<Value>("/test/text-error", None)
        .await
        .expect("Request failed");

    assert!(!envelope.success);
    assert_eq!(envelope.error.as_deref(), Some("HTTP 502: Bad Gateway"));
}

#[tokio::test]
async fn test_unknown_route_is_failed_envelope() {
    let stub = spawn_stub_backend().await;
    let client = stub.client();

    let envelope = client
        .get::<Value>("/no/such/route", None)
        .await
        .expect("Request failed");

    assert!(!envelope.success);
    assert_eq!(envelope.error.as_deref(), Some("HTTP 404: Not Found"));
}

// ============================================================================
// Content negotiation Tests
// ============================================================================

#[tokio::test]
async fn test_text_plain_returned_as_string() {
    let stub = spawn_stub_backend().await;
    let client = stub.client();

    let envelope = client
        .get::<String>("/test/text", None)
        .await
        .expect("Request failed");

    assert!(envelope.success);
    assert_eq!(envelope.data.as_deref(), Some("plain words"));
}

#[tokio::test]
async fn test_malformed_json_is_failed_envelope() {
    let stub = spawn_stub_backend().await;
    let client = stub.client();

    let envelope = client
        .get::<Value>("/test/malformed", None)
        .await
        .expect("Request failed");

    assert!(!envelope.success);
    assert_eq!(envelope.status, 200);
    assert_eq!(envelope.error.as_deref(), Some(MALFORMED_JSON));
}

#[tokio::test]
async fn test_payload_type_mismatch_is_failed_envelope() {
    let stub = spawn_stub_backend().await;
    let client = stub.client();

    let envelope = client
        .list_adventures::<u32>()
        .await
        .expect("Request failed");

    assert!(!envelope.success);
    assert!(envelope.data.is_none());
    assert!(!envelope.error.unwrap_or_default().is_empty());
}
