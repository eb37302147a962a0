//! Unit tests for app module.

use super::*;
use std::time::Duration;

fn offline_app() -> App {
    // Port 9 (discard) is never served in the test environment.
    let client = GatewayClient::with_base_url("http://127.0.0.1:9").unwrap();
    App::with_parts(client, QueryCache::new(Duration::from_secs(60)))
}

// ============================================================================
// Argument helpers Tests
// ============================================================================

#[test]
fn test_parse_object_accepts_objects() {
    let value = parse_object(r#"{"name": "Mira", "level": 3}"#).unwrap();

    assert_eq!(value, json!({"name": "Mira", "level": 3}));
}

#[test]
fn test_parse_object_rejects_non_objects() {
    assert!(matches!(
        parse_object("[1, 2]"),
        Err(AppError::InvalidInput(msg)) if msg == "expected a JSON object"
    ));
    assert!(matches!(parse_object("{nope"), Err(AppError::InvalidInput(_))));
}

#[test]
fn test_render_strings_verbatim() {
    assert_eq!(render(&json!("The door creaks open.")), "The door creaks open.");
}

#[test]
fn test_render_pretty_json() {
    assert_eq!(render(&json!({"a": 1})), "{\n  \"a\": 1\n}");
}

// ============================================================================
// Command Tests
// ============================================================================

#[tokio::test]
async fn test_execute_rejects_nested_shell() {
    let app = offline_app();

    let result = app.execute(Command::Shell).await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn test_invalid_json_argument_never_reaches_the_network() {
    let app = offline_app();

    let result = app
        .execute(Command::Players(PlayerCommand::Create {
            adventure: "greyhawk".to_string(),
            data: "not json".to_string(),
        }))
        .await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn test_shell_reports_errors_inline_and_continues() {
    let app = offline_app();
    let input = b"# comment\n\noracle yes-no \"open\nadventures bogus\nquit\nhealth\n".as_slice();
    let mut output = Vec::new();

    app.run_shell(input, &mut output).await.unwrap();

    let text = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = text.lines().filter(|l| l.starts_with("error: ")).collect();
    assert_eq!(lines[0], "error: unterminated quote");
    assert!(lines[1].contains("bogus"));
    assert!(!text.contains("Cannot reach"));
}

// ============================================================================
// Interrupt Tests
// ============================================================================

#[test]
fn test_interrupt_when_idle_is_a_no_op() {
    let app = offline_app();

    assert!(!app.interrupt());
    assert!(!app.shutdown_token().is_cancelled());
}

#[tokio::test]
async fn test_shutdown_stops_the_shell() {
    let app = offline_app();
    app.shutdown_token().cancel();
    let mut output = Vec::new();

    app.run_shell(b"health\nhealth\n".as_slice(), &mut output)
        .await
        .unwrap();

    assert!(output.is_empty());
}
