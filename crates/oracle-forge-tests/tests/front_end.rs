//! Front-end tests: cached reads, invalidation after writes, stale data,
//! the line shell and map file transfer, all against the stub backend.

use oracle_forge::app::App;
use oracle_forge::cache::{QueryCache, QueryResult, Tag};
use oracle_forge::cli::{
    AdventureCommand, Command, MapCommand, OracleCommand, PlayerCommand,
};
use oracle_forge::error::AppError;
use oracle_forge_client::{Error as GatewayError, GatewayClient};
use oracle_forge_tests::{
    ADVENTURE_WITH_MAP, MAP_BYTES, PNG_BYTES, StubBackend, closed_port_url, spawn_stub_backend,
};
use futures_util::future::join;
use serde_json::{Value, json};
use std::time::Duration;

fn app_for(stub: &StubBackend) -> App {
    App::with_parts(stub.client(), QueryCache::new(Duration::from_secs(60)))
}

// ============================================================================
// Cache Tests
// ============================================================================

#[tokio::test]
async fn test_repeated_read_hits_backend_once() {
    let stub = spawn_stub_backend().await;
    let app = app_for(&stub);

    let first = app
        .execute(Command::Adventures(AdventureCommand::List))
        .await
        .expect("first read failed");
    let second = app
        .execute(Command::Adventures(AdventureCommand::List))
        .await
        .expect("second read failed");

    assert_eq!(first, json!(["greyhawk", "saltmarsh"]));
    assert_eq!(first, second);
    assert_eq!(stub.state.hits("GET", "/adventures/list"), 1);
}

#[tokio::test]
async fn test_disabled_cache_always_fetches() {
    let stub = spawn_stub_backend().await;
    let app = App::with_parts(stub.client(), QueryCache::disabled());

    for _ in 0..2 {
        app.execute(Command::Health).await.expect("health failed");
    }

    assert_eq!(stub.state.hits("GET", "/health"), 2);
    assert!(app.cache().is_empty());
}

#[tokio::test]
async fn test_write_invalidates_family() {
    let stub = spawn_stub_backend().await;
    let app = app_for(&stub);
    let list = || {
        Command::Players(PlayerCommand::List {
            adventure: "greyhawk".to_string(),
        })
    };

    let before = app.execute(list()).await.expect("list failed");
    app.execute(Command::Players(PlayerCommand::Create {
        adventure: "greyhawk".to_string(),
        data: r#"{"name": "Mira"}"#.to_string(),
    }))
    .await
    .expect("create failed");
    let after = app.execute(list()).await.expect("list failed");

    assert_eq!(before, json!([]));
    assert_eq!(after[0]["filename"], "mira.json");
    assert_eq!(stub.state.hits("GET", "/adventures/greyhawk/players"), 2);
}

#[tokio::test]
async fn test_adventure_delete_refreshes_players() {
    let stub = spawn_stub_backend().await;
    let app = app_for(&stub);
    let list = || {
        Command::Players(PlayerCommand::List {
            adventure: "greyhawk".to_string(),
        })
    };

    app.execute(list()).await.expect("list failed");
    app.execute(Command::Adventures(AdventureCommand::Delete {
        id: "greyhawk".to_string(),
    }))
    .await
    .expect("delete failed");
    app.execute(list()).await.expect("list failed");

    assert_eq!(stub.state.hits("DELETE", "/adventures/greyhawk"), 1);
    assert_eq!(stub.state.hits("GET", "/adventures/greyhawk/players"), 2);
}

#[tokio::test]
async fn test_failed_write_keeps_cache() {
    let stub = spawn_stub_backend().await;
    let app = app_for(&stub);

    app.execute(Command::Adventures(AdventureCommand::List))
        .await
        .expect("list failed");
    let result = app
        .execute(Command::Players(PlayerCommand::Create {
            adventure: "greyhawk".to_string(),
            data: r#"{"class": "bard"}"#.to_string(),
        }))
        .await;

    match result {
        Err(AppError::Gateway(GatewayError::Application { status, message })) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Missing player name");
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
    app.execute(Command::Adventures(AdventureCommand::List))
        .await
        .expect("list failed");
    assert_eq!(stub.state.hits("GET", "/adventures/list"), 1);
}

#[tokio::test]
async fn test_stale_data_when_refresh_fails() {
    let stub = spawn_stub_backend().await;
    let client = stub.client();
    let cache = QueryCache::new(Duration::from_secs(60));

    let first = cache
        .read("adventures", Tag::Adventures, || client.list_adventures::<Value>())
        .await;
    assert!(matches!(first, QueryResult::Fetched(_)));

    cache.invalidate(Tag::Adventures);
    let second = cache
        .read("adventures", Tag::Adventures, || {
            client.get::<Value>("/test/rate-limited", None)
        })
        .await;

    match second {
        QueryResult::Stale { data, error } => {
            assert_eq!(data, json!(["greyhawk", "saltmarsh"]));
            assert!(matches!(
                error,
                AppError::Gateway(GatewayError::RateLimited { .. })
            ));
        }
        other => panic!("expected stale data, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generic_get_command() {
    let stub = spawn_stub_backend().await;
    let app = app_for(&stub);

    let data = app
        .execute(Command::Get {
            path: "generators/categories".to_string(),
        })
        .await
        .expect("get failed");

    assert_eq!(data.as_array().map(Vec::len), Some(3));
    assert_eq!(stub.state.hits("GET", "/generators/categories"), 1);
}

#[tokio::test]
async fn test_oracle_command_sends_question() {
    let stub = spawn_stub_backend().await;
    let app = app_for(&stub);

    let data = app
        .execute(Command::Oracle(OracleCommand::YesNo {
            question: "Is the gate guarded?".to_string(),
            odds: None,
            chaos: Some(5),
        }))
        .await
        .expect("oracle failed");

    assert_eq!(data["question"], "Is the gate guarded?");
    assert_eq!(data["answer"], "Yes");
}

#[tokio::test]
async fn test_unreachable_backend_exit_code() {
    let url = closed_port_url().await;
    let client = GatewayClient::with_base_url(&url).expect("Failed to create client");
    let app = App::with_parts(client, QueryCache::new(Duration::from_secs(60)));

    let err = app.execute(Command::Health).await.unwrap_err();

    assert_eq!(err.exit_code(), 4);
    assert!(err.banner().starts_with("Cannot reach the Oracle Forge server"));
}

// ============================================================================
// Interrupt Tests
// ============================================================================

#[tokio::test]
async fn test_interrupt_cancels_only_the_running_command() {
    let stub = spawn_stub_backend().await;
    let app = app_for(&stub);
    let interrupter = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        app.interrupt()
    };

    let (result, interrupted) = join(
        app.execute(Command::Get {
            path: "/test/slow".to_string(),
        }),
        interrupter,
    )
    .await;

    assert!(interrupted);
    assert!(matches!(
        result,
        Err(AppError::Gateway(GatewayError::Cancelled))
    ));
    let health = app.execute(Command::Health).await.expect("health failed");
    assert_eq!(health["status"], "healthy");
    assert!(!app.shutdown_token().is_cancelled());
}

#[tokio::test]
async fn test_shell_keeps_working_after_interrupt() {
    let stub = spawn_stub_backend().await;
    let app = app_for(&stub);
    let mut output = Vec::new();
    let interrupter = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        app.interrupt()
    };

    let (result, interrupted) = join(
        app.run_shell("get /test/slow\nhealth\nadventures list\n".as_bytes(), &mut output),
        interrupter,
    )
    .await;

    result.expect("shell failed");
    assert!(interrupted);
    let output = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], "error: Request cancelled.");
    assert!(output.contains("healthy"));
    assert!(output.contains("saltmarsh"));
    assert_eq!(stub.state.hits("GET", "/health"), 1);
}

// ============================================================================
// Shell Tests
// ============================================================================

#[tokio::test]
async fn test_shell_shares_cache_across_lines() {
    let stub = spawn_stub_backend().await;
    let app = app_for(&stub);
    let input = "adventures list\nadventures list\nadventures show missing\nquit\nhealth\n";
    let mut output = Vec::new();

    app.run_shell(input.as_bytes(), &mut output)
        .await
        .expect("shell failed");

    let output = String::from_utf8(output).unwrap();
    assert_eq!(output.matches("saltmarsh").count(), 2);
    assert!(output.contains("error: Adventure not found"));
    assert_eq!(stub.state.hits("GET", "/adventures/list"), 1);
    assert_eq!(stub.state.hits("GET", "/health"), 0);
}

// ============================================================================
// Map Transfer Tests
// ============================================================================

#[tokio::test]
async fn test_map_download_writes_file() {
    let stub = spawn_stub_backend().await;
    let app = app_for(&stub);
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("world.map");

    let data = app
        .execute(Command::Maps(MapCommand::Download {
            adventure: ADVENTURE_WITH_MAP.to_string(),
            output: target.clone(),
        }))
        .await
        .expect("download failed");

    assert_eq!(data["bytes"], MAP_BYTES.len());
    assert_eq!(std::fs::read(&target).unwrap(), MAP_BYTES);
}

#[tokio::test]
async fn test_custom_map_upload_from_file() {
    let stub = spawn_stub_backend().await;
    let app = app_for(&stub);
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("harbor.png");
    std::fs::write(&source, PNG_BYTES).unwrap();

    app.execute(Command::Maps(MapCommand::List {
        adventure: "greyhawk".to_string(),
    }))
    .await
    .expect("list failed");
    app.execute(Command::Maps(MapCommand::Upload {
        adventure: "greyhawk".to_string(),
        file: source,
        custom: true,
    }))
    .await
    .expect("upload failed");
    app.execute(Command::Maps(MapCommand::List {
        adventure: "greyhawk".to_string(),
    }))
    .await
    .expect("list failed");

    let uploads = stub.state.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0][0].file_name.as_deref(), Some("harbor.png"));
    assert_eq!(uploads[0][0].content_type.as_deref(), Some("image/png"));
    assert_eq!(stub.state.hits("POST", "/adventures/greyhawk/upload_custom_map"), 1);
    assert_eq!(stub.state.hits("GET", "/adventures/greyhawk/custom_maps"), 2);
}

#[tokio::test]
async fn test_map_presence_command() {
    let stub = spawn_stub_backend().await;
    let app = app_for(&stub);

    let data = app
        .execute(Command::Maps(MapCommand::Has {
            adventure: "saltmarsh".to_string(),
        }))
        .await
        .expect("presence check failed");

    assert_eq!(data["has_map_file"], false);
}
