//! Integration tests for the Oracle Forge gateway client and front end.
//!
//! The tests run against an in-process stub of the Oracle Forge backend
//! started with [`spawn_stub_backend`]. The stub answers on an ephemeral local
//! port, mixes envelope and bare JSON responses the way the real backend
//! does, and records every request it sees.

use axum::body::{Body, Bytes};
use axum::extract::{Multipart, Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use oracle_forge_client::{ClientConfig, GatewayClient};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Adventure that has a world map file.
pub const ADVENTURE_WITH_MAP: &str = "with-map";

/// Bytes served as the world map file; not valid UTF-8.
pub const MAP_BYTES: &[u8] = &[0, 159, 146, 150, 255, 13, 10, 0, 42];

/// Bytes served as a custom map image.
pub const PNG_BYTES: &[u8] = &[137, 80, 78, 71, 13, 10, 26, 10, 0, 0];

/// How long `/test/slow` takes to answer.
pub const SLOW_DELAY: Duration = Duration::from_secs(5);

/// A request as seen by the stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: String,
    /// Path as sent, still percent-encoded.
    pub path: String,
    /// Raw query string.
    pub query: Option<String>,
    /// `Content-Type` request header.
    pub content_type: Option<String>,
    /// `Accept` request header.
    pub accept: Option<String>,
    /// `X-API-Key` request header.
    pub api_key: Option<String>,
    /// Parsed body of `application/json` requests.
    pub body: Option<Value>,
}

/// One part of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPart {
    /// Form field name.
    pub name: Option<String>,
    /// File name.
    pub file_name: Option<String>,
    /// Part content type.
    pub content_type: Option<String>,
    /// Part bytes.
    pub bytes: Vec<u8>,
}

/// Shared stub state.
#[derive(Debug, Default)]
pub struct StubState {
    requests: Mutex<Vec<RecordedRequest>>,
    uploads: Mutex<Vec<Vec<RecordedPart>>>,
    players: Mutex<Vec<Value>>,
    journal: Mutex<Vec<Value>>,
}

impl StubState {
    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received for `method` and `path`.
    #[must_use]
    pub fn hits(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Last request received for `path`.
    #[must_use]
    pub fn last_request(&self, path: &str) -> Option<RecordedRequest> {
        self.requests
            .lock()
            .iter()
            .rev()
            .find(|r| r.path == path)
            .cloned()
    }

    /// Multipart uploads received so far, one entry per request.
    #[must_use]
    pub fn uploads(&self) -> Vec<Vec<RecordedPart>> {
        self.uploads.lock().clone()
    }
}

/// A running stub backend.
#[derive(Debug, Clone)]
pub struct StubBackend {
    /// Base URL of the stub, e.g. `http://127.0.0.1:41234`.
    pub base_url: String,
    /// Recorded traffic.
    pub state: Arc<StubState>,
}

impl StubBackend {
    /// Creates a gateway client for this stub.
    ///
    /// # Panics
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> GatewayClient {
        GatewayClient::with_base_url(&self.base_url).expect("Failed to create client")
    }

    /// Creates a gateway client with extra configuration.
    ///
    /// # Panics
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client_with(&self, config: ClientConfig) -> GatewayClient {
        GatewayClient::new(ClientConfig {
            base_url: self.base_url.clone(),
            ..config
        })
        .expect("Failed to create client")
    }
}

/// Starts the stub backend on an ephemeral local port.
///
/// # Panics
/// Panics if no local port can be bound.
pub async fn spawn_stub_backend() -> StubBackend {
    let state = Arc::new(StubState::default());
    let app = router(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub backend");
    let addr = listener.local_addr().expect("Stub backend has no address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    StubBackend {
        base_url: format!("http://{addr}"),
        state,
    }
}

/// Returns a URL on which nothing is listening.
///
/// # Panics
/// Panics if no local port can be bound.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind scratch port");
    let addr = listener.local_addr().expect("Scratch port has no address");
    drop(listener);
    format!("http://{addr}")
}

fn router(state: Arc<StubState>) -> Router {
    Router::new()
        // System
        .route("/health", get(health))
        .route("/config/status", get(config_status))
        // Adventures
        .route("/adventures/list", get(list_adventures))
        .route("/adventures/active", get(active_adventure))
        .route("/adventures/select/{id}", post(select_adventure))
        .route(
            "/adventures/{adv}",
            get(get_adventure).delete(delete_adventure),
        )
        // Players
        .route(
            "/adventures/{adv}/players",
            get(list_players).post(create_player),
        )
        .route(
            "/adventures/{adv}/players/{filename}",
            get(get_player).put(update_player).delete(delete_player),
        )
        // World
        .route(
            "/adventures/{adv}/world/{entity_type}/{name}",
            get(get_world_entity).post(echo_json),
        )
        // Maps
        .route("/adventures/{adv}/map_file", get(map_file))
        .route("/adventures/{adv}/custom_maps", get(list_custom_maps))
        .route(
            "/adventures/{adv}/custom_maps/{filename}",
            get(custom_map_image),
        )
        .route("/adventures/{adv}/upload_map", post(upload))
        .route("/adventures/{adv}/upload_custom_map", post(upload))
        // Session
        .route("/session/log", get(session_log).post(append_session_log))
        .route("/session/character", post(echo_json))
        .route("/session/character/{name}", put(echo_json))
        // Oracle
        .route("/oracle/yesno", post(yes_no))
        .route("/oracle/yesno/flavor", post(echo_json))
        .route("/oracle/scene/flavor", post(echo_json))
        .route("/oracle/meaning/flavor", post(echo_json))
        .route("/oracle/tables/{system}", get(echo_query))
        .route("/oracle/tables/{system}/{name}/roll", get(echo_query))
        // Generators
        .route("/generators/categories", get(generator_categories))
        .route("/generators/roll", post(echo_json))
        .route("/generators/flavor", post(echo_json))
        .route("/generators/custom/{category}/{system}/{id}", post(echo_json))
        // Lookups
        .route("/lookup/categories", get(lookup_categories))
        .route("/lookup/systems", get(lookup_systems))
        .route("/lookup/{kind}", post(echo_json))
        .route("/lookup/{kind}/random", post(echo_json))
        .route("/lookup/{kind}/{system}", get(echo_query))
        // Combat
        .route("/combat/sessions", post(echo_json))
        .route("/combat/sessions/{id}", put(echo_json))
        .route("/combat/sessions/{id}/roll-initiative", post(acknowledge))
        .route("/combat/sessions/{id}/next-turn", post(acknowledge))
        .route("/combat/start", post(start_combat))
        .route("/combat/attack", post(echo_json))
        .route("/combat/status", get(combat_status))
        // Wire edge cases
        .route("/test/text", get(text))
        .route("/test/malformed", get(malformed))
        .route("/test/text-error", get(text_error))
        .route("/test/bad-request", get(bad_request))
        .route("/test/rate-limited", get(rate_limited))
        .route("/test/slow", get(slow))
        .route("/test/empty", get(empty))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn record(State(state): State<Arc<StubState>>, req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    };
    let headers = &parts.headers;
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let content_type = header_value(header::CONTENT_TYPE.as_str());
    let body = content_type
        .as_deref()
        .filter(|ct| ct.starts_with("application/json"))
        .and_then(|_| serde_json::from_slice(&bytes).ok());
    let recorded = RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        content_type,
        accept: header_value(header::ACCEPT.as_str()),
        api_key: header_value("x-api-key"),
        body,
    };
    state.requests.lock().push(recorded);
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn ok(data: Value) -> Json<Value> {
    Json(json!({"success": true, "message": "Success", "data": data}))
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": {"message": message, "code": "NOT_FOUND", "status_code": 404}
        })),
    )
        .into_response()
}

// ============================================================================
// System
// ============================================================================

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "oracle-forge"}))
}

async fn config_status() -> Json<Value> {
    ok(json!({"ai_enabled": false, "version": "stub"}))
}

// ============================================================================
// Adventures
// ============================================================================

async fn list_adventures() -> Json<Value> {
    ok(json!(["greyhawk", "saltmarsh"]))
}

async fn active_adventure() -> Json<Value> {
    Json(json!({"active": "greyhawk"}))
}

async fn select_adventure(Path(id): Path<String>) -> Json<Value> {
    Json(json!({"success": true, "message": format!("Adventure {id} selected")}))
}

async fn get_adventure(Path(adv): Path<String>) -> Response {
    if adv == "missing" {
        return not_found("Adventure not found");
    }
    ok(json!({"id": adv, "name": adv})).into_response()
}

async fn delete_adventure() -> StatusCode {
    StatusCode::NO_CONTENT
}

// ============================================================================
// Players
// ============================================================================

async fn list_players(State(state): State<Arc<StubState>>) -> Json<Value> {
    ok(Value::Array(state.players.lock().clone()))
}

async fn create_player(
    State(state): State<Arc<StubState>>,
    Path(adv): Path<String>,
    Json(mut body): Json<Value>,
) -> Response {
    let Some(name) = body.get("name").and_then(Value::as_str).map(str::to_string) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "Missing player name"})),
        )
            .into_response();
    };

    body["filename"] = json!(format!("{}.json", name.to_lowercase().replace(' ', "_")));
    body["adventure"] = json!(adv);
    body["created_at"] = json!("2026-10-16T12:00:00Z");
    state.players.lock().push(body.clone());
    (StatusCode::CREATED, ok(body)).into_response()
}

async fn get_player(
    State(state): State<Arc<StubState>>,
    Path((_adv, filename)): Path<(String, String)>,
) -> Response {
    let players = state.players.lock();
    match players.iter().find(|p| p["filename"] == filename.as_str()) {
        Some(player) => ok(player.clone()).into_response(),
        None => not_found("Player not found"),
    }
}

async fn update_player(
    State(state): State<Arc<StubState>>,
    Path((_adv, filename)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let mut players = state.players.lock();
    match players.iter_mut().find(|p| p["filename"] == filename.as_str()) {
        Some(player) => {
            if let (Some(target), Some(fields)) = (player.as_object_mut(), body.as_object()) {
                for (key, value) in fields {
                    target.insert(key.clone(), value.clone());
                }
            }
            ok(player.clone()).into_response()
        }
        None => not_found("Player not found"),
    }
}

async fn delete_player(
    State(state): State<Arc<StubState>>,
    Path((_adv, filename)): Path<(String, String)>,
) -> Response {
    let mut players = state.players.lock();
    let before = players.len();
    players.retain(|p| p["filename"] != filename.as_str());
    if players.len() == before {
        return not_found("Player not found");
    }
    ok(json!({"deleted": filename})).into_response()
}

// ============================================================================
// World
// ============================================================================

async fn get_world_entity(
    Path((adv, entity_type, name)): Path<(String, String, String)>,
) -> Json<Value> {
    ok(json!({"adventure": adv, "type": entity_type, "name": name}))
}

async fn echo_json(Json(body): Json<Value>) -> Json<Value> {
    ok(body)
}

// ============================================================================
// Maps
// ============================================================================

async fn map_file(Path(adv): Path<String>) -> Response {
    if adv != ADVENTURE_WITH_MAP {
        return not_found("Map file not found");
    }
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        Bytes::from_static(MAP_BYTES),
    )
        .into_response()
}

async fn list_custom_maps() -> Json<Value> {
    Json(json!(["city.png", "dungeon level 1.png"]))
}

async fn custom_map_image(Path((_adv, filename)): Path<(String, String)>) -> Response {
    if !filename.ends_with(".png") {
        return not_found("Custom map not found");
    }
    ([(header::CONTENT_TYPE, "image/png")], Bytes::from_static(PNG_BYTES)).into_response()
}

async fn upload(State(state): State<Arc<StubState>>, mut multipart: Multipart) -> Response {
    let mut parts = Vec::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let name = field.name().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes.to_vec(),
                    Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
                };
                parts.push(RecordedPart {
                    name,
                    file_name,
                    content_type,
                    bytes,
                });
            }
            Ok(None) => break,
            Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
        }
    }

    let file_name = parts
        .iter()
        .find(|p| p.name.as_deref() == Some("file"))
        .and_then(|p| p.file_name.clone());
    state.uploads.lock().push(parts);

    match file_name {
        Some(file_name) => ok(json!({"filename": file_name})).into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "No file provided"})),
        )
            .into_response(),
    }
}

// ============================================================================
// Session
// ============================================================================

async fn session_log(State(state): State<Arc<StubState>>) -> Json<Value> {
    ok(Value::Array(state.journal.lock().clone()))
}

async fn append_session_log(
    State(state): State<Arc<StubState>>,
    Json(entry): Json<Value>,
) -> Json<Value> {
    state.journal.lock().push(entry.clone());
    ok(entry)
}

// ============================================================================
// Oracle / Generators / Lookups
// ============================================================================

async fn yes_no(Json(body): Json<Value>) -> Response {
    match body.get("question").and_then(Value::as_str) {
        Some(question) if !question.is_empty() => ok(json!({
            "question": question,
            "odds": body.get("odds").cloned().unwrap_or(json!("50/50")),
            "answer": "Yes",
            "roll": 42
        }))
        .into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "Question is required"})),
        )
            .into_response(),
    }
}

async fn echo_query(req: Request) -> Json<Value> {
    ok(json!({
        "path": req.uri().path(),
        "query": req.uri().query(),
    }))
}

async fn generator_categories() -> Json<Value> {
    Json(json!(["dungeon", "settlement", "npc"]))
}

async fn lookup_categories() -> Json<Value> {
    ok(json!({"monster": ["beast", "undead"], "item": ["weapon", "armor"]}))
}

async fn lookup_systems() -> Json<Value> {
    ok(json!(["dnd5e", "ose"]))
}

// ============================================================================
// Combat
// ============================================================================

async fn start_combat(Json(body): Json<Value>) -> Response {
    let monsters = body
        .get("monsters")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if monsters.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "No monsters specified"})),
        )
            .into_response();
    }
    ok(json!({"round": 1, "initiative_order": monsters})).into_response()
}

async fn combat_status() -> Json<Value> {
    ok(json!({"active": false}))
}

async fn acknowledge(req: Request) -> Json<Value> {
    ok(json!({"path": req.uri().path()}))
}

// ============================================================================
// Wire edge cases
// ============================================================================

async fn text() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "plain words")
}

async fn malformed() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "{not json")
}

async fn text_error() -> impl IntoResponse {
    (
        StatusCode::BAD_GATEWAY,
        [(header::CONTENT_TYPE, "text/html")],
        "<html>upstream exploded</html>",
    )
}

async fn bad_request() -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"success": false, "error": "Bad things happened"})),
    )
}

async fn rate_limited() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(header::RETRY_AFTER, "30".parse().expect("valid header"));
    (
        StatusCode::TOO_MANY_REQUESTS,
        headers,
        Json(json!({"success": false, "error": "Rate limit exceeded"})),
    )
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(SLOW_DELAY).await;
    ok(json!("finally"))
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}
