// Shared by several test binaries; each uses a subset
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use courtier_core::auth::{Navigator, RouteTracker, SessionStore};
use courtier_core::{ApiClient, Config};

pub const VALID_TOKEN: &str = "token-123";
pub const VALID_PASSWORD: &str = "secret";

// ============================================================================
// Fake back office
// ============================================================================

/// What the fake back end saw.
#[derive(Clone, Default)]
pub struct Recorder {
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.auth_headers.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    /// Record the Authorization header, reject anything but the valid token.
    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let expected = format!("Bearer {}", VALID_TOKEN);
        let ok = auth.as_deref() == Some(expected.as_str());
        self.auth_headers.lock().unwrap().push(auth);
        if ok {
            Ok(())
        } else {
            Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "Given token not valid for any token type"})),
            )
                .into_response())
        }
    }
}

fn client_json(id: i64, first: &str, last: &str) -> Value {
    json!({
        "id": id,
        "first_name": first,
        "last_name": last,
        "phone": "0601020304",
        "email": format!("{}@example.com", first.to_lowercase()),
        "agency": 1,
        "agency_name": "Agence Lyon"
    })
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == VALID_PASSWORD {
        Json(json!({"access": VALID_TOKEN, "refresh": "refresh-456"})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
            .into_response()
    }
}

async fn list_clients(State(rec): State<Recorder>, headers: HeaderMap) -> Response {
    if let Err(resp) = rec.authorize(&headers) {
        return resp;
    }
    Json(json!({
        "count": 3,
        "next": null,
        "previous": null,
        "results": [
            client_json(1, "Jeanne", "Martin"),
            client_json(2, "Paul", "Durand"),
            client_json(3, "Chloe", "Bernard"),
        ]
    }))
    .into_response()
}

async fn create_client(
    State(rec): State<Recorder>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    if let Err(resp) = rec.authorize(&headers) {
        return resp;
    }
    if body["email"] == "doublon@example.com" {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "Email invalide"}))).into_response();
    }
    body["id"] = json!(10);
    body["agency_name"] = json!("Agence Lyon");
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn get_client(State(rec): State<Recorder>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(resp) = rec.authorize(&headers) {
        return resp;
    }
    match id {
        1 => Json(client_json(1, "Jeanne", "Martin")).into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response(),
    }
}

async fn update_client(
    State(rec): State<Recorder>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Response {
    if let Err(resp) = rec.authorize(&headers) {
        return resp;
    }
    body["id"] = json!(id);
    Json(body).into_response()
}

async fn delete_client(State(rec): State<Recorder>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(resp) = rec.authorize(&headers) {
        return resp;
    }
    match id {
        1 => StatusCode::NO_CONTENT.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Older back end version: bare array
async fn list_agencies(State(rec): State<Recorder>, headers: HeaderMap) -> Response {
    if let Err(resp) = rec.authorize(&headers) {
        return resp;
    }
    Json(json!([
        {"id": 1, "name": "Agence Lyon", "city": "Lyon"},
        {"id": 2, "name": "Agence Nantes", "city": "Nantes"}
    ]))
    .into_response()
}

async fn list_insurances(
    State(rec): State<Recorder>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    if let Err(resp) = rec.authorize(&headers) {
        return resp;
    }
    rec.queries.lock().unwrap().push(query.unwrap_or_default());
    Json(json!({
        "count": 5,
        "next": "http://api.test/insurances?page=2",
        "previous": null,
        "results": [{
            "id": 1,
            "insurance_type": "Habitation",
            "amount": "1200.00",
            "start_date": "2025-01-01",
            "end_date": "2026-01-01",
            "client": 1,
            "agency": 1,
            "client_full_name": "Martin Jeanne"
        }]
    }))
    .into_response()
}

async fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, Json(json!({"detail": "You do not have permission."}))).into_response()
}

async fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "<h1>Server Error (500)</h1>").into_response()
}

async fn unavailable() -> Response {
    StatusCode::SERVICE_UNAVAILABLE.into_response()
}

async fn garbage() -> Response {
    (StatusCode::OK, "definitely not json").into_response()
}

pub struct FakeBackend {
    pub base_url: String,
    pub recorder: Recorder,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let recorder = Recorder::default();
        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/clients", get(list_clients).post(create_client))
            .route(
                "/api/clients/:id",
                get(get_client).put(update_client).delete(delete_client),
            )
            .route("/api/agencies", get(list_agencies))
            .route("/api/insurances", get(list_insurances))
            .route("/api/forbidden", get(forbidden))
            .route("/api/broken", get(server_error))
            .route("/api/maintenance", get(unavailable))
            .route("/api/garbage", get(garbage))
            .with_state(recorder.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            recorder,
        }
    }
}

// ============================================================================
// Client setup
// ============================================================================

pub struct TestClient {
    pub api: ApiClient,
    pub session: SessionStore,
    pub navigator: Arc<RouteTracker>,
}

pub fn config_for(base_url: &str) -> Config {
    Config {
        api_base_url: base_url.to_string(),
        request_timeout_secs: 5,
        ..Config::default()
    }
}

/// Client on `route`, optionally already holding `token`.
pub fn test_client(base_url: &str, route: &str, token: Option<&str>) -> TestClient {
    let session = SessionStore::in_memory();
    if let Some(token) = token {
        session.save(token).unwrap();
    }
    let navigator = Arc::new(RouteTracker::new(route));
    let api = ApiClient::new(&config_for(base_url), session.clone())
        .unwrap()
        .with_navigator(navigator.clone() as Arc<dyn Navigator>);
    TestClient {
        api,
        session,
        navigator,
    }
}
