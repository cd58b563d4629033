//! services/reader/tests/common/mod.rs
//!
//! An in-process stand-in for the REST backend, served by axum on an
//! ephemeral port. It keeps its data in memory and records every request so
//! tests can assert on what the client sent.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use auraread_core::ports::SessionStorage;
use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use reader_lib::{
    adapters::MemorySessionStorage,
    app::{AppState, AppStore},
    config::Config,
};
use serde_json::{json, Value};

pub const TOKEN: &str = "test-token";
pub const PASSWORD: &str = "secret";
pub const SAMPLE_TEXT: &str = "The quick brown fox jumps.   It ran over the lazy dog! The end";
pub const AUDIO_BYTES: &[u8] = b"RIFF\x24\x00\x00\x00WAVEfmt ";

//=========================================================================================
// Backend State
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Default)]
pub struct Backend {
    pub documents: Vec<Value>,
    pub texts: HashMap<i64, String>,
    pub annotations: Vec<Value>,
    pub next_id: i64,
    pub requests: Vec<Recorded>,
    /// Text fields of the last multipart request.
    pub last_form: HashMap<String, String>,
    /// `(file name, content type, size)` of the last uploaded file part.
    pub last_file: Option<(String, String, usize)>,
    /// When set, every authenticated endpoint answers 401.
    pub reject_tokens: bool,
}

impl Backend {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Adds a document with extracted text and returns its id.
    pub fn add_document(&mut self, title: &str, language: &str, uploaded_at: &str, text: &str) -> i64 {
        let id = self.next_id();
        self.documents.push(json!({
            "id": id,
            "title": title,
            "description": "",
            "language": language,
            "page_count": 2,
            "file": format!("documents/{}.pdf", id),
            "file_url": format!("http://testserver/media/documents/{}.pdf", id),
            "uploaded_at": uploaded_at,
        }));
        self.texts.insert(id, text.to_string());
        id
    }
}

pub type Shared = Arc<Mutex<Backend>>;

type Reply<T = Json<Value>> = Result<T, (StatusCode, Json<Value>)>;

fn lock(state: &Shared) -> MutexGuard<'_, Backend> {
    state.lock().unwrap()
}

fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." })))
}

fn user_json(username: &str) -> Value {
    json!({ "id": 1, "username": username, "email": format!("{}@example.com", username) })
}

/// Records the request and checks its `Authorization` header.
fn guard(state: &Shared, headers: &HeaderMap, method: &'static str, path: String, scheme: &str) -> Reply<()> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let mut backend = lock(state);
    backend.requests.push(Recorded {
        method,
        path,
        authorization: authorization.clone(),
    });
    let expected = format!("{} {}", scheme, TOKEN);
    if backend.reject_tokens || authorization.as_deref() != Some(expected.as_str()) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Invalid token." })),
        ));
    }
    Ok(())
}

fn record_anonymous(state: &Shared, headers: &HeaderMap, method: &'static str, path: &str) {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    lock(state).requests.push(Recorded {
        method,
        path: path.to_string(),
        authorization,
    });
}

async fn read_form(multipart: &mut Multipart) -> (HashMap<String, String>, Option<(String, String, usize)>) {
    let mut fields = HashMap::new();
    let mut file = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await.unwrap();
                file = Some((file_name, content_type, data.len()));
            }
            None => {
                fields.insert(name, field.text().await.unwrap());
            }
        }
    }
    (fields, file)
}

//=========================================================================================
// Auth Handlers
//=========================================================================================

async fn login(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    record_anonymous(&state, &headers, "POST", "/api/login/");
    let username = body["username"].as_str().unwrap_or_default();
    if body["password"] == PASSWORD {
        Ok(Json(json!({ "token": TOKEN, "user": user_json(username) })))
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid credentials" })),
        ))
    }
}

async fn register(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply<(StatusCode, Json<Value>)> {
    record_anonymous(&state, &headers, "POST", "/api/register/");
    let username = body["username"].as_str().unwrap_or_default();
    if username == "taken" {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "username": ["A user with that username already exists."] })),
        ));
    }
    Ok((
        StatusCode::CREATED,
        Json(json!({ "token": TOKEN, "user": user_json(username) })),
    ))
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    guard(&state, &headers, "POST", "/api/logout/".to_string(), "Token")?;
    Ok(Json(json!({ "message": "Logged out" })))
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    guard(&state, &headers, "GET", "/api/users/me/".to_string(), "Token")?;
    Ok(Json(user_json("ada")))
}

//=========================================================================================
// Document Handlers
//=========================================================================================

async fn list_documents(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    guard(&state, &headers, "GET", "/api/documents/".to_string(), "Token")?;
    Ok(Json(Value::Array(lock(&state).documents.clone())))
}

async fn upload_document(State(state): State<Shared>, headers: HeaderMap, mut multipart: Multipart) -> Reply<(StatusCode, Json<Value>)> {
    guard(&state, &headers, "POST", "/api/documents/".to_string(), "Token")?;
    let (fields, file) = read_form(&mut multipart).await;
    let mut backend = lock(&state);
    let title = fields.get("title").cloned().unwrap_or_default();
    backend.add_document(&title, "en", "2024-03-20T12:00:00Z", SAMPLE_TEXT);
    backend.last_form = fields;
    backend.last_file = file;
    let doc = backend.documents.last().cloned().unwrap_or_default();
    Ok((StatusCode::CREATED, Json(doc)))
}

async fn get_document(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    guard(&state, &headers, "GET", format!("/api/documents/{}/", id), "Token")?;
    lock(&state)
        .documents
        .iter()
        .find(|d| d["id"] == id)
        .cloned()
        .map(Json)
        .ok_or_else(not_found)
}

async fn update_document(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(patch): Json<Value>,
) -> Reply {
    guard(&state, &headers, "PATCH", format!("/api/documents/{}/", id), "Token")?;
    let mut backend = lock(&state);
    let doc = backend
        .documents
        .iter_mut()
        .find(|d| d["id"] == id)
        .ok_or_else(not_found)?;
    if let Value::Object(fields) = patch {
        for (key, value) in fields {
            doc[key.as_str()] = value;
        }
    }
    Ok(Json(doc.clone()))
}

async fn delete_document(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Reply<StatusCode> {
    guard(&state, &headers, "DELETE", format!("/api/documents/{}/", id), "Token")?;
    let mut backend = lock(&state);
    let before = backend.documents.len();
    backend.documents.retain(|d| d["id"] != id);
    if backend.documents.len() == before {
        return Err(not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn extract_text(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    guard(&state, &headers, "GET", format!("/api/documents/{}/extract_text/", id), "Token")?;
    lock(&state)
        .texts
        .get(&id)
        .map(|text| Json(json!({ "text": text })))
        .ok_or_else(not_found)
}

async fn tts(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Reply<Response> {
    guard(&state, &headers, "POST", format!("/api/documents/{}/tts/", id), "Token")?;
    let (fields, _) = read_form(&mut multipart).await;
    if fields.get("text").map_or(true, |t| t.is_empty()) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No text provided" })),
        ));
    }
    lock(&state).last_form = fields;
    Ok(([(header::CONTENT_TYPE, "audio/wav")], Bytes::from_static(AUDIO_BYTES)).into_response())
}

async fn voices(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    guard(&state, &headers, "GET", "/api/documents/available_voices/".to_string(), "Token")?;
    Ok(Json(json!({
        "windows_sapi": [
            { "id": "HKEY\\Voices\\TTS_MS_EN-US_DAVID", "name": "Microsoft David", "language": "en-us" },
            { "id": "HKEY\\Voices\\TTS_MS_DE-DE_HEDDA", "name": "Microsoft Hedda", "language": "de-de" }
        ],
        "pyttsx3": [
            { "id": "espeak-en", "name": "eSpeak English", "language": "en" }
        ]
    })))
}

//=========================================================================================
// Annotation Handlers
//=========================================================================================

async fn list_annotations(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    guard(&state, &headers, "GET", "/api/annotations/".to_string(), "Token")?;
    let document: i64 = query
        .get("document")
        .and_then(|d| d.parse().ok())
        .ok_or((StatusCode::BAD_REQUEST, Json(json!({ "error": "document is required" }))))?;
    let found: Vec<Value> = lock(&state)
        .annotations
        .iter()
        .filter(|a| a["document"] == document)
        .cloned()
        .collect();
    Ok(Json(Value::Array(found)))
}

fn annotation_from(id: i64, body: &Value) -> Value {
    json!({
        "id": id,
        "document": body["document"],
        "start_offset": body["start_offset"],
        "end_offset": body["end_offset"],
        "selected_text": body["selected_text"],
        "note": body["note"],
        "highlight_color": body["highlight_color"],
        "page_number": body["page_number"],
        "created_at": "2024-03-21T08:30:00Z",
        "updated_at": "2024-03-21T08:30:00Z",
    })
}

async fn create_annotation(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply<(StatusCode, Json<Value>)> {
    guard(&state, &headers, "POST", "/api/annotations/".to_string(), "Token")?;
    let mut backend = lock(&state);
    let id = backend.next_id();
    let annotation = annotation_from(id, &body);
    backend.annotations.push(annotation.clone());
    Ok((StatusCode::CREATED, Json(annotation)))
}

async fn update_annotation(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    guard(&state, &headers, "PUT", format!("/api/annotations/{}/", id), "Token")?;
    let mut backend = lock(&state);
    let slot = backend
        .annotations
        .iter_mut()
        .find(|a| a["id"] == id)
        .ok_or_else(not_found)?;
    *slot = annotation_from(id, &body);
    Ok(Json(slot.clone()))
}

async fn delete_annotation(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Reply<StatusCode> {
    guard(&state, &headers, "DELETE", format!("/api/annotations/{}/", id), "Token")?;
    lock(&state).annotations.retain(|a| a["id"] != id);
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// AI Handlers
//=========================================================================================

async fn summarize(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    guard(&state, &headers, "POST", "/api/ai/summarize/".to_string(), "Bearer")?;
    let words = body["text"].as_str().unwrap_or_default().split_whitespace().count();
    Ok(Json(json!({
        "summary": format!("A text of {} words.", words),
        "key_points": ["Foxes jump", "Dogs are lazy"],
        "cached": false,
        "generated_at": "2024-03-21T09:00:00Z",
    })))
}

async fn question(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    guard(&state, &headers, "POST", "/api/ai/question/".to_string(), "Bearer")?;
    Ok(Json(json!({
        "question": body["question"],
        "answer": "The fox.",
        "document_title": "Fables",
    })))
}

async fn generate_tags(State(state): State<Shared>, headers: HeaderMap, Json(_body): Json<Value>) -> Reply {
    guard(&state, &headers, "POST", "/api/ai/generate_tags/".to_string(), "Bearer")?;
    Ok(Json(json!({
        "tags": [
            { "tag": "animals", "confidence": 0.9, "created": true },
            { "tag": "fables", "confidence": 0.6, "created": false }
        ]
    })))
}

//=========================================================================================
// Server Setup
//=========================================================================================

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/login/", post(login))
        .route("/api/register/", post(register))
        .route("/api/logout/", post(logout))
        .route("/api/users/me/", get(me))
        .route("/api/documents/", get(list_documents).post(upload_document))
        .route("/api/documents/available_voices/", get(voices))
        .route(
            "/api/documents/{id}/",
            get(get_document).patch(update_document).delete(delete_document),
        )
        .route("/api/documents/{id}/extract_text/", get(extract_text))
        .route("/api/documents/{id}/tts/", post(tts))
        .route("/api/annotations/", get(list_annotations).post(create_annotation))
        .route("/api/annotations/{id}/", put(update_annotation).delete(delete_annotation))
        .route("/api/ai/summarize/", post(summarize))
        .route("/api/ai/question/", post(question))
        .route("/api/ai/generate_tags/", post(generate_tags))
        .with_state(state)
}

pub struct MockServer {
    pub base_url: String,
    pub state: Shared,
}

impl MockServer {
    pub async fn start() -> Self {
        let state = Shared::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base_url: format!("http://{}/api/", addr),
            state,
        }
    }

    pub fn backend(&self) -> MutexGuard<'_, Backend> {
        lock(&self.state)
    }

    pub fn config(&self) -> Config {
        let base_url = self.base_url.clone();
        Config::from_lookup(move |key| match key {
            "AURAREAD_API_URL" => Some(base_url.clone()),
            "AURAREAD_TIMEOUT_SECS" => Some("5".to_string()),
            _ => None,
        })
        .unwrap()
    }

    pub fn app_state(&self, storage: Arc<dyn SessionStorage>) -> AppState {
        AppState::with_storage(self.config(), storage).unwrap()
    }

    /// A store with fresh in-memory storage and no session.
    pub fn store(&self) -> (AppStore, Arc<MemorySessionStorage>) {
        let storage = Arc::new(MemorySessionStorage::new());
        let store = AppStore::new(self.app_state(storage.clone()));
        (store, storage)
    }

    /// A store already holding a valid session.
    pub fn logged_in_store(&self) -> (AppStore, Arc<MemorySessionStorage>) {
        let storage = Arc::new(MemorySessionStorage::new());
        storage.set_item("token", TOKEN).unwrap();
        storage
            .set_item("user", r#"{"id":1,"username":"ada","email":"ada@example.com"}"#)
            .unwrap();
        let store = AppStore::new(self.app_state(storage.clone()));
        (store, storage)
    }
}
