use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{
        header::{ACCEPT, CONTENT_TYPE, LOCATION},
        HeaderMap, Method, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub admin: bool,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub name: String,
    #[serde(default)]
    pub admin: bool,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub admin: Option<bool>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, User>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/echo", any(echo))
        .route("/redirect", get(redirect))
        .route("/blob/{size}", get(blob))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

/// Users are rendered as XML when the client accepts it, JSON otherwise.
fn wants_xml(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("xml"))
}

fn user_xml(user: &User) -> String {
    format!(
        r#"<user id="{}"><name>{}</name><admin>{}</admin></user>"#,
        user.id,
        escape(user.name.as_str()),
        user.admin
    )
}

fn negotiate<T: Serialize>(
    headers: &HeaderMap,
    status: StatusCode,
    value: T,
    xml: impl FnOnce() -> String,
) -> Response {
    if wants_xml(headers) {
        let body = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", xml());
        (status, [(CONTENT_TYPE, "application/xml")], body).into_response()
    } else {
        (status, Json(value)).into_response()
    }
}

async fn list_users(State(db): State<Db>, headers: HeaderMap) -> Response {
    let mut users: Vec<User> = db.read().await.values().cloned().collect();
    users.sort_by(|a, b| a.name.cmp(&b.name));
    negotiate(&headers, StatusCode::OK, &users, || {
        let items: String = users.iter().map(user_xml).collect();
        format!("<users>{items}</users>")
    })
}

async fn create_user(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateUser>,
) -> Response {
    let user = User {
        id: Uuid::new_v4(),
        name: input.name,
        admin: input.admin,
    };
    db.write().await.insert(user.id, user.clone());
    tracing::debug!(id = %user.id, "created user");
    negotiate(&headers, StatusCode::CREATED, &user, || user_xml(&user))
}

async fn get_user(State(db): State<Db>, headers: HeaderMap, Path(id): Path<Uuid>) -> Response {
    match db.read().await.get(&id) {
        Some(user) => negotiate(&headers, StatusCode::OK, user, || user_xml(user)),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn update_user(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUser>,
) -> Response {
    let mut users = db.write().await;
    let Some(user) = users.get_mut(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if let Some(name) = input.name {
        user.name = name;
    }
    if let Some(admin) = input.admin {
        user.admin = admin;
    }
    let user = user.clone();
    negotiate(&headers, StatusCode::OK, &user, || user_xml(&user))
}

async fn delete_user(State(db): State<Db>, Path(id): Path<Uuid>) -> StatusCode {
    match db.write().await.remove(&id) {
        Some(_) => {
            tracing::debug!(%id, "deleted user");
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

/// Reflects the request back as JSON so clients can inspect what was sent.
async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let header_map: Map<String, Value> = headers
        .iter()
        .map(|(name, value)| {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            (name.as_str().to_string(), Value::String(value))
        })
        .collect();
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "headers": header_map,
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn redirect() -> impl IntoResponse {
    (StatusCode::FOUND, [(LOCATION, "/users")])
}

/// `size` bytes of a repeating 0..=250 pattern. Most of it is not valid UTF-8.
async fn blob(Path(size): Path<usize>) -> impl IntoResponse {
    ([(CONTENT_TYPE, "application/octet-stream")], blob_bytes(size))
}

fn blob_bytes(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serializes_to_json() {
        let user = User {
            id: Uuid::nil(),
            name: "Ada".to_string(),
            admin: false,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["name"], "Ada");
        assert_eq!(json["admin"], false);
    }

    #[test]
    fn user_xml_escapes_text() {
        let user = User {
            id: Uuid::nil(),
            name: "A&B <C>".to_string(),
            admin: true,
        };
        assert_eq!(
            user_xml(&user),
            r#"<user id="00000000-0000-0000-0000-000000000000"><name>A&amp;B &lt;C&gt;</name><admin>true</admin></user>"#
        );
    }

    #[test]
    fn create_user_defaults_admin_to_false() {
        let input: CreateUser = serde_json::from_str(r#"{"name":"No flag"}"#).unwrap();
        assert_eq!(input.name, "No flag");
        assert!(!input.admin);
    }

    #[test]
    fn create_user_rejects_missing_name() {
        let result: Result<CreateUser, _> = serde_json::from_str(r#"{"admin":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_user_all_fields_optional() {
        let input: UpdateUser = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.name.is_none());
        assert!(input.admin.is_none());
    }

    #[test]
    fn blob_pattern_wraps_at_251() {
        let bytes = blob_bytes(253);
        assert_eq!(bytes.len(), 253);
        assert_eq!(bytes[250], 250);
        assert_eq!(&bytes[251..], &[0, 1]);
    }

    #[test]
    fn accept_header_selects_xml() {
        let mut headers = HeaderMap::new();
        assert!(!wants_xml(&headers));
        headers.insert(ACCEPT, "application/xml".parse().unwrap());
        assert!(wants_xml(&headers));
    }
}
