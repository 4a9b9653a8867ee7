//! Reference item store: an in-memory REST service speaking the
//! `{"success": .., "data": ..}` envelope format.
//!
//! Items are kept in insertion order so `GET /items` lists them the way they
//! were created.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

fn default_user_id() -> u64 {
    1
}

#[derive(Deserialize)]
pub struct CreateItem {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(rename = "userId", default = "default_user_id")]
    pub user_id: u64,
}

/// Every field is optional; absent fields keep their stored value. Clients
/// may send a whole item, in which case `_id` is ignored.
#[derive(Deserialize)]
pub struct UpdateItem {
    pub title: Option<String>,
    pub completed: Option<bool>,
    #[serde(rename = "userId")]
    pub user_id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// A failed request: status code plus the envelope's error message.
pub struct Failure(StatusCode, &'static str);

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = Envelope::<()> {
            success: false,
            data: None,
            error: Some(self.1.to_string()),
        };
        (self.0, Json(body)).into_response()
    }
}

const NOT_FOUND: Failure = Failure(StatusCode::NOT_FOUND, "item not found");
const BLANK_TITLE: Failure = Failure(StatusCode::UNPROCESSABLE_ENTITY, "title must not be empty");

pub type Db = Arc<RwLock<Vec<Item>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/{id}", put(update_item).delete(delete_item))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_items(State(db): State<Db>) -> Json<Envelope<Vec<Item>>> {
    let items = db.read().await;
    Json(Envelope::ok(items.clone()))
}

async fn create_item(
    State(db): State<Db>,
    Json(input): Json<CreateItem>,
) -> Result<(StatusCode, Json<Envelope<Item>>), Failure> {
    if input.title.trim().is_empty() {
        return Err(BLANK_TITLE);
    }
    let item = Item {
        id: Uuid::new_v4(),
        title: input.title,
        completed: input.completed,
        user_id: input.user_id,
    };
    db.write().await.push(item.clone());
    info!(id = %item.id, "created item");
    Ok((StatusCode::CREATED, Json(Envelope::ok(item))))
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateItem>,
) -> Result<Json<Envelope<Item>>, Failure> {
    if input.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(BLANK_TITLE);
    }
    let mut items = db.write().await;
    let item = items.iter_mut().find(|i| i.id == id).ok_or(NOT_FOUND)?;
    if let Some(title) = input.title {
        item.title = title;
    }
    if let Some(completed) = input.completed {
        item.completed = completed;
    }
    if let Some(user_id) = input.user_id {
        item.user_id = user_id;
    }
    info!(%id, completed = item.completed, "updated item");
    Ok(Json(Envelope::ok(item.clone())))
}

async fn delete_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<()>>, Failure> {
    let mut items = db.write().await;
    let position = items.iter().position(|i| i.id == id).ok_or(NOT_FOUND)?;
    items.remove(position);
    info!(%id, "deleted item");
    Ok(Json(Envelope {
        success: true,
        data: None,
        error: None,
    }))
}
