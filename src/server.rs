//! JSON API and static front-end for the city dashboard.
//!
//! Runs alongside the bot polling loop in the same process; the two share
//! only the database pool.
use crate::db::{self, Pool};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

#[derive(Clone)]
struct AppState {
    pool: Pool,
}

/// GET /api/city/:name response body.
#[derive(Debug, Serialize)]
struct CityStats {
    city: String,
    subs: i64,
    posts: i64,
    income: String,
    tg_link: String,
}

/// One element of the GET /api/settings/:city response.
#[derive(Debug, Serialize)]
struct SettingItem {
    id: i64,
    name: String,
    enabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// PUT /api/settings/:id response body (includes the city).
#[derive(Debug, Serialize)]
struct UpdatedSetting {
    id: i64,
    city: String,
    name: String,
    enabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct UpdateSettingRequest {
    name: String,
    enabled: bool,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

fn router(pool: Pool, static_dir: &str) -> Router {
    // The Telegram mini app is served cross-origin during development.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/city/:name", get(city_stats))
        .route("/api/settings/:key", get(list_settings).put(update_setting))
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .with_state(AppState { pool })
}

/// Bind and serve until the process exits.
pub async fn run(port: u16, pool: Pool, static_dir: &str) -> anyhow::Result<()> {
    let app = router(pool, static_dir);
    let addr = format!("0.0.0.0:{port}");
    info!(%addr, static_dir, "starting web server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn city_stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CityStats>, ApiError> {
    let city = db::get_city(&state.pool, &name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("city {name} not found")))?;
    Ok(Json(CityStats {
        city: city.name,
        subs: city.subscriber_count,
        posts: city.post_count,
        income: city.income_text,
        tg_link: city.channel_link,
    }))
}

async fn list_settings(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<Vec<SettingItem>>, ApiError> {
    let settings = db::list_settings(&state.pool, &city).await?;
    let items = settings
        .into_iter()
        .map(|s| SettingItem {
            id: s.id,
            name: s.name,
            enabled: s.enabled,
            created_at: s.created_at,
            updated_at: s.updated_at,
        })
        .collect();
    Ok(Json(items))
}

async fn update_setting(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateSettingRequest>,
) -> Result<Json<UpdatedSetting>, ApiError> {
    let setting = db::update_setting(&state.pool, id, &req.name, req.enabled)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("setting {id} not found")))?;
    Ok(Json(UpdatedSetting {
        id: setting.id,
        city: setting.city,
        name: setting.name,
        enabled: setting.enabled,
        created_at: setting.created_at,
        updated_at: setting.updated_at,
    }))
}
