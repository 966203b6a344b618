mod daily;
mod room_name;

use crate::server::daily::DailyClient;
use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

const DEFAULT_API_URL: &str = "https://api.daily.co/v1";

#[derive(Debug, Clone)]
struct AppConfig {
    api_key: Option<String>,
    api_url: String,
    port: u16,
}

struct AppState {
    // None when no API key was configured; requests that would need the
    // upstream API are rejected without a network call.
    daily: Option<DailyClient>,
}

#[derive(Debug, Serialize)]
struct OkResponse {
    ok: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    if config.api_key.is_none() {
        tracing::warn!("DAILY_API_KEY is not set, room and presence requests will be rejected");
    }

    let port = config.port;
    let app = router(Arc::new(AppState::new(&config)));

    let address = format!("0.0.0.0:{port}");
    tracing::info!("listening on {address}");
    let listener = tokio::net::TcpListener::bind(&address).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

impl AppConfig {
    fn from_env() -> Self {
        Self {
            api_key: env::var("DAILY_API_KEY")
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            api_url: env::var("DAILY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(8787),
        }
    }
}

impl AppState {
    fn new(config: &AppConfig) -> Self {
        Self {
            daily: config
                .api_key
                .clone()
                .map(|api_key| DailyClient::new(api_key, config.api_url.clone())),
        }
    }
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/rooms", post(create_room))
        .route("/api/presence", get(get_presence).post(get_presence))
        .layer(cors)
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(OkResponse { ok: true })
}

async fn create_room(State(state): State<Arc<AppState>>) -> Response {
    let Some(daily) = &state.daily else {
        return missing_api_key_response();
    };

    match daily.create_room().await {
        Ok(room) => {
            tracing::info!(room = room.name.as_str(), "created room");
            (StatusCode::OK, Json(room)).into_response()
        }
        Err(error) => {
            tracing::error!(?error, "failed to create room");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to create room (check server logs)",
            )
        }
    }
}

async fn get_presence(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(room_name) = params.get("roomName") else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "roomName parameter not found in request",
        );
    };

    let Some(daily) = &state.daily else {
        return missing_api_key_response();
    };

    match daily.get_presence(room_name).await {
        Ok(participants) => (StatusCode::OK, Json(participants)).into_response(),
        Err(error) => {
            tracing::error!(room = room_name.as_str(), ?error, "failed to get presence");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to get presence (check server logs)",
            )
        }
    }
}

fn missing_api_key_response() -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "server authentication with Daily failed",
    )
}

// All error bodies share the {"error": ...} shape.
fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
