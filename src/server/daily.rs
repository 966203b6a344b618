use crate::server::room_name::{self, PrefixTooLongError};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

// Rooms created through this backend carry a "prsnc-" prefix and expire an
// hour after creation.
const ROOM_NAME_PREFIX: &str = "prsnc-";
const ROOM_TTL_SECS: i64 = 60 * 60;

#[derive(Clone)]
pub struct DailyClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

/// A Daily room, narrowed to the fields returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    pub url: String,
}

/// A participant currently in a room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Participant {
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

#[derive(Debug, Error)]
pub enum DailyError {
    #[error("daily api call failed: {status}: {body}")]
    UpstreamCall { status: u16, body: String },
    #[error("failed to decode daily response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("daily api request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to generate room name: {0}")]
    RoomName(#[from] PrefixTooLongError),
}

impl DailyClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }

    /// Creates a room with a freshly generated name. Every call creates a new
    /// room; names are random enough that collisions need no coordination.
    pub async fn create_room(&self) -> Result<Room, DailyError> {
        let name = room_name::generate_with_prefix(ROOM_NAME_PREFIX)?;
        let body = json!({
            "name": name,
            "properties": { "exp": now_unix_secs() + ROOM_TTL_SECS },
        });
        self.request_json(Method::POST, "/rooms", Some(body)).await
    }

    /// Lists the participants currently in the given room. An empty room
    /// yields an empty list, not an error.
    pub async fn get_presence(&self, room_name: &str) -> Result<Vec<Participant>, DailyError> {
        let response: PresenceResponse = self
            .request_json(Method::GET, &format!("/rooms/{room_name}/presence"), None)
            .await?;
        Ok(response
            .data
            .into_iter()
            .map(|record| Participant {
                id: record.id,
                display_name: record.user_name,
            })
            .collect())
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, DailyError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let mut request = self
            .http
            .request(method, &url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        decode_response(response).await
    }
}

async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, DailyError> {
    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        return Err(DailyError::UpstreamCall {
            status: status.as_u16(),
            body,
        });
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[derive(Debug, Deserialize)]
struct PresenceResponse {
    #[serde(default)]
    data: Vec<PresenceRecord>,
}

// Upstream participant record. Only the id and display name survive the
// translation; room id, internal user id, join time and duration are dropped.
#[derive(Debug, Deserialize)]
struct PresenceRecord {
    id: String,
    #[serde(rename = "userName")]
    user_name: String,
}

fn now_unix_secs() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
