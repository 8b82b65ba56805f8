//! In-memory [`Backend`] for tests and offline fixtures.
//!
//! GET replies are keyed by path and served until replaced. POST replies
//! default to an empty 204; every POST body is recorded so callers can assert
//! on exactly what was sent.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::endpoints;
use crate::error::{ClientError, Result};
use crate::rest::{ApiResponse, Backend};

/// A canned reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    /// A non-2xx status code.
    Status(u16),
    /// A 200 carrying `{"error": message}`.
    Business(String),
    Timeout,
}

impl Reply {
    fn resolve(&self, path: &str) -> Result<ApiResponse> {
        match self {
            Self::Json(v) => ApiResponse::Json(v.clone()).check_business_error(),
            Self::Status(204) => Ok(ApiResponse::Empty),
            Self::Status(code) => {
                let status = reqwest::StatusCode::from_u16(*code)
                    .unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_success() {
                    Ok(ApiResponse::Empty)
                } else {
                    Err(ClientError::from_status(status))
                }
            }
            Self::Business(message) => Err(ClientError::Business(message.clone())),
            Self::Timeout => Err(ClientError::Timeout {
                path: path.to_owned(),
                after: Duration::ZERO,
            }),
        }
    }
}

#[derive(Default)]
struct State {
    gets: HashMap<String, Reply>,
    posts: HashMap<String, Reply>,
    get_counts: HashMap<String, usize>,
    sent: Vec<(String, Value)>,
}

#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a backend from a fixture document of the form
    /// `{"players": [...], "items": [...], "loot_history": [...],
    ///   "raids": [...], "raid_days": [...], "current_user": {...}}`.
    ///
    /// Missing collections are served as empty; a missing `current_user`
    /// means a guest.
    pub fn from_fixture(mut fixture: Value) -> Self {
        let backend = Self::new();
        let mut take = |key: &str| fixture.get_mut(key).map(Value::take);
        let collections = [
            ("players", endpoints::GET_PLAYERS),
            ("items", endpoints::GET_ITEMS),
            ("loot_history", endpoints::GET_LOOT_HISTORY),
            ("raids", endpoints::GET_RAIDS),
            ("raid_days", endpoints::GET_RAID_DAYS),
        ];
        for (key, path) in collections {
            backend.set_get(path, take(key).unwrap_or_else(|| Value::Array(Vec::new())));
        }
        let viewer = take("current_user").unwrap_or(Value::Null);
        backend.set_get(endpoints::GET_CURRENT_USER, serde_json::json!({ "player": viewer }));
        backend
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_get(&self, path: &str, body: Value) {
        self.set_reply(path, Reply::Json(body));
    }

    pub fn set_reply(&self, path: &str, reply: Reply) {
        self.lock().gets.insert(path.to_owned(), reply);
    }

    pub fn set_post_reply(&self, path: &str, reply: Reply) {
        self.lock().posts.insert(path.to_owned(), reply);
    }

    /// Every POST so far, oldest first.
    pub fn posts(&self) -> Vec<(String, Value)> {
        self.lock().sent.clone()
    }

    pub fn get_count(&self, path: &str) -> usize {
        self.lock().get_counts.get(path).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get(&self, path: &str) -> Result<Value> {
        let reply = {
            let mut state = self.lock();
            *state.get_counts.entry(path.to_owned()).or_default() += 1;
            state.gets.get(path).cloned()
        };
        match reply {
            Some(reply) => Ok(reply.resolve(path)?.into_value()),
            None => Err(ClientError::from_status(reqwest::StatusCode::NOT_FOUND)),
        }
    }

    async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        let reply = {
            let mut state = self.lock();
            state.sent.push((path.to_owned(), body.clone()));
            state.posts.get(path).cloned()
        };
        match reply {
            Some(reply) => reply.resolve(path),
            None => Ok(ApiResponse::Empty),
        }
    }
}
