//! Thin HTTP client for the user service API.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {operation}")]
    UnexpectedStatus {
        operation: &'static str,
        status: StatusCode,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// The subset of the user payload the bot cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct UserClient {
    http: reqwest::Client,
    base_url: String,
}

impl UserClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BotError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<UserSummary, BotError> {
        let response = self
            .http
            .post(format!("{}/api/users", self.base_url))
            .json(user)
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED | StatusCode::OK => Ok(response.json().await?),
            status => Err(BotError::UnexpectedStatus {
                operation: "create user",
                status,
            }),
        }
    }

    /// `Ok(None)` when the service answers 404.
    pub async fn get_user(&self, id: &str) -> Result<Option<UserSummary>, BotError> {
        let response = self
            .http
            .get(format!("{}/api/users/{id}", self.base_url))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(BotError::UnexpectedStatus {
                operation: "get user",
                status,
            }),
        }
    }
}
