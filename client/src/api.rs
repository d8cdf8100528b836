//! HTTP client for the quiz API

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{
    AnswerReply, AnswerRequest, HealthReply, LeaderboardReply, ProblemParseError, StartReply,
    StartRequest, StatusReply,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server error: {0}")]
    Server(String),
    #[error("unreadable problem: {0}")]
    Problem(#[from] ProblemParseError),
    #[error("input error: {0}")]
    Io(#[from] std::io::Error),
}

/// Thin wrapper around the JSON endpoints
///
/// Game level errors (unknown player, missing fields) come back as the
/// `Error` variant of each reply rather than as `Err`; only transport and
/// decoding failures are reported as [`ClientError`].
#[derive(Debug, Clone)]
pub struct QuizClient {
    http: reqwest::Client,
    base_url: String,
}

impl QuizClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    pub async fn start(&self, player_id: Option<&str>) -> Result<StartReply, ClientError> {
        let request = StartRequest {
            player_id: player_id.map(str::to_string),
        };
        self.post("start", &request).await
    }

    pub async fn answer(&self, player_id: &str, answer: bool) -> Result<AnswerReply, ClientError> {
        let request = AnswerRequest {
            player_id: Some(player_id.to_string()),
            answer: Some(answer),
        };
        self.post("answer", &request).await
    }

    pub async fn status(&self, player_id: &str) -> Result<StatusReply, ClientError> {
        let response = self
            .http
            .get(self.endpoint("status"))
            .query(&[("player_id", player_id)])
            .send()
            .await?;
        debug!("GET status -> {}", response.status());
        Ok(response.json().await?)
    }

    pub async fn leaderboard(&self) -> Result<LeaderboardReply, ClientError> {
        self.get("leaderboard").await
    }

    pub async fn health(&self) -> Result<HealthReply, ClientError> {
        let response = self
            .http
            .get(self.endpoint("health"))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn get<T>(&self, path: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let response = self.http.get(self.endpoint(path)).send().await?;
        debug!("GET {} -> {}", path, response.status());
        Ok(response.json().await?)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let response = self.http.post(self.endpoint(path)).json(body).send().await?;
        debug!("POST {} -> {}", path, response.status());
        Ok(response.json().await?)
    }
}
