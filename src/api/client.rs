//! HTTP client for the Arogya wellness backend.
//!
//! No UI awareness — just makes API calls via reqwest and hands back
//! decoded wire types. The streaming endpoint returns an event stream;
//! everything else is plain request/response JSON.

use futures::Stream;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::stream::event_stream;
use super::types::{
    ErrorBody, FollowUpRequest, FollowUpResponse, GuidanceRequest, GuidanceResponse,
    HistoryEntry, HistoryResponse, LoginRequest, LoginResponse, Profile, ProfileResponse,
    RegisterRequest, RegisterResponse, StreamEvent, StreamRequest, Video, VideoRequest,
    VideoResponse,
};

/// Errors from backend operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend error (status {status}): {message}")]
    Backend { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("stream interrupted: {0}")]
    Stream(String),
}

/// HTTP client for the Arogya wellness backend.
#[derive(Debug)]
pub struct ArogyaClient {
    http: Client,
    base_url: String,
}

impl ArogyaClient {
    /// Create a client against the given base URL (no trailing slash needed).
    pub fn new(base_url: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body and decode a JSON response, mapping non-2xx
    /// statuses to [`ApiError::Backend`] with the backend's `error` text.
    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.http.post(&url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.http.get(&url).send().await?;
        Self::decode(response).await
    }

    async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, ApiError> {
        let status = response.status().as_u16();

        if status >= 400 {
            let body = response.text().await.unwrap_or_else(|_| "(no body)".into());
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(ApiError::Backend { status, message });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("failed to parse response: {e}")))
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.post_json(
            "/login",
            &LoginRequest {
                username: username.into(),
                password: password.into(),
            },
        )
        .await
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        full_name: &str,
    ) -> Result<RegisterResponse, ApiError> {
        self.post_json(
            "/register",
            &RegisterRequest {
                username: username.into(),
                password: password.into(),
                full_name: full_name.into(),
            },
        )
        .await
    }

    /// Fetch the stored health profile; `None` when the user has never
    /// saved one.
    pub async fn profile(&self, user_id: &str) -> Result<Option<Profile>, ApiError> {
        let resp: ProfileResponse = self.get_json(&format!("/profile/{user_id}")).await?;
        Ok(resp.profile)
    }

    pub async fn save_profile(&self, user_id: &str, profile: &Profile) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .post_json(&format!("/profile/{user_id}"), profile)
            .await?;
        Ok(())
    }

    /// One-shot guidance: the full orchestrator output in a single response.
    pub async fn health_assist(
        &self,
        request: &GuidanceRequest,
    ) -> Result<GuidanceResponse, ApiError> {
        self.post_json("/health-assist", request).await
    }

    pub async fn follow_up(&self, user_id: &str, question: &str) -> Result<String, ApiError> {
        let resp: FollowUpResponse = self
            .post_json(
                "/follow-up",
                &FollowUpRequest {
                    user_id: user_id.into(),
                    question: question.into(),
                },
            )
            .await?;
        Ok(resp.answer)
    }

    pub async fn history(&self, user_id: &str) -> Result<Vec<HistoryEntry>, ApiError> {
        let resp: HistoryResponse = self.get_json(&format!("/history/{user_id}")).await?;
        Ok(resp.history)
    }

    /// Curated videos for a symptom. The backend caps the count at 4
    /// regardless of `max_videos`.
    pub async fn video_recommendations(
        &self,
        symptom: &str,
        max_videos: u32,
    ) -> Result<Vec<Video>, ApiError> {
        let resp: VideoResponse = self
            .post_json(
                "/youtube-recommendations",
                &VideoRequest {
                    symptom: symptom.into(),
                    max_videos,
                },
            )
            .await?;
        Ok(resp.videos)
    }

    /// Open the streaming guidance session. The returned stream yields
    /// parsed events as chunks arrive; see [`super::stream::SseParser`]
    /// for the framing rules. A non-2xx status is reported before any
    /// event is yielded.
    pub async fn guidance_stream(
        &self,
        request: &StreamRequest,
    ) -> Result<impl Stream<Item = Result<StreamEvent, ApiError>> + Send, ApiError> {
        let url = format!("{}/chat_stream", self.base_url);
        let response = self.http.post(&url).json(request).send().await?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_else(|_| "(no body)".into());
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(ApiError::Backend { status, message });
        }

        Ok(event_stream(response.bytes_stream()))
    }
}
