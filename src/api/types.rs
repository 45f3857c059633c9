//! Wire types for the Arogya wellness backend.
//!
//! Serde-serializable to JSON for HTTP calls. Field names follow the
//! backend's JSON contract exactly; everything optional on the wire is
//! `#[serde(default)]` so a sparse response never fails to decode.

use serde::{Deserialize, Serialize};

// ── Streaming ──

/// One event on the `/chat_stream` SSE feed.
///
/// The backend emits `{"type": "thought", ...}` and `{"type": "answer", ...}`
/// records. Any other `type` value fails to deserialize and is dropped by
/// the stream consumer — an unknown event must never abort the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// An intermediate agent-to-agent note, shown in the live activity log.
    Thought { content: String },
    /// An incremental fragment of the final guidance markdown.
    /// Fragments are concatenated in arrival order.
    Answer { content: String },
}

/// Body for `POST /chat_stream`.
#[derive(Debug, Clone, Serialize)]
pub struct StreamRequest {
    pub symptoms: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_report: Option<String>,
}

// ── Auth ──

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub status: String,
    pub user_id: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub status: String,
    pub user_id: String,
}

// ── Profile ──

/// The short health profile: two optional metrics plus free-text medications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub medications: String,
}

impl Profile {
    /// Body-mass index, when both height and weight are present.
    pub fn bmi(&self) -> Option<f64> {
        match (self.height_cm, self.weight_kg) {
            (Some(h), Some(w)) if h > 0.0 => {
                let meters = h / 100.0;
                Some(w / (meters * meters))
            }
            _ => None,
        }
    }

    /// Whether the user has filled in anything at all.
    pub fn is_empty(&self) -> bool {
        self.height_cm.is_none() && self.weight_kg.is_none() && self.medications.is_empty()
    }
}

/// Envelope for `GET`/`POST /profile/{user_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub user_id: String,
    #[serde(default)]
    pub profile: Option<Profile>,
}

// ── Guidance (non-streaming) ──

/// Body for `POST /health-assist`.
#[derive(Debug, Clone, Serialize)]
pub struct GuidanceRequest {
    pub symptoms: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// One step of the multi-agent pipeline, for the collaboration log.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentStep {
    pub agent: String,
    #[serde(default)]
    pub output: String,
}

/// Result of `POST /health-assist`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuidanceResponse {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// The wellness plan, as markdown.
    #[serde(default)]
    pub synthesized_guidance: String,
    #[serde(default)]
    pub agent_flow: Vec<AgentStep>,
    #[serde(default)]
    pub table_markdown: String,
}

// ── Follow-up ──

#[derive(Debug, Clone, Serialize)]
pub struct FollowUpRequest {
    pub user_id: String,
    pub question: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowUpResponse {
    #[serde(default)]
    pub answer: String,
}

// ── History ──

/// One stored wellness session. The backend stores the full orchestrator
/// output; the client only renders these three fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub synthesized_guidance: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    pub user_id: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

// ── Video recommendations ──

/// Body for `POST /youtube-recommendations`. The backend enforces a hard
/// cap of 4 videos regardless of `max_videos`.
#[derive(Debug, Clone, Serialize)]
pub struct VideoRequest {
    pub symptom: String,
    pub max_videos: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "channelTitle", default)]
    pub channel: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoResponse {
    #[serde(default)]
    pub queries: Vec<String>,
    #[serde(default)]
    pub videos: Vec<Video>,
}

/// Error envelope the backend uses for every non-2xx response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_event_thought_decodes() {
        let evt: StreamEvent =
            serde_json::from_str(r#"{"type":"thought","content":"checking vitals"}"#).unwrap();
        assert_eq!(
            evt,
            StreamEvent::Thought {
                content: "checking vitals".into()
            }
        );
    }

    #[test]
    fn stream_event_answer_decodes() {
        let evt: StreamEvent =
            serde_json::from_str(r#"{"type":"answer","content":"Rest well."}"#).unwrap();
        assert_eq!(
            evt,
            StreamEvent::Answer {
                content: "Rest well.".into()
            }
        );
    }

    #[test]
    fn stream_event_unknown_type_rejected() {
        let result = serde_json::from_str::<StreamEvent>(r#"{"type":"ping","content":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn bmi_computed() {
        let profile = Profile {
            height_cm: Some(170.0),
            weight_kg: Some(65.0),
            medications: String::new(),
        };
        let bmi = profile.bmi().unwrap();
        assert!((bmi - 22.49).abs() < 0.01);
    }

    #[test]
    fn bmi_none_without_height() {
        let profile = Profile {
            height_cm: None,
            weight_kg: Some(65.0),
            medications: String::new(),
        };
        assert!(profile.bmi().is_none());
    }

    #[test]
    fn guidance_response_tolerates_sparse_body() {
        let resp: GuidanceResponse = serde_json::from_str(r#"{"query":"fever"}"#).unwrap();
        assert_eq!(resp.query, "fever");
        assert!(resp.recommendations.is_empty());
        assert!(resp.synthesized_guidance.is_empty());
    }

    #[test]
    fn profile_response_null_profile() {
        let resp: ProfileResponse =
            serde_json::from_str(r#"{"user_id":"alice","profile":null}"#).unwrap();
        assert!(resp.profile.is_none());
    }

    #[test]
    fn video_channel_title_renamed() {
        let video: Video = serde_json::from_str(
            r#"{"title":"Stretching basics","channelTitle":"NHS","url":"https://youtube.com/watch?v=x"}"#,
        )
        .unwrap();
        assert_eq!(video.channel, "NHS");
        assert!(video.thumbnail.is_none());
    }

    #[test]
    fn stream_request_omits_absent_report() {
        let req = StreamRequest {
            symptoms: "sore throat".into(),
            medical_report: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("medical_report").is_none());
    }

    #[test]
    fn history_entry_tolerates_extra_fields() {
        let entry: HistoryEntry = serde_json::from_str(
            r##"{"query":"headache","recommendations":["rest"],"synthesized_guidance":"# Plan","user_id":"bob","agent_flow":[]}"##,
        )
        .unwrap();
        assert_eq!(entry.query, "headache");
        assert_eq!(entry.recommendations, vec!["rest".to_string()]);
    }
}
