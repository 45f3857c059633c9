//! TUI runner — main loop that wires everything together.
//!
//! Creates terminal, runs the TEA loop, and dispatches queued backend
//! requests onto tokio tasks. Task results come back through one mpsc
//! channel; stream tasks tag every message with their generation so the
//! model can ignore output from sessions the user has abandoned.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::api::types::{GuidanceRequest, StreamRequest};
use crate::api::ArogyaClient;

use super::app::{ApiRequest, ArogyaApp};
use super::event::{ApiAction, ApiEvent, AppMessage};
use super::layout;

/// Run the TUI main loop. Blocks until quit.
pub async fn run_tui(client: ArogyaClient) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut app = ArogyaApp::new();
    let client = Arc::new(client);
    let (tx, mut rx) = mpsc::unbounded_channel::<AppMessage>();

    let mut render_interval = interval(Duration::from_millis(33)); // ~30fps

    loop {
        tokio::select! {
            _ = render_interval.tick() => {
                terminal.draw(|f| layout::draw(f, &mut app))?;
            }
            Some(msg) = rx.recv() => {
                app.update(msg);
            }
            // Poll crossterm events (non-blocking via tokio::task::spawn_blocking)
            result = tokio::task::spawn_blocking(|| {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    event::read().ok()
                } else {
                    None
                }
            }) => {
                if let Ok(Some(Event::Key(key))) = result {
                    app.update(AppMessage::Input(key));
                }
            }
        }

        for request in app.take_pending() {
            dispatch(Arc::clone(&client), request, tx.clone());
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Spawn a task for one backend request; results come back on `tx`.
/// Stream requests send many messages (one per event, then a terminal
/// close/fail); everything else sends exactly one.
fn dispatch(
    client: Arc<ArogyaClient>,
    request: ApiRequest,
    tx: mpsc::UnboundedSender<AppMessage>,
) {
    tokio::spawn(async move {
        if let ApiRequest::StreamGuidance {
            generation,
            symptoms,
            medical_report,
        } = request
        {
            run_stream(&client, generation, symptoms, medical_report, &tx).await;
        } else {
            let event = run_request(&client, request).await;
            // Send failure means the TUI is shutting down; nothing to do.
            let _ = tx.send(AppMessage::Api(event));
        }
    });
}

fn failed(action: ApiAction, error: crate::api::ApiError) -> ApiEvent {
    tracing::warn!("backend request failed: {error}");
    ApiEvent::RequestFailed {
        action,
        message: error.to_string(),
    }
}

async fn run_request(client: &ArogyaClient, request: ApiRequest) -> ApiEvent {
    match request {
        ApiRequest::Login { username, password } => {
            match client.login(&username, &password).await {
                Ok(resp) => ApiEvent::LoginOk {
                    user_id: resp.user_id,
                    full_name: resp.full_name,
                },
                Err(e) => failed(ApiAction::Login, e),
            }
        }
        ApiRequest::Register {
            username,
            password,
            full_name,
        } => match client.register(&username, &password, &full_name).await {
            Ok(_) => ApiEvent::RegisterOk,
            Err(e) => failed(ApiAction::Register, e),
        },
        ApiRequest::LoadProfile { user_id } => match client.profile(&user_id).await {
            Ok(profile) => ApiEvent::ProfileLoaded(profile),
            Err(e) => failed(ApiAction::ProfileLoad, e),
        },
        ApiRequest::SaveProfile { user_id, profile } => {
            match client.save_profile(&user_id, &profile).await {
                Ok(()) => ApiEvent::ProfileSaved,
                Err(e) => failed(ApiAction::ProfileSave, e),
            }
        }
        ApiRequest::Guidance {
            symptoms,
            medical_report,
            user_id,
        } => {
            let request = GuidanceRequest {
                symptoms,
                medical_report,
                user_id,
            };
            match client.health_assist(&request).await {
                Ok(resp) => ApiEvent::GuidanceReady(Box::new(resp)),
                Err(e) => failed(ApiAction::Guidance, e),
            }
        }
        ApiRequest::FollowUp { user_id, question } => {
            match client.follow_up(&user_id, &question).await {
                Ok(answer) => ApiEvent::FollowUpAnswer(answer),
                Err(e) => failed(ApiAction::FollowUp, e),
            }
        }
        ApiRequest::LoadHistory { user_id } => match client.history(&user_id).await {
            Ok(entries) => ApiEvent::HistoryLoaded(entries),
            Err(e) => failed(ApiAction::History, e),
        },
        ApiRequest::LoadVideos { symptom } => {
            match client
                .video_recommendations(&symptom, ArogyaApp::max_videos())
                .await
            {
                Ok(videos) => ApiEvent::VideosLoaded(videos),
                Err(e) => failed(ApiAction::Videos, e),
            }
        }
        ApiRequest::StreamGuidance { .. } => {
            unreachable!("streams are handled by run_stream")
        }
    }
}

/// Consume the guidance stream, forwarding each event tagged with the
/// session generation, then a terminal close or failure. The model drops
/// anything whose generation is no longer current, so a task draining an
/// abandoned stream is harmless.
async fn run_stream(
    client: &ArogyaClient,
    generation: u64,
    symptoms: String,
    medical_report: Option<String>,
    tx: &mpsc::UnboundedSender<AppMessage>,
) {
    let request = StreamRequest {
        symptoms,
        medical_report,
    };
    let stream = match client.guidance_stream(&request).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!("failed to open guidance stream: {e}");
            let _ = tx.send(AppMessage::Api(ApiEvent::StreamFailed {
                generation,
                message: e.to_string(),
            }));
            return;
        }
    };
    futures::pin_mut!(stream);

    while let Some(item) = stream.next().await {
        match item {
            Ok(event) => {
                if tx
                    .send(AppMessage::Api(ApiEvent::StreamEvent { generation, event }))
                    .is_err()
                {
                    return; // TUI gone
                }
            }
            Err(e) => {
                tracing::warn!("guidance stream interrupted: {e}");
                let _ = tx.send(AppMessage::Api(ApiEvent::StreamFailed {
                    generation,
                    message: e.to_string(),
                }));
                return;
            }
        }
    }

    let _ = tx.send(AppMessage::Api(ApiEvent::StreamClosed { generation }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dispatch_reports_transport_failure() {
        // Nothing listens on this port; the login task must come back as
        // a RequestFailed rather than hanging or panicking.
        let client = Arc::new(ArogyaClient::new("http://127.0.0.1:1".into()));
        let (tx, mut rx) = mpsc::unbounded_channel::<AppMessage>();

        dispatch(
            client,
            ApiRequest::Login {
                username: "alice".into(),
                password: "pw".into(),
            },
            tx,
        );

        let msg = rx.recv().await.expect("task should report back");
        match msg {
            AppMessage::Api(ApiEvent::RequestFailed { action, .. }) => {
                assert_eq!(action, ApiAction::Login);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn stream_dispatch_reports_failure_with_generation() {
        let client = Arc::new(ArogyaClient::new("http://127.0.0.1:1".into()));
        let (tx, mut rx) = mpsc::unbounded_channel::<AppMessage>();

        dispatch(
            client,
            ApiRequest::StreamGuidance {
                generation: 7,
                symptoms: "sore throat".into(),
                medical_report: None,
            },
            tx,
        );

        let msg = rx.recv().await.expect("task should report back");
        match msg {
            AppMessage::Api(ApiEvent::StreamFailed { generation, .. }) => {
                assert_eq!(generation, 7);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn runner_quit_on_message() {
        let mut app = ArogyaApp::new();
        app.update(AppMessage::Quit);
        assert!(app.should_quit);
    }
}
