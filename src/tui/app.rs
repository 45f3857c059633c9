//! ArogyaApp — the TEA model.
//!
//! All state lives here. Update receives AppMessages, mutates state.
//! View reads state to produce ratatui widgets. No side effects in update:
//! backend work is queued as ApiRequests and drained by the runner.

use tui_menu::{MenuItem, MenuState};

use crate::api::types::{AgentStep, HistoryEntry, Profile, Video};
use crate::session::{GuidanceSession, SessionPhase};

use super::event::{ApiAction, ApiEvent, AppMessage};

/// Which screen is currently visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Login,    // Ctrl+1 (pre-login)
    Profile,  // Ctrl+1 (logged in)
    Wellness, // Ctrl+2
    History,  // Ctrl+3
}

/// Login screen mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

/// Which field has focus on the login screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Username,
    Password,
    FullName,
}

/// Which field has focus on the profile screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileFocus {
    Height,
    Weight,
    Medications,
}

/// Which field has focus on the wellness screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellnessFocus {
    Symptoms,
    Report,
    FollowUp,
}

/// Actions that can be triggered from the menu bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    Go(Screen),
    Logout,
    Quit,
}

/// The logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: String,
    pub full_name: String,
}

/// A single-line text input.
#[derive(Debug, Clone, Default)]
pub struct TextField {
    value: String,
}

impl TextField {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, text: &str) {
        self.value = text.to_string();
    }

    pub fn push(&mut self, c: char) {
        self.value.push(c);
    }

    pub fn backspace(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

/// Backend work queued by update, consumed by the runner.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    Login {
        username: String,
        password: String,
    },
    Register {
        username: String,
        password: String,
        full_name: String,
    },
    LoadProfile {
        user_id: String,
    },
    SaveProfile {
        user_id: String,
        profile: Profile,
    },
    Guidance {
        symptoms: String,
        medical_report: Option<String>,
        user_id: Option<String>,
    },
    StreamGuidance {
        generation: u64,
        symptoms: String,
        medical_report: Option<String>,
    },
    FollowUp {
        user_id: String,
        question: String,
    },
    LoadHistory {
        user_id: String,
    },
    LoadVideos {
        symptom: String,
    },
}

/// The backend returns at most this many videos; asking for more is moot.
const MAX_VIDEOS: u32 = 4;

/// Build the menu item tree for the menu bar.
pub fn build_menu_items(logged_in: bool) -> Vec<MenuItem<MenuAction>> {
    let mut go_items = Vec::new();
    if logged_in {
        go_items.push(MenuItem::item("Profile   ^1", MenuAction::Go(Screen::Profile)));
        go_items.push(MenuItem::item("Wellness  ^2", MenuAction::Go(Screen::Wellness)));
        go_items.push(MenuItem::item("History   ^3", MenuAction::Go(Screen::History)));
    } else {
        go_items.push(MenuItem::item("Login     ^1", MenuAction::Go(Screen::Login)));
    }

    let mut app_items = vec![MenuItem::item("Home", MenuAction::Go(Screen::Home))];
    if logged_in {
        app_items.push(MenuItem::item("Logout", MenuAction::Logout));
    }
    app_items.push(MenuItem::item("Quit     ^C", MenuAction::Quit));

    vec![
        MenuItem::group("Arogya", app_items),
        MenuItem::group("Go", go_items),
    ]
}

/// The main TUI application state (TEA model).
pub struct ArogyaApp {
    /// Which screen is currently visible.
    pub screen: Screen,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Logged-in user, if any.
    pub user: Option<SessionUser>,
    /// Whether the user has saved a non-empty health profile.
    pub profile_completed: bool,
    /// Backend work queued for the runner.
    pub pending: Vec<ApiRequest>,
    /// Menu bar state (tui-menu).
    pub menu_state: MenuState<MenuAction>,
    /// Whether the menu bar has keyboard focus (dropdowns visible).
    pub menu_active: bool,

    // Login screen
    pub auth_mode: AuthMode,
    pub login_focus: LoginFocus,
    pub username: TextField,
    pub password: TextField,
    pub full_name: TextField,
    pub auth_error: Option<String>,
    pub auth_info: Option<String>,
    pub auth_busy: bool,

    // Profile screen
    pub profile_focus: ProfileFocus,
    pub height: TextField,
    pub weight: TextField,
    pub medications: TextField,
    pub profile_status: Option<String>,
    pub profile_busy: bool,

    // Wellness screen
    pub wellness_focus: WellnessFocus,
    pub symptoms: TextField,
    pub report: TextField,
    pub follow_up: TextField,
    /// The streaming session accumulator (thoughts + answer).
    pub session: GuidanceSession,
    /// Non-streaming guidance output.
    pub recommendations: Vec<String>,
    pub summary: String,
    pub agent_flow: Vec<AgentStep>,
    pub table_markdown: String,
    pub follow_up_answer: String,
    pub videos: Vec<Video>,
    pub wellness_status: Option<String>,
    pub guidance_busy: bool,
    pub follow_up_busy: bool,
    /// Scroll offset for the output pane.
    pub output_scroll: u16,
    /// When true, keep the output pane pinned to the bottom.
    pub output_auto_scroll: bool,
    /// Viewport height of the output pane (set by renderer).
    pub viewport_height: u16,

    // History screen
    pub history: Vec<HistoryEntry>,
    pub history_selected: usize,
    /// Index of the expanded entry, if any.
    pub history_expanded: Option<usize>,
    pub history_status: Option<String>,
    pub history_scroll: u16,
}

impl ArogyaApp {
    /// Create a new ArogyaApp with default state.
    pub fn new() -> Self {
        Self {
            screen: Screen::Home,
            should_quit: false,
            user: None,
            profile_completed: false,
            pending: Vec::new(),
            menu_state: MenuState::new(build_menu_items(false)),
            menu_active: false,

            auth_mode: AuthMode::Login,
            login_focus: LoginFocus::Username,
            username: TextField::default(),
            password: TextField::default(),
            full_name: TextField::default(),
            auth_error: None,
            auth_info: None,
            auth_busy: false,

            profile_focus: ProfileFocus::Height,
            height: TextField::default(),
            weight: TextField::default(),
            medications: TextField::default(),
            profile_status: None,
            profile_busy: false,

            wellness_focus: WellnessFocus::Symptoms,
            symptoms: TextField::default(),
            report: TextField::default(),
            follow_up: TextField::default(),
            session: GuidanceSession::new(),
            recommendations: Vec::new(),
            summary: String::new(),
            agent_flow: Vec::new(),
            table_markdown: String::new(),
            follow_up_answer: String::new(),
            videos: Vec::new(),
            wellness_status: None,
            guidance_busy: false,
            follow_up_busy: false,
            output_scroll: 0,
            output_auto_scroll: true,
            viewport_height: 20,

            history: Vec::new(),
            history_selected: 0,
            history_expanded: None,
            history_status: None,
            history_scroll: 0,
        }
    }

    /// Rebuild the menu item tree (after login/logout).
    pub fn rebuild_menu(&mut self) {
        self.menu_state = MenuState::new(build_menu_items(self.user.is_some()));
    }

    /// Handle an app message (TEA update).
    pub fn update(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Input(key) => {
                super::input::handle_key(self, key);
            }
            AppMessage::Api(event) => {
                self.handle_api(event);
            }
            AppMessage::Quit => {
                self.should_quit = true;
            }
        }
    }

    /// Take all queued backend requests (runner drains this every loop).
    pub fn take_pending(&mut self) -> Vec<ApiRequest> {
        std::mem::take(&mut self.pending)
    }

    /// The guidance markdown to render: streamed answer when a streaming
    /// session has output, one-shot summary otherwise.
    pub fn guidance_text(&self) -> &str {
        if !self.session.answer().is_empty() || self.session.is_streaming() {
            self.session.answer()
        } else {
            &self.summary
        }
    }

    /// Whether guidance output exists (gates follow-up and videos).
    pub fn has_guidance(&self) -> bool {
        !self.summary.is_empty()
            || (self.session.phase() == SessionPhase::Completed && !self.session.answer().is_empty())
    }

    /// Navigate to a screen, enforcing the route guards: Profile, Wellness,
    /// and History need a logged-in user; Wellness also needs a completed
    /// profile. A blocked navigation leaves a status message instead.
    pub fn navigate(&mut self, screen: Screen) {
        match screen {
            Screen::Home => self.screen = Screen::Home,
            Screen::Login => {
                // Already logged in → Login slot means Profile.
                if self.user.is_some() {
                    self.navigate(Screen::Profile);
                } else {
                    self.screen = Screen::Login;
                }
            }
            Screen::Profile => {
                let Some(user) = &self.user else {
                    self.screen = Screen::Login;
                    self.auth_info = Some("Log in to continue.".into());
                    return;
                };
                self.pending.push(ApiRequest::LoadProfile {
                    user_id: user.user_id.clone(),
                });
                self.screen = Screen::Profile;
            }
            Screen::Wellness => {
                if self.user.is_none() {
                    self.screen = Screen::Login;
                    self.auth_info = Some("Log in to continue.".into());
                    return;
                }
                if !self.profile_completed {
                    self.screen = Screen::Profile;
                    self.profile_status = Some("Complete your profile first.".into());
                    return;
                }
                self.screen = Screen::Wellness;
            }
            Screen::History => {
                let Some(user) = &self.user else {
                    self.screen = Screen::Login;
                    self.auth_info = Some("Log in to continue.".into());
                    return;
                };
                self.pending.push(ApiRequest::LoadHistory {
                    user_id: user.user_id.clone(),
                });
                self.history_status = Some("Loading history...".into());
                self.screen = Screen::History;
            }
        }
    }

    /// Clear all session state and return Home.
    pub fn logout(&mut self) {
        self.user = None;
        self.profile_completed = false;
        self.username.clear();
        self.password.clear();
        self.full_name.clear();
        self.auth_error = None;
        self.auth_info = None;
        self.height.clear();
        self.weight.clear();
        self.medications.clear();
        self.profile_status = None;
        self.symptoms.clear();
        self.report.clear();
        self.follow_up.clear();
        self.session.reset();
        self.recommendations.clear();
        self.summary.clear();
        self.agent_flow.clear();
        self.table_markdown.clear();
        self.follow_up_answer.clear();
        self.videos.clear();
        self.wellness_status = None;
        self.guidance_busy = false;
        self.follow_up_busy = false;
        self.history.clear();
        self.history_selected = 0;
        self.history_expanded = None;
        self.history_status = None;
        self.screen = Screen::Home;
        self.rebuild_menu();
    }

    /// Submit the login or registration form.
    pub fn submit_auth(&mut self) {
        if self.auth_busy {
            return;
        }
        self.auth_error = None;
        self.auth_info = None;

        if self.username.is_empty() || self.password.is_empty() {
            self.auth_error = Some("Username and password are required.".into());
            return;
        }
        match self.auth_mode {
            AuthMode::Login => {
                self.auth_busy = true;
                self.pending.push(ApiRequest::Login {
                    username: self.username.value().trim().to_string(),
                    password: self.password.value().to_string(),
                });
            }
            AuthMode::Register => {
                if self.full_name.is_empty() {
                    self.auth_error = Some("Full name is required.".into());
                    return;
                }
                self.auth_busy = true;
                self.pending.push(ApiRequest::Register {
                    username: self.username.value().trim().to_string(),
                    password: self.password.value().to_string(),
                    full_name: self.full_name.value().trim().to_string(),
                });
            }
        }
    }

    /// Toggle between login and registration.
    pub fn toggle_auth_mode(&mut self) {
        self.auth_mode = match self.auth_mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.login_focus = LoginFocus::Username;
        self.auth_error = None;
    }

    /// Validate and submit the profile form.
    pub fn submit_profile(&mut self) {
        if self.profile_busy {
            return;
        }
        let Some(user) = &self.user else { return };
        self.profile_status = None;

        let height_cm = match parse_metric(self.height.value(), 300.0) {
            Ok(v) => v,
            Err(()) => {
                self.profile_status = Some("Height must be a number between 0 and 300 cm.".into());
                return;
            }
        };
        let weight_kg = match parse_metric(self.weight.value(), 500.0) {
            Ok(v) => v,
            Err(()) => {
                self.profile_status = Some("Weight must be a number between 0 and 500 kg.".into());
                return;
            }
        };

        let profile = Profile {
            height_cm,
            weight_kg,
            medications: self.medications.value().trim().to_string(),
        };
        self.profile_busy = true;
        self.pending.push(ApiRequest::SaveProfile {
            user_id: user.user_id.clone(),
            profile,
        });
    }

    /// Submit the symptom form. `stream` picks the SSE path over the
    /// one-shot endpoint. Empty symptom text is rejected before any
    /// request is issued. Submitting while a stream is live abandons it:
    /// the generation bumps and the old stream's output is dropped.
    pub fn submit_guidance(&mut self, stream: bool) {
        if self.guidance_busy {
            return;
        }
        if self.symptoms.is_empty() {
            self.wellness_status = Some("Please enter symptoms to continue.".into());
            return;
        }

        // A new request starts clean: all previous outputs go.
        self.recommendations.clear();
        self.summary.clear();
        self.agent_flow.clear();
        self.table_markdown.clear();
        self.follow_up_answer.clear();
        self.videos.clear();
        self.wellness_status = None;
        self.output_scroll = 0;
        self.output_auto_scroll = true;

        let symptoms = self.symptoms.value().trim().to_string();
        let medical_report = if self.report.is_empty() {
            None
        } else {
            Some(self.report.value().trim().to_string())
        };

        if stream {
            let generation = self.session.start();
            self.wellness_status = Some("Streaming agent collaboration...".into());
            self.pending.push(ApiRequest::StreamGuidance {
                generation,
                symptoms,
                medical_report,
            });
        } else {
            self.session.reset();
            self.guidance_busy = true;
            self.wellness_status = Some("Consulting wellness agents...".into());
            self.pending.push(ApiRequest::Guidance {
                symptoms,
                medical_report,
                user_id: self.user.as_ref().map(|u| u.user_id.clone()),
            });
        }
    }

    /// Submit a follow-up question about the current guidance.
    pub fn submit_follow_up(&mut self) {
        if self.follow_up_busy || !self.has_guidance() {
            return;
        }
        let Some(user) = &self.user else { return };
        if self.follow_up.is_empty() {
            return;
        }
        self.follow_up_busy = true;
        self.follow_up_answer.clear();
        self.pending.push(ApiRequest::FollowUp {
            user_id: user.user_id.clone(),
            question: self.follow_up.value().trim().to_string(),
        });
    }

    /// Queue the curated-video fetch for the current symptom text.
    fn request_videos(&mut self) {
        if self.symptoms.is_empty() {
            return;
        }
        self.pending.push(ApiRequest::LoadVideos {
            symptom: self.symptoms.value().trim().to_string(),
        });
    }

    /// Route a backend result into the model.
    fn handle_api(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::LoginOk { user_id, full_name } => {
                self.auth_busy = false;
                self.password.clear();
                self.user = Some(SessionUser { user_id, full_name });
                self.rebuild_menu();
                self.navigate(Screen::Profile);
            }
            ApiEvent::RegisterOk => {
                self.auth_busy = false;
                self.auth_mode = AuthMode::Login;
                self.auth_info = Some("Account created. Log in now.".into());
                self.password.clear();
                self.full_name.clear();
            }
            ApiEvent::ProfileLoaded(profile) => {
                if let Some(profile) = profile {
                    if let Some(h) = profile.height_cm {
                        self.height.set(&format_metric(h));
                    }
                    if let Some(w) = profile.weight_kg {
                        self.weight.set(&format_metric(w));
                    }
                    self.medications.set(&profile.medications);
                    self.profile_completed = !profile.is_empty();
                }
            }
            ApiEvent::ProfileSaved => {
                self.profile_busy = false;
                self.profile_completed = true;
                self.profile_status = Some("Profile saved.".into());
                self.navigate(Screen::Wellness);
            }
            ApiEvent::GuidanceReady(response) => {
                self.guidance_busy = false;
                self.wellness_status = None;
                self.recommendations = response.recommendations;
                self.summary = response.synthesized_guidance;
                self.agent_flow = response.agent_flow;
                self.table_markdown = response.table_markdown;
                if !self.summary.is_empty() {
                    self.request_videos();
                }
            }
            ApiEvent::FollowUpAnswer(answer) => {
                self.follow_up_busy = false;
                self.follow_up_answer = answer;
                self.follow_up.clear();
            }
            ApiEvent::HistoryLoaded(entries) => {
                self.history_status = if entries.is_empty() {
                    Some("No previous sessions.".into())
                } else {
                    None
                };
                self.history = entries;
                self.history_selected = 0;
                self.history_expanded = None;
            }
            ApiEvent::VideosLoaded(videos) => {
                self.videos = videos;
            }
            ApiEvent::RequestFailed { action, message } => {
                self.handle_failure(action, message);
            }
            ApiEvent::StreamEvent { generation, event } => {
                self.session.apply(generation, event);
            }
            ApiEvent::StreamClosed { generation } => {
                self.session.complete(generation);
                if self.session.is_current(generation) {
                    self.wellness_status = None;
                    if self.has_guidance() {
                        self.request_videos();
                    }
                }
            }
            ApiEvent::StreamFailed {
                generation,
                message,
            } => {
                self.session.fail(generation, message.clone());
                if self.session.is_current(generation) {
                    self.wellness_status = Some(format!("Stream failed: {message}"));
                }
            }
        }
    }

    fn handle_failure(&mut self, action: ApiAction, message: String) {
        match action {
            ApiAction::Login | ApiAction::Register => {
                self.auth_busy = false;
                self.auth_error = Some(message);
            }
            ApiAction::ProfileLoad => {
                // A missing profile is normal for a fresh account.
                tracing::debug!("profile load failed: {message}");
            }
            ApiAction::ProfileSave => {
                self.profile_busy = false;
                self.profile_status = Some(message);
            }
            ApiAction::Guidance => {
                self.guidance_busy = false;
                self.wellness_status = Some(message);
            }
            ApiAction::FollowUp => {
                self.follow_up_busy = false;
                self.wellness_status = Some(message);
            }
            ApiAction::History => {
                self.history_status = Some(message);
            }
            ApiAction::Videos => {
                // Videos are a bonus; failure just leaves the pane empty.
                tracing::debug!("video fetch failed: {message}");
            }
        }
    }

    /// The text field the cursor is in, given screen and focus.
    pub fn focused_field_mut(&mut self) -> Option<&mut TextField> {
        match self.screen {
            Screen::Login => Some(match self.login_focus {
                LoginFocus::Username => &mut self.username,
                LoginFocus::Password => &mut self.password,
                LoginFocus::FullName => &mut self.full_name,
            }),
            Screen::Profile => Some(match self.profile_focus {
                ProfileFocus::Height => &mut self.height,
                ProfileFocus::Weight => &mut self.weight,
                ProfileFocus::Medications => &mut self.medications,
            }),
            Screen::Wellness => Some(match self.wellness_focus {
                WellnessFocus::Symptoms => &mut self.symptoms,
                WellnessFocus::Report => &mut self.report,
                WellnessFocus::FollowUp => &mut self.follow_up,
            }),
            Screen::Home | Screen::History => None,
        }
    }

    /// Scroll the output pane down.
    pub fn scroll_output_down(&mut self) {
        self.output_auto_scroll = false;
        self.output_scroll = self.output_scroll.saturating_add(1);
    }

    /// Scroll the output pane up.
    pub fn scroll_output_up(&mut self) {
        self.output_auto_scroll = false;
        self.output_scroll = self.output_scroll.saturating_sub(1);
    }

    /// Move history selection up.
    pub fn history_up(&mut self) {
        if self.history_selected > 0 {
            self.history_selected -= 1;
        }
    }

    /// Move history selection down.
    pub fn history_down(&mut self) {
        let max = self.history.len().saturating_sub(1);
        if self.history_selected < max {
            self.history_selected += 1;
        }
    }

    /// Expand or collapse the selected history entry.
    pub fn history_toggle(&mut self) {
        if self.history.is_empty() {
            return;
        }
        self.history_expanded = if self.history_expanded == Some(self.history_selected) {
            None
        } else {
            Some(self.history_selected)
        };
        self.history_scroll = 0;
    }

    /// The video cap requested from the backend.
    pub fn max_videos() -> u32 {
        MAX_VIDEOS
    }
}

impl Default for ArogyaApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an optional metric field: empty → None, otherwise a number in
/// (0, max].
fn parse_metric(text: &str, max: f64) -> Result<Option<f64>, ()> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    match text.parse::<f64>() {
        Ok(v) if v > 0.0 && v <= max => Ok(Some(v)),
        _ => Err(()),
    }
}

/// Render a metric without a trailing `.0` for whole numbers.
fn format_metric(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}
