//! Screen layouts.
//!
//! ```text
//! ┌─[ Arogya ]──[ Go ]──────────────────────────────┐
//! │                                                 │
//! │  (content for the active screen)                │
//! │                                                 │
//! ├─────────────────────────────────────────────────┤
//! │ [alice] [streaming] ^1/2/3:Screens  ^C:Quit     │
//! └─────────────────────────────────────────────────┘
//! ```

use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
    Wrap,
};
use ratatui::Frame;
use tui_menu::Menu;

use crate::session::SessionPhase;

use super::app::{
    ArogyaApp, AuthMode, LoginFocus, ProfileFocus, Screen, TextField, WellnessFocus,
};
use super::markdown::render_markdown;

/// Draw the full TUI layout.
pub fn draw(f: &mut Frame, app: &mut ArogyaApp) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // menu bar
            Constraint::Min(5),    // content
            Constraint::Length(1), // status bar
        ])
        .split(f.area());

    match app.screen {
        Screen::Home => draw_home(f, outer[1]),
        Screen::Login => draw_login(f, app, outer[1]),
        Screen::Profile => draw_profile(f, app, outer[1]),
        Screen::Wellness => draw_wellness(f, app, outer[1]),
        Screen::History => draw_history(f, app, outer[1]),
    }

    draw_status(f, app, outer[2]);

    // Fill the menu bar row before rendering menu items.
    f.render_widget(
        Paragraph::new("").style(Style::default().bg(Color::White)),
        outer[0],
    );

    // Menu bar rendered last — dropdowns overlay the content below.
    let menu_area = Rect {
        x: outer[0].x,
        y: outer[0].y,
        width: outer[0].width,
        height: outer[0].height + outer[1].height,
    };
    let menu_widget = Menu::new()
        .default_style(Style::default().fg(Color::Black).bg(Color::White))
        .highlight(
            Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .dropdown_width(16)
        .dropdown_style(Style::default().fg(Color::Black).bg(Color::White));
    f.render_stateful_widget(menu_widget, menu_area, &mut app.menu_state);
}

/// Render a single-line input field; returns the cursor position when
/// the field has focus.
fn draw_field(
    f: &mut Frame,
    title: &str,
    field: &TextField,
    focused: bool,
    mask: bool,
    area: Rect,
) -> Option<Position> {
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);

    let shown: String = if mask {
        "*".repeat(field.value().chars().count())
    } else {
        field.value().to_string()
    };
    // Keep the cursor visible when the text outgrows the field.
    let width = inner.width as usize;
    let visible: String = if shown.chars().count() > width.saturating_sub(1) {
        shown
            .chars()
            .skip(shown.chars().count() - width.saturating_sub(1))
            .collect()
    } else {
        shown
    };
    let cursor_x = inner.x + visible.chars().count() as u16;

    f.render_widget(Paragraph::new(visible).block(block), area);

    if focused && inner.width > 0 {
        Some(Position::new(cursor_x.min(inner.right() - 1), inner.y))
    } else {
        None
    }
}

fn draw_home(f: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Arogya Wellness Assistant ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Personalized wellness guidance from a team of AI agents.",
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::raw(
            "  Describe your symptoms and get a synthesized wellness plan,",
        )),
        Line::from(Span::raw(
            "  curated video recommendations, and a searchable session history.",
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  Press Enter to log in or register. F10 opens the menu.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  Not a substitute for professional medical advice.",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_login(f: &mut Frame, app: &ArogyaApp, area: Rect) {
    let (title, button_hint) = match app.auth_mode {
        AuthMode::Login => (" Login ", "Enter:Log in  ^R:Switch to register"),
        AuthMode::Register => (" Register ", "Enter:Create account  ^R:Switch to login"),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let field_count = if app.auth_mode == AuthMode::Register { 3 } else { 2 };
    let mut constraints = vec![Constraint::Length(3); field_count];
    constraints.push(Constraint::Length(1)); // message row
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let mut cursor = draw_field(
        f,
        "Username",
        &app.username,
        app.login_focus == LoginFocus::Username,
        false,
        rows[0],
    );
    cursor = draw_field(
        f,
        "Password",
        &app.password,
        app.login_focus == LoginFocus::Password,
        true,
        rows[1],
    )
    .or(cursor);
    if app.auth_mode == AuthMode::Register {
        cursor = draw_field(
            f,
            "Full name",
            &app.full_name,
            app.login_focus == LoginFocus::FullName,
            false,
            rows[2],
        )
        .or(cursor);
    }

    let message_row = rows[field_count];
    if let Some(error) = &app.auth_error {
        f.render_widget(
            Paragraph::new(Span::styled(
                error.as_str(),
                Style::default().fg(Color::Red),
            )),
            message_row,
        );
    } else if let Some(info) = &app.auth_info {
        f.render_widget(
            Paragraph::new(Span::styled(
                info.as_str(),
                Style::default().fg(Color::Yellow),
            )),
            message_row,
        );
    } else if app.auth_busy {
        f.render_widget(
            Paragraph::new(Span::styled(
                "Contacting server...",
                Style::default().fg(Color::Yellow),
            )),
            message_row,
        );
    } else {
        f.render_widget(
            Paragraph::new(Span::styled(
                button_hint,
                Style::default().fg(Color::DarkGray),
            )),
            message_row,
        );
    }

    if let Some(position) = cursor {
        f.set_cursor_position(position);
    }
}

fn draw_profile(f: &mut Frame, app: &ArogyaApp, area: Rect) {
    let block = Block::default()
        .title(" Health Profile ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // height
            Constraint::Length(3), // weight
            Constraint::Length(3), // medications
            Constraint::Length(1), // BMI
            Constraint::Length(1), // status
            Constraint::Min(0),
        ])
        .split(inner);

    let mut cursor = draw_field(
        f,
        "Height (cm)",
        &app.height,
        app.profile_focus == ProfileFocus::Height,
        false,
        rows[0],
    );
    cursor = draw_field(
        f,
        "Weight (kg)",
        &app.weight,
        app.profile_focus == ProfileFocus::Weight,
        false,
        rows[1],
    )
    .or(cursor);
    cursor = draw_field(
        f,
        "Current medications",
        &app.medications,
        app.profile_focus == ProfileFocus::Medications,
        false,
        rows[2],
    )
    .or(cursor);

    // BMI preview when both metrics parse.
    let bmi = match (
        app.height.value().trim().parse::<f64>(),
        app.weight.value().trim().parse::<f64>(),
    ) {
        (Ok(h), Ok(w)) if h > 0.0 => {
            let meters = h / 100.0;
            Some(w / (meters * meters))
        }
        _ => None,
    };
    if let Some(bmi) = bmi {
        f.render_widget(
            Paragraph::new(Span::styled(
                format!("BMI: {bmi:.1}"),
                Style::default().fg(Color::Green),
            )),
            rows[3],
        );
    }

    let status_line = if let Some(status) = &app.profile_status {
        Span::styled(status.as_str(), Style::default().fg(Color::Yellow))
    } else if app.profile_busy {
        Span::styled("Saving...", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            "Enter:Save  Tab:Next field",
            Style::default().fg(Color::DarkGray),
        )
    };
    f.render_widget(Paragraph::new(status_line), rows[4]);

    if let Some(position) = cursor {
        f.set_cursor_position(position);
    }
}

fn draw_wellness(f: &mut Frame, app: &mut ArogyaApp, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(42), Constraint::Min(30)])
        .split(area);

    draw_wellness_form(f, app, columns[0]);
    draw_wellness_output(f, app, columns[1]);
}

fn draw_wellness_form(f: &mut Frame, app: &ArogyaApp, area: Rect) {
    let block = Block::default()
        .title(" Symptoms ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // symptoms
            Constraint::Length(3), // report
            Constraint::Length(3), // follow-up
            Constraint::Length(2), // status
            Constraint::Min(0),    // thought log
        ])
        .split(inner);

    let mut cursor = draw_field(
        f,
        "What are you feeling?",
        &app.symptoms,
        app.wellness_focus == WellnessFocus::Symptoms,
        false,
        rows[0],
    );
    cursor = draw_field(
        f,
        "Medical report (optional)",
        &app.report,
        app.wellness_focus == WellnessFocus::Report,
        false,
        rows[1],
    )
    .or(cursor);

    if app.has_guidance() {
        cursor = draw_field(
            f,
            "Follow-up question",
            &app.follow_up,
            app.wellness_focus == WellnessFocus::FollowUp,
            false,
            rows[2],
        )
        .or(cursor);
    }

    let status = if let Some(status) = &app.wellness_status {
        Span::styled(status.as_str(), Style::default().fg(Color::Yellow))
    } else if app.guidance_busy {
        Span::styled("Consulting...", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            "Enter:Stream  ^G:One-shot",
            Style::default().fg(Color::DarkGray),
        )
    };
    f.render_widget(Paragraph::new(status).wrap(Wrap { trim: true }), rows[3]);

    // Live agent thought log under the form.
    let thoughts = app.session.thoughts();
    if !thoughts.is_empty() || app.session.is_streaming() {
        let mut lines: Vec<Line> = vec![Line::from(Span::styled(
            "Agent activity",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))];
        // Most recent thoughts fit the pane; older ones scroll away.
        let capacity = rows[4].height.saturating_sub(1) as usize;
        let skip = thoughts.len().saturating_sub(capacity.max(1));
        for thought in &thoughts[skip..] {
            lines.push(Line::from(vec![
                Span::styled("• ", Style::default().fg(Color::Yellow)),
                Span::styled(thought.as_str(), Style::default().fg(Color::DarkGray)),
            ]));
        }
        if app.session.is_streaming() {
            lines.push(Line::from(Span::styled(
                "streaming...",
                Style::default().fg(Color::Yellow),
            )));
        }
        f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), rows[4]);
    }

    if let Some(position) = cursor {
        f.set_cursor_position(position);
    }
}

fn draw_wellness_output(f: &mut Frame, app: &mut ArogyaApp, area: Rect) {
    let title = match app.session.phase() {
        SessionPhase::Streaming => " Guidance (streaming) ",
        SessionPhase::Failed => " Guidance (interrupted) ",
        _ => " Guidance ",
    };
    let border_color = match app.session.phase() {
        SessionPhase::Failed => Color::Red,
        SessionPhase::Streaming => Color::Yellow,
        _ => Color::Cyan,
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let mut lines: Vec<Line> = Vec::new();

    if !app.recommendations.is_empty() {
        lines.push(Line::from(Span::styled(
            "Recommendations",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
        for rec in &app.recommendations {
            lines.push(Line::from(vec![
                Span::styled("• ", Style::default().fg(Color::Green)),
                Span::raw(rec.as_str()),
            ]));
        }
        lines.push(Line::from(""));
    }

    let guidance = app.guidance_text();
    if !guidance.is_empty() {
        lines.extend(render_markdown(guidance));
    }

    if !app.table_markdown.is_empty() {
        lines.push(Line::from(""));
        lines.extend(render_markdown(&app.table_markdown));
    }

    if !app.agent_flow.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Agent collaboration",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
        for step in &app.agent_flow {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("[{}] ", step.agent),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(step.output.as_str(), Style::default().fg(Color::DarkGray)),
            ]));
        }
    }

    if !app.follow_up_answer.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Follow-up",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
        lines.extend(render_markdown(&app.follow_up_answer));
    }

    if !app.videos.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Recommended videos",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
        for video in &app.videos {
            lines.push(Line::from(vec![
                Span::styled("▶ ", Style::default().fg(Color::Red)),
                Span::styled(
                    video.title.as_str(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  ({})", video.channel),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
            lines.push(Line::from(Span::styled(
                format!("  {}", video.url),
                Style::default().fg(Color::Blue),
            )));
        }
    }

    if let Some(error) = app.session.error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Stream interrupted: {error}"),
            Style::default().fg(Color::Red),
        )));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "Describe your symptoms and press Enter.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    // Clamp scroll so we never scroll past content. Account for wrapping:
    // each line may occupy multiple visual rows. u32 avoids overflow for
    // very long guidance.
    let inner_height = area.height.saturating_sub(2) as u32;
    let inner_width = area.width.saturating_sub(2).max(1) as usize;
    let total_lines: u32 = lines
        .iter()
        .map(|line| {
            let width: usize = line.spans.iter().map(|s| s.content.len()).sum();
            if width == 0 {
                1u32
            } else {
                width.div_ceil(inner_width) as u32
            }
        })
        .sum();
    let max_scroll = total_lines.saturating_sub(inner_height);
    let max_scroll_u16 = max_scroll.min(u16::MAX as u32) as u16;
    let scroll = if app.output_auto_scroll {
        max_scroll_u16
    } else {
        app.output_scroll.min(max_scroll_u16)
    };
    // Write clamped value back so up/down keys work immediately.
    app.output_scroll = scroll;
    app.viewport_height = inner_height.min(u16::MAX as u32) as u16;

    let para = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(para, area);

    if total_lines > inner_height {
        let mut scrollbar_state =
            ScrollbarState::new(max_scroll_u16 as usize).position(scroll as usize);
        f.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
            area,
            &mut scrollbar_state,
        );
    }
}

fn draw_history(f: &mut Frame, app: &mut ArogyaApp, area: Rect) {
    let list_rows = (app.history.len() as u16 + 2).clamp(3, 9);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(list_rows), Constraint::Min(5)])
        .split(area);

    let list_block = Block::default()
        .title(" Past Sessions ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.history.is_empty() {
        let message = app
            .history_status
            .as_deref()
            .unwrap_or("No previous sessions.");
        f.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(Color::DarkGray)))
                .block(list_block),
            chunks[0],
        );
        return;
    }

    let items: Vec<ListItem> = app
        .history
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let selected = i == app.history_selected;
            let style = if selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let marker = if app.history_expanded == Some(i) {
                "▼ "
            } else if selected {
                "> "
            } else {
                "  "
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, style),
                Span::styled(entry.query.as_str(), style),
            ]))
        })
        .collect();
    f.render_widget(List::new(items).block(list_block), chunks[0]);

    // Detail pane for the expanded entry.
    let detail_block = Block::default()
        .title(" Session Detail ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(expanded) = app.history_expanded.and_then(|i| app.history.get(i)) else {
        f.render_widget(
            Paragraph::new(Span::styled(
                "Enter:Expand selected session",
                Style::default().fg(Color::DarkGray),
            ))
            .block(detail_block),
            chunks[1],
        );
        return;
    };

    let mut lines: Vec<Line> = vec![Line::from(vec![
        Span::styled(
            "Query: ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(expanded.query.as_str()),
    ])];
    if !expanded.recommendations.is_empty() {
        lines.push(Line::from(""));
        for rec in &expanded.recommendations {
            lines.push(Line::from(vec![
                Span::styled("• ", Style::default().fg(Color::Green)),
                Span::raw(rec.as_str()),
            ]));
        }
    }
    if !expanded.synthesized_guidance.is_empty() {
        lines.push(Line::from(""));
        lines.extend(render_markdown(&expanded.synthesized_guidance));
    }

    let para = Paragraph::new(lines)
        .block(detail_block)
        .wrap(Wrap { trim: false })
        .scroll((app.history_scroll, 0));
    f.render_widget(para, chunks[1]);
}

fn draw_status(f: &mut Frame, app: &ArogyaApp, area: Rect) {
    let user_span = match &app.user {
        Some(user) => Span::styled(
            format!(" [{}]", user.full_name),
            Style::default().fg(Color::Green),
        ),
        None => Span::styled(" [guest]", Style::default().fg(Color::DarkGray)),
    };

    let phase_span = match app.session.phase() {
        SessionPhase::Idle => Span::styled("idle", Style::default().fg(Color::Green)),
        SessionPhase::Streaming => {
            Span::styled("streaming...", Style::default().fg(Color::Yellow))
        }
        SessionPhase::Completed => Span::styled("done", Style::default().fg(Color::Green)),
        SessionPhase::Failed => Span::styled("failed", Style::default().fg(Color::Red)),
    };

    let screen_name = match app.screen {
        Screen::Home => "Home",
        Screen::Login => "Login",
        Screen::Profile => "Profile",
        Screen::Wellness => "Wellness",
        Screen::History => "History",
    };

    let spans = vec![
        user_span,
        Span::raw("  "),
        Span::styled("[", Style::default().fg(Color::DarkGray)),
        phase_span,
        Span::styled("]", Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled(format!("[{screen_name}]"), Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(
            "^1/2/3:Screens  Tab:Focus  F10:Menu  ^C:Quit",
            Style::default().fg(Color::DarkGray),
        ),
    ];

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
