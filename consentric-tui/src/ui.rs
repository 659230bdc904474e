//! UI rendering for the TUI.

use consentric_core::ConsentCategory;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, ViewMode};

// ========== View Colors ==========

/// Border color for the session block
const BORDER_SESSION: Color = Color::Rgb(0, 150, 150);
/// Border color for the consent block
const BORDER_CONSENT: Color = Color::Rgb(80, 160, 80);
/// Border color for the activity block
const BORDER_ACTIVITY: Color = Color::Rgb(180, 100, 180);
/// Label color for metadata attributes
const LABEL_COLOR: Color = Color::Rgb(100, 180, 180);
/// Granted-category marker color
const GRANTED_COLOR: Color = Color::Rgb(50, 205, 50);
/// Revoked-category marker color
const REVOKED_COLOR: Color = Color::Rgb(128, 128, 128);
/// Panel cursor highlight
const CURSOR_COLOR: Color = Color::Rgb(255, 215, 0);

/// Render the application UI.
pub fn render(frame: &mut Frame, app: &mut App) {
    match app.view_mode {
        ViewMode::Status => render_status_view(frame, app),
        ViewMode::ConsentPanel => render_consent_panel(frame, app),
    }
}

// ============================================
// Status view
// ============================================

fn render_status_view(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::vertical([
        Constraint::Length(4), // Session block
        Constraint::Min(7),    // Consent block
        Constraint::Length(6), // Activity block
        Constraint::Length(1), // Footer
    ])
    .split(area);

    render_session_block(frame, app, chunks[0]);
    render_consent_block(frame, app, chunks[1]);
    render_activity_block(frame, app, chunks[2]);
    render_footer(frame, app, chunks[3]);
}

fn label(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().fg(LABEL_COLOR))
}

fn render_session_block(frame: &mut Frame, app: &App, area: Rect) {
    let session = if app.metrics.session_active() {
        Span::styled("active", Style::default().fg(GRANTED_COLOR))
    } else {
        Span::styled("inactive", Style::default().fg(REVOKED_COLOR))
    };

    let lines = vec![
        Line::from(vec![
            label("app "),
            Span::raw(app.metrics.config().app_key.clone()),
            Span::raw("   "),
            label("device "),
            Span::raw(app.metrics.device_id().to_string()),
        ]),
        Line::from(vec![label("session "), session]),
    ];

    let block = Block::default()
        .title(" consentric ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_SESSION));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_consent_block(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .metrics
        .catalog()
        .concrete_categories()
        .map(|category| consent_line(app, category))
        .map(ListItem::new)
        .collect();

    let block = Block::default()
        .title(" Consent ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_CONSENT));

    frame.render_widget(List::new(items).block(block), area);
}

fn consent_line(app: &App, category: ConsentCategory) -> Line<'static> {
    let granted = app.metrics.is_granted(category);
    let marker = if granted {
        Span::styled(" on ", Style::default().fg(GRANTED_COLOR))
    } else {
        Span::styled(" off", Style::default().fg(REVOKED_COLOR))
    };

    let flags = app
        .metrics
        .catalog()
        .flags(category)
        .map(|flags| flags.join(", "))
        .unwrap_or_default();

    Line::from(vec![
        marker,
        Span::raw("  "),
        Span::styled(
            format!("{:<16}", category.display_name()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(flags, Style::default().fg(REVOKED_COLOR)),
    ])
}

fn render_activity_block(frame: &mut Frame, app: &App, area: Rect) {
    let service = app.metrics.service();

    let lines = vec![
        Line::from(vec![
            label("events "),
            Span::raw(service.events().len().to_string()),
            Span::raw("   "),
            label("views "),
            Span::raw(service.views().len().to_string()),
            Span::raw("   "),
            label("errors "),
            Span::raw(service.errors().len().to_string()),
        ]),
        Line::from(vec![
            label("sessions completed "),
            Span::raw(service.completed_sessions().len().to_string()),
        ]),
        Line::from(vec![
            label("service consents "),
            Span::raw(service.granted().join(", ")),
        ]),
    ];

    let block = Block::default()
        .title(" Delivered to service ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_ACTIVITY));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let hints = format!(
        " [c] {}  [s] start session  [e] end session  [t] event  [v] view  [x] error  [q] quit   {}",
        app.toggle_label(),
        app.status_line
    );

    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(REVOKED_COLOR)),
        area,
    );
}

// ============================================
// Consent panel
// ============================================

fn render_consent_panel(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::vertical([
        Constraint::Min(7),    // Checkbox list
        Constraint::Length(1), // Footer
    ])
    .split(area);

    let items: Vec<ListItem> = app
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let checkbox = if row.selected { "[x]" } else { "[ ]" };
            let style = if index == app.cursor {
                Style::default()
                    .fg(CURSOR_COLOR)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(
                format!(" {} {}", checkbox, row.category.display_name()),
                style,
            )))
        })
        .collect();

    let block = Block::default()
        .title(" Edit consent ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_CONSENT));

    frame.render_widget(List::new(items).block(block), chunks[0]);

    frame.render_widget(
        Paragraph::new(" [space] toggle  [enter] apply  [esc] cancel")
            .style(Style::default().fg(REVOKED_COLOR))
            .alignment(Alignment::Left),
        chunks[1],
    );
}
