//! Application state for the TUI.

use std::cell::Cell;
use std::rc::Rc;

use consentric_core::{ConsentCategory, MemoryService, MetricsFacade, Segments, ToggleControl};
use crossterm::event::{KeyCode, KeyEvent};

/// Current view mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// Session/consent status overview
    #[default]
    Status,
    /// Consent-editing panel opened through the toggle
    ConsentPanel,
}

/// One checkbox row in the consent panel
#[derive(Debug, Clone, Copy)]
pub struct ConsentRow {
    pub category: ConsentCategory,
    pub selected: bool,
}

/// Main application state.
pub struct App {
    /// The metrics facade under demonstration
    pub metrics: MetricsFacade<MemoryService>,
    /// The consent toggle affordance
    toggle: ToggleControl,
    /// Set by the toggle's callback; drained after each key event
    open_requested: Rc<Cell<bool>>,
    /// Current view mode
    pub view_mode: ViewMode,
    /// Panel rows, seeded from the ledger when the panel opens
    pub rows: Vec<ConsentRow>,
    /// Panel cursor position
    pub cursor: usize,
    /// One-line feedback shown in the footer
    pub status_line: String,
    /// Whether the app should exit
    pub should_quit: bool,
}

impl App {
    /// Create a new App around a constructed facade.
    pub fn new(metrics: MetricsFacade<MemoryService>) -> Self {
        let open_requested = Rc::new(Cell::new(false));
        let flag = open_requested.clone();
        let toggle = ToggleControl::new("Manage consent", move || flag.set(true));

        Self {
            metrics,
            toggle,
            open_requested,
            view_mode: ViewMode::default(),
            rows: Vec::new(),
            cursor: 0,
            status_line: String::new(),
            should_quit: false,
        }
    }

    /// Label rendered on the toggle affordance
    pub fn toggle_label(&self) -> &str {
        self.toggle.label()
    }

    /// Handle a key event for the current view.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.view_mode {
            ViewMode::Status => self.handle_status_key(key),
            ViewMode::ConsentPanel => self.handle_panel_key(key),
        }

        // The toggle talks back through its callback, not a return value
        if self.open_requested.take() {
            self.open_panel();
        }
    }

    fn handle_status_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') | KeyCode::Enter => self.toggle.activate(),
            KeyCode::Char('s') => {
                self.metrics.start_session(false, false);
                self.status_line = "session started".to_string();
            }
            KeyCode::Char('e') => {
                self.metrics.end_session(false);
                self.status_line = "session ended".to_string();
            }
            KeyCode::Char('t') => {
                let mut segments = Segments::new();
                segments.insert("source".to_string(), "tui".to_string());
                self.metrics.track_event("demo-tap", Some(segments), None);
                self.status_line = "event tracked".to_string();
            }
            KeyCode::Char('v') => {
                self.metrics.track_view("status", None);
                self.status_line = "view tracked".to_string();
            }
            KeyCode::Char('x') => {
                self.metrics
                    .track_error("demo error: nothing actually broke", None, None, None);
                self.status_line = "error tracked".to_string();
            }
            _ => {}
        }
    }

    fn handle_panel_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.view_mode = ViewMode::Status;
                self.status_line = "consent unchanged".to_string();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.rows.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(row) = self.rows.get_mut(self.cursor) {
                    row.selected = !row.selected;
                }
            }
            KeyCode::Enter => self.apply_selection(),
            _ => {}
        }
    }

    /// Open the consent panel seeded from the current ledger state.
    fn open_panel(&mut self) {
        self.rows = self
            .metrics
            .catalog()
            .concrete_categories()
            .map(|category| ConsentRow {
                category,
                selected: self.metrics.is_granted(category),
            })
            .collect();
        self.cursor = 0;
        self.view_mode = ViewMode::ConsentPanel;
    }

    /// Reconcile the facade against the panel selection.
    fn apply_selection(&mut self) {
        let selected: Vec<ConsentCategory> = self
            .rows
            .iter()
            .filter(|row| row.selected)
            .map(|row| row.category)
            .collect();

        self.metrics.update_consent(&selected);
        self.view_mode = ViewMode::Status;
        self.status_line = format!("consent applied ({} categories)", selected.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consentric_core::Config;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn test_app() -> App {
        let metrics = MetricsFacade::new(
            Config::with_app_key("tui-test"),
            MemoryService::new(),
            None,
        )
        .unwrap();
        App::new(metrics)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_toggle_opens_panel() {
        let mut app = test_app();
        assert_eq!(app.view_mode, ViewMode::Status);

        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.view_mode, ViewMode::ConsentPanel);
        assert_eq!(app.rows.len(), 5);
        assert!(app.rows.iter().all(|row| !row.selected));
    }

    #[test]
    fn test_panel_applies_selection() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('c'));

        // Select the first category and apply
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.view_mode, ViewMode::Status);
        assert_eq!(
            app.metrics.granted_consents(),
            vec![ConsentCategory::Minimal]
        );
    }

    #[test]
    fn test_panel_escape_leaves_consent_untouched() {
        let mut app = test_app();
        app.metrics.add_consent([ConsentCategory::Ux]);

        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.metrics.granted_consents(), vec![ConsentCategory::Ux]);
    }

    #[test]
    fn test_session_keys_are_idempotent() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('e'));

        assert_eq!(app.metrics.service().begin_session_calls(), 1);
        assert_eq!(app.metrics.service().end_session_calls(), 1);
    }
}
