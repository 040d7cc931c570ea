//! Application state and logic.

use crate::action::{Action, FormField};
use crate::log_buffer::LogBuffer;
use crate::theme::{Palette, Theme};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use walletlink_core::{
    ConnectionState, FeeEstimate, TransferFormState, compute_fee, validate_address,
    validate_amount,
};

/// Input mode for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Editing the focused form field.
    Editing,
}

/// Application state.
pub struct App {
    /// Color palette for rendering.
    pub palette: Palette,
    /// Provider description for the header.
    pub provider_label: String,
    /// Whether a wallet provider is available at all.
    pub provider_present: bool,
    /// Latest connection state.
    pub connection: ConnectionState,
    /// Latest transfer form state.
    pub form: TransferFormState,
    /// Fee for the current gas inputs.
    pub fee: Option<FeeEstimate>,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Focused form field.
    pub focused_field: FormField,
    /// Text being edited for the focused field.
    pub edit_buffer: String,
    /// Whether showing help overlay.
    pub showing_help: bool,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Tick counter for animations.
    tick_count: u64,
    /// Log buffer for displaying logs.
    pub log_buffer: LogBuffer,
    /// Log scroll offset (0 = bottom/most recent).
    pub log_scroll: usize,
}

impl App {
    pub fn new(
        provider_label: String,
        provider_present: bool,
        log_buffer: LogBuffer,
        theme: Theme,
    ) -> Self {
        let palette = theme.palette();
        let form = TransferFormState::default();
        let fee = compute_fee(&form.gas_price_gwei, &form.gas_limit).ok();
        Self {
            palette,
            provider_label,
            provider_present,
            connection: ConnectionState::default(),
            form,
            fee,
            input_mode: InputMode::default(),
            focused_field: FormField::default(),
            edit_buffer: String::new(),
            showing_help: false,
            should_quit: false,
            tick_count: 0,
            log_buffer,
            log_scroll: 0,
        }
    }

    /// Scroll logs up (older messages).
    pub fn scroll_logs_up(&mut self) {
        let log_count = self.log_buffer.len();
        if log_count > 3 {
            self.log_scroll = (self.log_scroll + 1).min(log_count.saturating_sub(3));
        }
    }

    /// Scroll logs down (newer messages).
    pub fn scroll_logs_down(&mut self) {
        self.log_scroll = self.log_scroll.saturating_sub(1);
    }

    pub fn scroll_logs_to_bottom(&mut self) {
        self.log_scroll = 0;
    }

    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Spinner frame for in-flight operations.
    pub fn spinner_char(&self) -> char {
        const SPINNER_CHARS: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
        SPINNER_CHARS[(self.tick_count as usize) % SPINNER_CHARS.len()]
    }

    pub fn send_form_open(&self) -> bool {
        self.connection.connected && self.connection.send_form_visible
    }

    /// Whether the recipient field holds a usable address.
    pub fn recipient_valid(&self) -> bool {
        validate_address(&self.form.recipient)
    }

    pub fn amount_valid(&self) -> bool {
        validate_amount(&self.form.amount)
    }

    /// Handle keyboard input.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Editing => self.handle_edit_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<Action> {
        if self.showing_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.showing_help = false;
            }
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('?') => {
                self.showing_help = true;
                None
            }
            KeyCode::Char('c') if !self.connection.connected => Some(Action::Connect),
            KeyCode::Char('d') if self.connection.connected => Some(Action::Disconnect),
            KeyCode::Char('r') if self.connection.connected => Some(Action::RefreshBalance),
            KeyCode::Char('m') if self.connection.connected => Some(Action::SwitchToMainnet),
            KeyCode::Char('s') if self.connection.connected => Some(Action::ToggleSendForm),
            KeyCode::PageUp => {
                self.scroll_logs_up();
                None
            }
            KeyCode::PageDown => {
                self.scroll_logs_down();
                None
            }
            KeyCode::End => {
                self.scroll_logs_to_bottom();
                None
            }
            _ if self.send_form_open() => self.handle_form_key(key),
            _ => None,
        }
    }

    /// Keys that only apply while the transfer form is open.
    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => Some(Action::CloseSendForm),
            KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => {
                self.focused_field = self.focused_field.next();
                None
            }
            KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => {
                self.focused_field = self.focused_field.prev();
                None
            }
            KeyCode::Enter | KeyCode::Char('e') if !self.form.processing => {
                self.edit_buffer = self.focused_field.value(&self.form).to_string();
                self.input_mode = InputMode::Editing;
                None
            }
            KeyCode::Char('g') => Some(Action::EstimateGasPrice),
            KeyCode::Char('x') if !self.form.processing => Some(Action::Send),
            _ => None,
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                let value = std::mem::take(&mut self.edit_buffer);
                Some(Action::EditField(self.focused_field, value.trim().to_string()))
            }
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.edit_buffer.clear();
                None
            }
            KeyCode::Tab => {
                // Commit and move on.
                let value = std::mem::take(&mut self.edit_buffer);
                let field = self.focused_field;
                self.focused_field = field.next();
                self.edit_buffer = self.focused_field.value(&self.form).to_string();
                Some(Action::EditField(field, value.trim().to_string()))
            }
            KeyCode::Backspace => {
                self.edit_buffer.pop();
                None
            }
            KeyCode::Char(c) => {
                self.edit_buffer.push(c);
                None
            }
            _ => None,
        }
    }

    /// Apply state published by the connection manager or the form.
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::SetConnectionState(state) => {
                if !state.send_form_visible && self.input_mode == InputMode::Editing {
                    self.input_mode = InputMode::Normal;
                    self.edit_buffer.clear();
                }
                self.connection = state;
            }
            Action::SetFormState(form) => {
                self.fee = compute_fee(&form.gas_price_gwei, &form.gas_limit).ok();
                self.form = form;
            }
            Action::Quit => self.should_quit = true,
            _ => {}
        }
    }
}
