//! UI rendering.

use crate::action::FormField;
use crate::app::{App, InputMode};
use crate::log_buffer::LogLevel;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use walletlink_core::TransferPhase;

/// Safely truncate a string to a maximum number of characters (not bytes).
fn truncate_str(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        s.chars().take(max_chars).collect()
    } else {
        let truncated: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", truncated)
    }
}

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::vertical([
        Constraint::Length(3),  // Header
        Constraint::Min(0),     // Content
        Constraint::Length(12), // Log viewer (10 lines + border)
    ])
    .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_content(frame, app, chunks[1]);
    render_logs(frame, app, chunks[2]);

    if app.showing_help {
        render_help_modal(frame, app);
    }
}

/// Render the header with provider, network and account.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let p = &app.palette;
    let conn = &app.connection;

    let mut spans = vec![
        Span::styled(
            format!("[{}] ", app.provider_label),
            Style::default().fg(p.accent).bold(),
        ),
    ];

    if conn.connected {
        let network = conn.network.name.as_deref().unwrap_or("Unknown network");
        spans.push(Span::raw(network.to_string()));
        if conn.network.is_testnet {
            spans.push(Span::styled(" testnet", Style::default().fg(p.testnet)));
        }
        spans.push(Span::raw("  │  "));
        spans.push(Span::styled(
            conn.short_account().unwrap_or_default(),
            Style::default().fg(p.primary),
        ));
        spans.push(Span::raw("  │  "));
        spans.push(Span::styled(
            format!(
                "{} {}",
                conn.balance.as_deref().unwrap_or("--"),
                conn.currency_symbol()
            ),
            Style::default().fg(p.success).bold(),
        ));
    } else {
        spans.push(Span::styled("Not connected", Style::default().fg(p.muted)));
    }

    let header = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(p.border))
                .title(" Wallet Link "),
        )
        .alignment(Alignment::Left);

    frame.render_widget(header, area);
}

fn render_content(frame: &mut Frame, app: &App, area: Rect) {
    if app.send_form_open() {
        let chunks =
            Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
                .split(area);
        render_account(frame, app, chunks[0]);
        render_send_form(frame, app, chunks[1]);
    } else {
        render_account(frame, app, area);
    }
}

/// Render the connection panel.
fn render_account(frame: &mut Frame, app: &App, area: Rect) {
    let p = &app.palette;
    let conn = &app.connection;
    let label_style = Style::default().fg(p.muted);

    let (status, status_style) = if !app.provider_present {
        ("No wallet provider".to_string(), Style::default().fg(p.error))
    } else if conn.connecting {
        (
            format!("{} Waiting for wallet", app.spinner_char()),
            Style::default().fg(p.warning),
        )
    } else if conn.connected {
        ("Connected".to_string(), Style::default().fg(p.success))
    } else {
        ("Disconnected".to_string(), Style::default().fg(p.muted))
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Status   ", label_style),
            Span::styled(status, status_style.bold()),
        ]),
        Line::from(""),
    ];

    if conn.connected {
        let network = match (&conn.network.name, &conn.network.chain_id) {
            (Some(name), Some(id)) => format!("{} ({})", name, id),
            (Some(name), None) => name.clone(),
            _ => "Unknown".to_string(),
        };
        lines.push(Line::from(vec![
            Span::styled("Account  ", label_style),
            Span::raw(conn.account.clone().unwrap_or_default()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Network  ", label_style),
            Span::raw(network),
            if conn.network.is_testnet {
                Span::styled("  testnet", Style::default().fg(p.testnet))
            } else {
                Span::raw("")
            },
        ]));
        lines.push(Line::from(vec![
            Span::styled("Balance  ", label_style),
            Span::styled(
                format!(
                    "{} {}",
                    conn.balance.as_deref().unwrap_or("--"),
                    conn.currency_symbol()
                ),
                Style::default().fg(p.success).bold(),
            ),
        ]));
    } else {
        lines.push(Line::from(
            "Connect a wallet to see your balance and send transfers.",
        ));
    }

    if let Some(error) = &conn.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(p.error),
        )));
    }

    lines.push(Line::from(""));
    let key_style = Style::default().fg(p.highlight).bold();
    let hints: Vec<(&str, &str)> = if conn.connected {
        vec![
            ("d", "disconnect"),
            ("r", "refresh"),
            ("m", "mainnet"),
            ("s", if conn.send_form_visible { "hide send" } else { "send" }),
        ]
    } else {
        vec![("c", "connect")]
    };
    let mut hint_spans = Vec::new();
    for (key, desc) in hints {
        hint_spans.push(Span::styled(key, key_style));
        hint_spans.push(Span::raw(format!(":{}  ", desc)));
    }
    lines.push(Line::from(hint_spans));

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.border))
            .title(" Account "),
    );
    frame.render_widget(paragraph, area);
}

/// Render the transfer form.
fn render_send_form(frame: &mut Frame, app: &App, area: Rect) {
    let p = &app.palette;
    let form = &app.form;
    let symbol = app.connection.currency_symbol();
    let value_width = area.width.saturating_sub(24) as usize;

    let mut lines = vec![Line::from("")];
    for field in FormField::all() {
        let focused = *field == app.focused_field;
        let editing = focused && app.input_mode == InputMode::Editing;

        let value = if editing {
            format!("{}▏", app.edit_buffer)
        } else {
            field.value(form).to_string()
        };

        let hint = match field {
            FormField::Recipient if !form.recipient.is_empty() && !app.recipient_valid() => {
                Span::styled("  invalid address", Style::default().fg(p.error))
            }
            FormField::Amount if !form.amount.is_empty() && !app.amount_valid() => {
                Span::styled("  must be > 0", Style::default().fg(p.error))
            }
            FormField::Amount => Span::styled(format!("  {}", symbol), Style::default().fg(p.muted)),
            _ => Span::raw(""),
        };

        let marker = if focused { "> " } else { "  " };
        let label_style = if focused {
            Style::default().fg(p.border_focus).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(p.muted)
        };
        let value_style = if editing {
            Style::default().fg(p.highlight)
        } else {
            Style::default().fg(p.fg)
        };

        lines.push(Line::from(vec![
            Span::styled(marker, label_style),
            Span::styled(format!("{:<18}", field.label()), label_style),
            Span::styled(truncate_str(&value, value_width), value_style),
            hint,
        ]));
    }

    lines.push(Line::from(""));
    let fee_text = match &app.fee {
        Some(fee) if fee.is_degraded() => format!("~{} {} (approximate)", fee.ether(), symbol),
        Some(fee) => format!("{} {}", fee.ether(), symbol),
        None => "--".to_string(),
    };
    lines.push(Line::from(vec![
        Span::styled("  Network fee       ", Style::default().fg(p.muted)),
        Span::raw(fee_text),
    ]));
    lines.push(Line::from(""));

    let (phase_text, phase_style) = match form.phase {
        TransferPhase::Idle => ("Ready".to_string(), Style::default().fg(p.muted)),
        TransferPhase::Validating | TransferPhase::Submitting => (
            format!("{} {}", app.spinner_char(), form.phase.label()),
            Style::default().fg(p.warning),
        ),
        TransferPhase::Succeeded => (form.phase.label().to_string(), Style::default().fg(p.success)),
        TransferPhase::Failed => (form.phase.label().to_string(), Style::default().fg(p.error)),
    };
    lines.push(Line::from(vec![
        Span::styled("  Status            ", Style::default().fg(p.muted)),
        Span::styled(phase_text, phase_style.bold()),
    ]));
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            Style::default().fg(p.error),
        )));
    }
    if let Some(success) = &form.success {
        lines.push(Line::from(Span::styled(
            format!("  {}", success),
            Style::default().fg(p.success),
        )));
    }

    lines.push(Line::from(""));
    let key_style = Style::default().fg(p.highlight).bold();
    let hint_line = if app.input_mode == InputMode::Editing {
        Line::from(vec![
            Span::styled("  Enter", key_style),
            Span::raw(":save  "),
            Span::styled("Tab", key_style),
            Span::raw(":save+next  "),
            Span::styled("Esc", key_style),
            Span::raw(":cancel"),
        ])
    } else {
        Line::from(vec![
            Span::styled("  Enter", key_style),
            Span::raw(":edit  "),
            Span::styled("x", key_style),
            Span::raw(":send  "),
            Span::styled("g", key_style),
            Span::raw(":gas price  "),
            Span::styled("Esc", key_style),
            Span::raw(":close"),
        ])
    };
    lines.push(hint_line);

    let border = if app.input_mode == InputMode::Editing {
        p.border_focus
    } else {
        p.border
    };
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!(" Send {} ", symbol)),
    );
    frame.render_widget(paragraph, area);
}

fn render_help_modal(frame: &mut Frame, app: &App) {
    let pal = &app.palette;
    let area = frame.area();

    let modal_width = 50.min(area.width.saturating_sub(4));
    let modal_height = 26.min(area.height.saturating_sub(4));
    let modal_x = (area.width.saturating_sub(modal_width)) / 2;
    let modal_y = (area.height.saturating_sub(modal_height)) / 2;
    let modal_area = Rect::new(modal_x, modal_y, modal_width, modal_height);

    frame.render_widget(Clear, modal_area);

    let key_style = Style::default().fg(pal.highlight).bold();
    let section_style = Style::default().fg(pal.primary).bold();
    let entry = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", key), key_style),
            Span::raw(desc),
        ])
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("  Wallet", section_style)),
        entry("c", "Connect wallet"),
        entry("d", "Disconnect"),
        entry("r", "Refresh balance"),
        entry("m", "Switch to Ethereum Mainnet"),
        entry("s", "Show/hide send form"),
        Line::from(""),
        Line::from(Span::styled("  Send Form", section_style)),
        entry("↑/k ↓/j", "Select field"),
        entry("Enter/e", "Edit field"),
        entry("g", "Estimate gas price"),
        entry("x", "Send transfer"),
        entry("Esc", "Close form"),
        Line::from(""),
        Line::from(Span::styled("  Log Viewer", section_style)),
        entry("PgUp/PgDn", "Scroll logs up/down"),
        entry("End", "Jump to latest logs"),
        Line::from(""),
        entry("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::raw("  Press "),
            Span::styled("Esc", key_style),
            Span::raw(" or "),
            Span::styled("?", key_style),
            Span::raw(" to close"),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(pal.success))
                .title(" Keyboard Shortcuts "),
        )
        .style(Style::default().bg(pal.bg));

    frame.render_widget(paragraph, modal_area);
}

/// Render the log viewer with connection status.
fn render_logs(frame: &mut Frame, app: &App, area: Rect) {
    let p = &app.palette;
    let log_count = app.log_buffer.len();
    let visible_lines = area.height.saturating_sub(2) as usize;

    let status_text = if app.connection.connecting {
        format!("Connecting{}", ".".repeat((app.tick_count() % 4) as usize))
    } else if app.connection.connected {
        "Connected".to_string()
    } else {
        "Disconnected".to_string()
    };
    let status_style = if app.connection.connecting {
        Style::default().fg(p.warning)
    } else if app.connection.connected {
        Style::default().fg(p.success)
    } else {
        Style::default().fg(p.error)
    };

    let scroll_info = if app.log_scroll > 0 {
        format!(" [↑{}]", app.log_scroll)
    } else {
        String::new()
    };

    let mut display_lines: Vec<Line> = app
        .log_buffer
        .tail(visible_lines, app.log_scroll)
        .into_iter()
        .map(|log| {
            let level_style = match log.level {
                LogLevel::Trace => Style::default().fg(p.muted),
                LogLevel::Debug => Style::default().fg(p.primary),
                LogLevel::Info => Style::default().fg(p.success),
                LogLevel::Warn => Style::default().fg(p.warning),
                LogLevel::Error => Style::default().fg(p.error),
            };

            let target = if log.target.len() > 20 {
                format!("..{}", &log.target[log.target.len() - 18..])
            } else {
                log.target
            };

            Line::from(vec![
                Span::styled(format!("{:5} ", log.level.as_str()), level_style),
                Span::styled(format!("[{}] ", target), Style::default().fg(p.muted)),
                Span::raw(log.message),
            ])
        })
        .collect();

    while display_lines.len() < visible_lines {
        display_lines.insert(0, Line::from(""));
    }

    let warnings = app.log_buffer.count_at_least(LogLevel::Warn);
    let warning_text = if warnings > 0 {
        format!(" │ {} warning(s)", warnings)
    } else {
        String::new()
    };

    let title = Line::from(vec![
        Span::raw(" Logs "),
        Span::styled(format!("({}) ", log_count), Style::default().fg(p.muted)),
        Span::raw("│ "),
        Span::styled(status_text, status_style),
        Span::styled(warning_text, Style::default().fg(p.warning)),
        Span::styled(scroll_info, Style::default().fg(p.muted)),
        Span::raw(" │ PgUp/PgDn  ?:Help  q:Quit "),
    ]);

    let paragraph = Paragraph::new(display_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.border))
            .title(title),
    );

    frame.render_widget(paragraph, area);
}
