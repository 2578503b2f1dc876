use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use acessos_core::view::ViewMode;

use crate::app::{App, AppState, LoginFocus};

use super::panels::{admin, agent};
use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(1), // Notice
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_notice(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("  {}", app.view.title());
    let admin_hint = format!("[F2] {}", app.view.admin_action());

    let title_line = Line::from(vec![
        Span::styled(title.clone(), styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize)
                .saturating_sub(title.chars().count() + admin_hint.chars().count() + 2),
        )),
        Span::styled(admin_hint, styles::admin_button_style(app.view)),
    ]);
    let subtitle_line = Line::from(Span::styled(
        format!("  {}", app.view.subtitle()),
        styles::muted_style(),
    ));

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(vec![title_line, subtitle_line]).block(block);
    frame.render_widget(paragraph, area);
}

fn render_notice(frame: &mut Frame, app: &App, area: Rect) {
    let Some(notice) = app.notices.visible() else {
        return;
    };
    let line = Line::from(Span::styled(
        format!(" {}", notice.text),
        styles::notice_style(notice.kind),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// The panel is chosen from the view mode alone.
fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.view {
        ViewMode::AgentView => agent::render(frame, app, area),
        ViewMode::AdminView => admin::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = match app.session.time_remaining() {
        Some(remaining) => format!(" Sessão expira em {} ", format_countdown(remaining.as_secs())),
        None => format!(" API: {} ", app.api.base()),
    };

    let shortcuts = match app.view {
        ViewMode::AgentView => "[Enter] buscar | [a] admin | [?] ajuda | [q] sair",
        ViewMode::AdminView => "[Tab] campo | [Enter] próximo/enviar | [F1] ajuda",
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

/// Format seconds as m:ss
fn format_countdown(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 20, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled("  Portal de Acessos", styles::title_style())),
        Line::from(Span::styled(
            format!("  versão {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Consulta", styles::highlight_style())),
        key("0-9", "Digitar o Ramal"),
        key("Enter", "Buscar acessos"),
        key("Esc", "Limpar busca"),
        key("a / F2", "Login administrativo"),
        key("q", "Sair"),
        Line::from(""),
        Line::from(Span::styled(" Administração", styles::highlight_style())),
        key("Tab / ↓", "Próximo campo"),
        key("S-Tab / ↑", "Campo anterior"),
        key("Enter", "Próximo campo / adicionar"),
        key("F2", "Logout administrativo"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Pressione ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" para fechar", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    // Fixed size dialog - compact
    let height = if app.login_error.is_some() { 11 } else { 9 };
    let area = centered_rect_fixed(48, height, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("      Login Administrativo", styles::title_style())),
        Line::from(""),
    ];

    // Username field
    let username_focused = app.login_focus == LoginFocus::Username;
    let username_style = if username_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let username_display = format!("{:<16}", app.login_username);
    let cursor = if username_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Usuário: [", styles::muted_style()),
        Span::styled(format!("{}{}", username_display, cursor), username_style),
        Span::styled("]", styles::muted_style()),
    ]));

    // Password field
    let password_focused = app.login_focus == LoginFocus::Password;
    let password_style = if password_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let password_masked: String = "*".repeat(app.login_password.chars().count().min(16));
    let password_display = format!("{:<16}", password_masked);
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Senha:   [", styles::muted_style()),
        Span::styled(format!("{}{}", password_display, cursor), password_style),
        Span::styled("]", styles::muted_style()),
    ]));

    // Login button
    let button_focused = app.login_focus == LoginFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    lines.push(Line::from(""));
    let label = if button_focused { " ▶ Entrar ◀ " } else { "   Entrar   " };
    lines.push(Line::from(vec![
        Span::raw("              ["),
        Span::styled(label, button_style),
        Span::raw("]"),
    ]));

    // Error message
    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 6, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Deseja realmente sair?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Pressione ", styles::muted_style()),
            Span::styled("[S]", styles::help_key_style()),
            Span::styled(" para sair, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" para cancelar", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}
