use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

/// Width of the credential title column
const TITLE_COLUMN_WIDTH: usize = 22;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search box
            Constraint::Min(5),    // Results
        ])
        .split(area);

    render_search(frame, app, chunks[0]);
    render_results(frame, app, chunks[1]);
}

fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    let button = if app.lookup_in_flight {
        Span::styled("[ Buscando... ]", styles::disabled_style())
    } else {
        Span::styled("[ Buscar Acessos ]", styles::highlight_style())
    };

    let line = Line::from(vec![
        Span::styled(" Ramal: ", styles::muted_style()),
        Span::styled(format!("{:<12}", format!("{}▌", app.extension_input)), styles::selected_style()),
        Span::raw("  "),
        button,
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(!app.lookup_in_flight))
        .title(Span::styled(" Buscar ", styles::title_style()));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_results(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref shown) = app.lookup_result else {
        let hint = Paragraph::new(Line::from(Span::styled(
            " Digite o número do seu Ramal e pressione Enter.",
            styles::muted_style(),
        )))
        .block(Block::default().borders(Borders::ALL).border_style(styles::border_style(false)));
        frame.render_widget(hint, area);
        return;
    };

    let mut lines = vec![Line::from("")];
    for row in shown.record.credential_rows() {
        let value_style = if row.title.ends_with("(Senha)") {
            styles::secret_style()
        } else {
            styles::list_item_style()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<width$}", row.title, width = TITLE_COLUMN_WIDTH), styles::muted_style()),
            Span::styled(row.value, value_style),
        ]));
    }

    let title = format!(" Acessos do Ramal {} ", shown.extension);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .title(Span::styled(title, styles::title_style()));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
