use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, FormField};
use crate::ui::styles;

/// Width of the label column in the add-agent form
const LABEL_WIDTH: usize = 20;

/// Visible width of each input box
const INPUT_WIDTH: usize = 32;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from("")];

    for field in FormField::ALL {
        let focused = app.form_focus == field;

        let Some(value) = field.value(&app.draft) else {
            lines.push(Line::from(""));
            lines.push(submit_line(app, focused));
            continue;
        };

        let shown = if field.is_secret() {
            "*".repeat(value.chars().count())
        } else {
            value.clone()
        };
        let cursor = if focused { "▌" } else { "" };
        let input_style = if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };

        lines.push(Line::from(vec![
            Span::styled(format!("  {:<width$}", field.label(), width = LABEL_WIDTH), styles::muted_style()),
            Span::styled("[", styles::muted_style()),
            Span::styled(
                format!("{:<width$}", format!("{}{}", tail(&shown, INPUT_WIDTH - 1), cursor), width = INPUT_WIDTH),
                input_style,
            ),
            Span::styled("]", styles::muted_style()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  As três senhas devem ser iguais (senha unificada).",
        styles::muted_style(),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .title(Span::styled(" Novo Agente ", styles::title_style()));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn submit_line(app: &App, focused: bool) -> Line<'static> {
    let padding = " ".repeat(LABEL_WIDTH + 2);
    if app.add_in_flight {
        return Line::from(vec![
            Span::raw(padding),
            Span::styled("[   Salvando...   ]", styles::disabled_style()),
        ]);
    }
    let label = if focused {
        " ▶ Adicionar Agente ◀ "
    } else {
        "   Adicionar Agente   "
    };
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    Line::from(vec![
        Span::raw(padding),
        Span::raw("["),
        Span::styled(label, style),
        Span::raw("]"),
    ])
}

/// Keep the end of long input visible
fn tail(s: &str, max_chars: usize) -> String {
    let count = s.chars().count();
    if count <= max_chars {
        s.to_string()
    } else {
        s.chars().skip(count - max_chars).collect()
    }
}
