pub mod files;
pub mod header;
pub mod processes;
pub mod resources;
pub mod statusbar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::app::App;
use crate::system::error::CollectError;
use crate::ui::theme::Theme;

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    statusbar::render(
        frame,
        chunks[3],
        app.snapshot.as_ref(),
        app.collecting,
        app.status_message.as_ref(),
        &app.theme,
    );

    let Some(snapshot) = &app.snapshot else {
        let waiting = Paragraph::new("Collecting first snapshot\u{2026}")
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.text_secondary));
        frame.render_widget(waiting, chunks[2]);
        return;
    };

    header::render(frame, chunks[0], snapshot, &app.theme);
    resources::render_gauges(frame, chunks[1], snapshot, &app.theme);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[2]);

    let process_rows = snapshot
        .top_processes
        .available()
        .map(|p| p.len().max(1))
        .unwrap_or(1) as u16;
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(process_rows + 3), Constraint::Min(3)])
        .split(columns[0]);
    processes::render(frame, left[0], &snapshot.top_processes, &app.theme);
    resources::render_cores(frame, left[1], &snapshot.cpu, &app.theme);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(8)])
        .split(columns[1]);
    files::render_categories(frame, right[0], &snapshot.files, &app.theme);
    files::render_largest(frame, right[1], &snapshot.files, &app.theme);
}

pub(crate) fn panel<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ))
}

pub(crate) fn render_unavailable(
    frame: &mut Frame,
    area: Rect,
    block: Block<'_>,
    err: &CollectError,
    theme: &Theme,
) {
    let paragraph = Paragraph::new(format!("unavailable: {err}"))
        .style(Style::default().fg(theme.status_err))
        .block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests;
