use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Cell, Paragraph, Row, Table};

use crate::format::truncate_unicode;
use crate::system::process::ProcessSample;
use crate::system::snapshot::Section;
use crate::ui::theme::Theme;
use crate::ui::{panel, render_unavailable};

const NAME_WIDTH: usize = 24;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    processes: &Section<Vec<ProcessSample>>,
    theme: &Theme,
) {
    let block = panel("top processes", theme);
    let processes = match processes {
        Section::Available(p) => p,
        Section::Unavailable(err) => return render_unavailable(frame, area, block, err, theme),
    };
    if processes.is_empty() {
        let paragraph = Paragraph::new("no active processes")
            .style(Style::default().fg(theme.text_secondary))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let header = Row::new(vec![
        Cell::from("PID").style(bold),
        Cell::from("Name").style(bold),
        Cell::from("CPU").style(bold),
        Cell::from("RAM").style(bold),
    ]);

    let rows: Vec<Row> = processes
        .iter()
        .map(|p| {
            Row::new(vec![
                Cell::from(p.pid.to_string()),
                Cell::from(truncate_unicode(&p.name, NAME_WIDTH)),
                Cell::from(format!("{:.1}%", p.cpu_percent))
                    .style(Style::default().fg(theme.tier_color(p.cpu_tier))),
                Cell::from(format!("{:.1}%", p.mem_percent))
                    .style(Style::default().fg(theme.tier_color(p.mem_tier))),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Min(10),
            Constraint::Length(7),
            Constraint::Length(7),
        ],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, area);
}
