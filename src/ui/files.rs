use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};

use crate::format::{format_bytes, truncate_unicode};
use crate::system::files::{FileCategory, FileSummary};
use crate::system::snapshot::Section;
use crate::ui::theme::Theme;
use crate::ui::{panel, render_unavailable};

pub fn render_categories(
    frame: &mut Frame,
    area: Rect,
    files: &Section<FileSummary>,
    theme: &Theme,
) {
    let block = panel("files", theme);
    let files = match files {
        Section::Available(f) => f,
        Section::Unavailable(err) => return render_unavailable(frame, area, block, err, theme),
    };
    let title = format!(
        "{} files under {} ({} tracked extensions, {} skipped)",
        files.total_files(),
        files.scan_root().display(),
        FileCategory::TRACKED,
        files.skipped_entries()
    );
    let block = block.title_bottom(Line::from(Span::styled(
        format!(" {title} "),
        Style::default().fg(theme.text_secondary),
    )));

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let header = Row::new(vec![
        Cell::from("Ext").style(bold),
        Cell::from("Count").style(bold),
        Cell::from("Share").style(bold),
        Cell::from("Size").style(bold),
    ]);
    let rows: Vec<Row> = files
        .non_empty_rows()
        .into_iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(row.category.label()),
                Cell::from(row.count.to_string()),
                Cell::from(format!("{:.2}%", row.percent_of_total_files)),
                Cell::from(format_bytes(row.total_bytes)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(7),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Min(9),
        ],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, area);
}

pub fn render_largest(frame: &mut Frame, area: Rect, files: &Section<FileSummary>, theme: &Theme) {
    let block = panel("largest files", theme);
    let files = match files {
        Section::Available(f) => f,
        Section::Unavailable(err) => return render_unavailable(frame, area, block, err, theme),
    };
    let name_width = area.width.saturating_sub(16) as usize;
    let lines: Vec<Line> = files
        .largest_files()
        .iter()
        .enumerate()
        .map(|(i, file)| {
            Line::from(vec![
                Span::styled(
                    format!("{}. ", i + 1),
                    Style::default().fg(theme.text_secondary),
                ),
                Span::styled(
                    truncate_unicode(&file.display_name, name_width),
                    Style::default().fg(theme.text_primary),
                ),
                Span::styled(
                    format!("  {}", format_bytes(file.size_bytes)),
                    Style::default().fg(theme.text_secondary),
                ),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
