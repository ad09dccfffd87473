use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Gauge, Paragraph};

use crate::system::classify::Tier;
use crate::system::resources::CpuInfo;
use crate::system::snapshot::{Section, Snapshot};
use crate::ui::theme::Theme;
use crate::ui::{panel, render_unavailable};

pub fn render_gauges(frame: &mut Frame, area: Rect, snapshot: &Snapshot, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    match &snapshot.cpu {
        Section::Available(cpu) => {
            let freq = cpu
                .frequency_mhz
                .map(|f| format!(" @ {f} MHz"))
                .unwrap_or_default();
            let label = format!("{}% of {} cores{freq}", cpu.usage_percent, cpu.core_count);
            render_gauge(
                frame,
                chunks[0],
                "CPU",
                cpu.usage_percent,
                cpu.tier,
                label,
                theme,
            );
        }
        Section::Unavailable(err) => {
            render_unavailable(frame, chunks[0], panel("CPU", theme), err, theme)
        }
    }

    match &snapshot.memory {
        Section::Available(mem) => {
            let label = format!(
                "{}/{} GB ({}%)",
                mem.used_gib(),
                mem.total_gib(),
                mem.usage_percent
            );
            render_gauge(
                frame,
                chunks[1],
                "RAM",
                mem.usage_percent,
                mem.tier,
                label,
                theme,
            );
        }
        Section::Unavailable(err) => {
            render_unavailable(frame, chunks[1], panel("RAM", theme), err, theme)
        }
    }
}

fn render_gauge(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    percent: f64,
    tier: Tier,
    label: String,
    theme: &Theme,
) {
    let gauge = Gauge::default()
        .block(panel(title, theme))
        .gauge_style(
            Style::default()
                .fg(theme.tier_color(tier))
                .bg(theme.gauge_unfilled),
        )
        .ratio((percent / 100.0).clamp(0.0, 1.0))
        .label(label);
    frame.render_widget(gauge, area);
}

pub fn render_cores(frame: &mut Frame, area: Rect, cpu: &Section<CpuInfo>, theme: &Theme) {
    let block = panel("cores", theme);
    let cpu = match cpu {
        Section::Available(cpu) => cpu,
        Section::Unavailable(err) => return render_unavailable(frame, area, block, err, theme),
    };

    let lines: Vec<Line> = cpu
        .per_core
        .iter()
        .map(|core| {
            Line::from(vec![
                Span::styled(
                    format!("core {:>2} ", core.index),
                    Style::default().fg(theme.text_secondary),
                ),
                Span::styled(
                    format!("{:>5.1}%", core.usage_percent),
                    Style::default().fg(theme.tier_color(core.tier)),
                ),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
