use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::format::{UNAVAILABLE, format_uptime, or_unavailable};
use crate::system::snapshot::{Section, Snapshot};
use crate::ui::panel;
use crate::ui::theme::Theme;

pub fn render(frame: &mut Frame, area: Rect, snapshot: &Snapshot, theme: &Theme) {
    let block = panel("host", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut spans = vec![Span::styled(
        " hostpulse ",
        Style::default()
            .fg(theme.header_accent_fg)
            .bg(theme.header_accent_bg)
            .add_modifier(Modifier::BOLD),
    )];

    match &snapshot.host {
        Section::Available(host) => {
            let load = host
                .load
                .map(|l| format!("{:.0}/{:.0}/{:.0}%", l.one, l.five, l.fifteen))
                .unwrap_or_else(|| UNAVAILABLE.to_string());
            let facts = [
                or_unavailable(host.hostname.as_deref()),
                or_unavailable(host.os_long.as_deref().or(host.os.as_deref())),
                format!("up {}", format_uptime(host.uptime)),
                format!("users {}", or_unavailable(host.user_count)),
                format!("ip {}", or_unavailable(host.ip_address)),
                format!("load {load}"),
            ];
            for fact in facts {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(fact, Style::default().fg(theme.text_primary)));
            }
        }
        Section::Unavailable(err) => {
            spans.push(Span::styled(
                format!("  host unavailable: {err}"),
                Style::default().fg(theme.status_err),
            ));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}
