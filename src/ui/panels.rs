use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
    Frame,
};

use crate::config::Theme;
use crate::dashboard::DashboardView;
use crate::render::{bar_width, Indicator};

fn panel(title: &str, theme: &Theme) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent))
}

fn row<'a>(label: &'a str, value: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), Style::default().fg(theme.dim)),
        Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
    ])
}

fn indicator_color(indicator: Indicator, theme: &Theme) -> Color {
    match indicator {
        Indicator::Online => theme.online,
        Indicator::Offline => theme.offline,
        Indicator::Unknown => theme.dim,
    }
}

pub fn render_overview(view: &DashboardView, theme: &Theme, frame: &mut Frame, area: Rect) {
    let block = panel("overview", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(inner);

    let clock = Paragraph::new(vec![
        row("time", &view.clock, theme),
        row("uptime", &view.uptime, theme),
    ]);
    frame.render_widget(clock, left);

    let color = indicator_color(view.indicator, theme);
    let oled = Paragraph::new(Line::from(vec![
        Span::styled(format!("{:<12}", "oled"), Style::default().fg(theme.dim)),
        Span::styled("● ", Style::default().fg(color)),
        Span::styled(
            view.indicator_label.as_str(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ]));
    frame.render_widget(oled, right);
}

pub fn render_cpu(view: &DashboardView, theme: &Theme, frame: &mut Frame, area: Rect) {
    let block = panel("cpu", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [text, bar] = Layout::vertical([Constraint::Length(3), Constraint::Length(1)]).areas(inner);

    frame.render_widget(
        Paragraph::new(vec![
            row("usage", &view.cpu_usage, theme),
            row("freq", &view.cpu_freq, theme),
            row("temp", &view.cpu_temp, theme),
        ]),
        text,
    );
    render_bar(view.cpu_ratio(), view.cpu_bar, theme, frame, bar);
}

pub fn render_memory(view: &DashboardView, theme: &Theme, frame: &mut Frame, area: Rect) {
    let block = panel("memory", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [text, bar] = Layout::vertical([Constraint::Length(3), Constraint::Length(1)]).areas(inner);

    frame.render_widget(
        Paragraph::new(vec![
            row("usage", &view.mem_usage, theme),
            row("used", &view.mem_detail, theme),
        ]),
        text,
    );
    render_bar(view.mem_ratio(), view.mem_bar, theme, frame, bar);
}

pub fn render_network(view: &DashboardView, theme: &Theme, frame: &mut Frame, area: Rect) {
    let block = panel("network", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(inner);

    frame.render_widget(
        Paragraph::new(vec![
            row("ip", &view.ip, theme),
            row("network", &view.network_name, theme),
        ]),
        left,
    );
    frame.render_widget(
        Paragraph::new(vec![
            row("↑ upload", &view.upload, theme),
            row("↓ download", &view.download, theme),
        ]),
        right,
    );
}

fn render_bar(ratio: f64, percent: f64, theme: &Theme, frame: &mut Frame, area: Rect) {
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(theme.accent).bg(Color::Reset))
        .ratio(ratio)
        .label(bar_width(percent));
    frame.render_widget(gauge, area);
}
