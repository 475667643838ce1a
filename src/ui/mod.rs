pub mod panels;
pub mod status_bar;

use ratatui::layout::{Constraint, Layout};
use ratatui::Frame;

use crate::config::Theme;
use crate::dashboard::DashboardView;
use crate::poller::{Outcome, PollState};

/// Everything one frame needs, borrowed from the app.
pub struct Screen<'a> {
    pub view: &'a DashboardView,
    pub theme: &'a Theme,
    pub endpoint: &'a str,
    pub state: PollState,
    pub manual_pause: bool,
    pub in_flight: usize,
    pub last_outcome: Option<Outcome>,
}

pub fn render(screen: &Screen, frame: &mut Frame) {
    let [overview, gauges, network, _, footer] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(6),
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let [cpu, memory] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(gauges);

    panels::render_overview(screen.view, screen.theme, frame, overview);
    panels::render_cpu(screen.view, screen.theme, frame, cpu);
    panels::render_memory(screen.view, screen.theme, frame, memory);
    panels::render_network(screen.view, screen.theme, frame, network);
    status_bar::render(screen, frame, footer);
}
