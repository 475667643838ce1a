use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::Screen;
use crate::poller::{Outcome, PollState};

pub fn render(screen: &Screen, frame: &mut Frame, area: Rect) {
    let theme = screen.theme;
    let left = format!(" statusdash  {} ", screen.endpoint);

    let state = match (screen.state, screen.manual_pause) {
        (PollState::Active, _) => "live",
        (PollState::Paused, true) => "paused (p)",
        (PollState::Paused, false) => "paused",
    };
    let state = if screen.in_flight > 0 {
        format!("{} …", state)
    } else {
        state.to_string()
    };
    let pause_hint = if screen.manual_pause { "resume" } else { "pause" };
    let right = format!(
        "updated {} │ {} │ p {}  r refresh  q quit ",
        screen.view.last_update, state, pause_hint
    );

    let left_style = match screen.last_outcome {
        Some(Outcome::Failed) => Style::default().fg(theme.offline),
        _ => Style::default().fg(theme.accent),
    };

    let padding = (area.width as usize).saturating_sub(left.width() + right.width());

    let line = Line::from(vec![
        Span::styled(left, left_style.add_modifier(Modifier::BOLD)),
        Span::raw(" ".repeat(padding)),
        Span::styled(right, Style::default().fg(theme.dim)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}
