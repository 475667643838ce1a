use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::config::{Config, Labels};
use crate::dashboard::DashboardView;
use crate::error::PollError;
use crate::event::{self, AppEvent};
use crate::poller::{Outcome, Poller};
use crate::render::{render, render_failure};
use crate::status::{HttpStatusSource, StatusSource};
use crate::tui::Tui;
use crate::ui::{self, Screen};

pub struct App<S: StatusSource> {
    pub config: Config,
    pub view: DashboardView,
    pub poller: Poller<S>,
    endpoint: String,
    /// Terminal focus as last reported. Terminals that never report focus
    /// leave this `true`.
    pub focused: bool,
    /// Toggled with `p`; holds the dashboard hidden even while focused.
    pub manual_pause: bool,
    pub last_outcome: Option<Outcome>,
    pub should_quit: bool,
}

impl<S: StatusSource> App<S> {
    pub fn new(
        config: Config,
        endpoint: String,
        source: Arc<S>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let poller = Poller::new(source, &config.polling, event_tx);
        Self {
            config,
            view: DashboardView::new(),
            poller,
            endpoint,
            focused: true,
            manual_pause: false,
            last_outcome: None,
            should_quit: false,
        }
    }

    pub fn visible(&self) -> bool {
        self.focused && !self.manual_pause
    }

    pub fn screen(&self) -> Screen<'_> {
        Screen {
            view: &self.view,
            theme: &self.config.theme,
            endpoint: &self.endpoint,
            state: self.poller.state(),
            manual_pause: self.manual_pause,
            in_flight: self.poller.in_flight(),
            last_outcome: self.last_outcome,
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Resize => {}
            AppEvent::FocusGained => {
                self.focused = true;
                self.sync_visibility();
            }
            AppEvent::FocusLost => {
                self.focused = false;
                self.sync_visibility();
            }
            AppEvent::PollTick(generation) => self.poller.on_tick(generation),
            AppEvent::PollDone(done) => {
                let outcome = self
                    .poller
                    .complete(done, &self.config.labels, &mut self.view);
                if outcome != Outcome::Stale {
                    self.last_outcome = Some(outcome);
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => self.should_quit = true,
            (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            (KeyCode::Char('p'), _) => {
                self.manual_pause = !self.manual_pause;
                self.sync_visibility();
            }
            (KeyCode::Char('r'), _) => {
                self.poller.fetch_now();
            }
            _ => {}
        }
    }

    fn sync_visibility(&mut self) {
        if self.visible() {
            self.poller.on_visible();
        } else {
            self.poller.on_hidden();
        }
    }
}

/// Run the interactive dashboard until the user quits.
pub async fn run(config: Config) -> Result<()> {
    let source = Arc::new(HttpStatusSource::new(
        &config.server.url,
        config.server.timeout(),
    )?);
    let endpoint = source.url().to_string();
    tracing::info!(
        event = "dash.app.started",
        endpoint = %endpoint,
        interval_ms = config.polling.interval().as_millis() as u64
    );

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut app = App::new(config, endpoint, source, event_tx.clone());

    let mut tui = Tui::enter()?;

    event::start_terminal_events(event_tx);
    app.poller.start();

    loop {
        tui.draw(|frame| ui::render(&app.screen(), frame))?;

        if let Some(event) = event_rx.recv().await {
            app.handle_event(event);
        }
        while let Ok(event) = event_rx.try_recv() {
            app.handle_event(event);
            if app.should_quit {
                break;
            }
        }

        if app.should_quit {
            break;
        }
    }

    app.poller.shutdown();
    drop(tui);
    tracing::info!(event = "dash.app.stopped");
    Ok(())
}

/// One fetch cycle against a fresh view, for the `once` subcommand.
pub async fn fetch_once<S: StatusSource>(
    source: &S,
    labels: &Labels,
) -> (DashboardView, Result<(), PollError>) {
    let mut view = DashboardView::new();
    match source.fetch().await {
        Ok(snapshot) => {
            render(&snapshot, labels, Local::now(), &mut view);
            (view, Ok(()))
        }
        Err(e) => {
            tracing::warn!(event = "dash.once.failed", error_code = e.error_code(), error = %e);
            render_failure(labels, &mut view);
            (view, Err(e))
        }
    }
}

/// Print one snapshot as plain text. Returns `false` when the fetch failed.
pub async fn run_once(config: Config) -> Result<bool> {
    let source = HttpStatusSource::new(&config.server.url, config.server.timeout())?;
    let (view, result) = fetch_once(&source, &config.labels).await;
    for line in view.lines() {
        println!("{}", line);
    }
    if let Err(e) = &result {
        eprintln!("statusdash: {}", e);
    }
    Ok(result.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::PollState;
    use crate::render::Indicator;
    use crate::status::{sample_snapshot, StatusSnapshot};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    impl StatusSource for CountingSource {
        async fn fetch(&self) -> Result<StatusSnapshot, PollError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(sample_snapshot())
        }
    }

    fn make_app() -> (
        App<CountingSource>,
        Arc<CountingSource>,
        mpsc::UnboundedReceiver<AppEvent>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Arc::new(CountingSource::default());
        let app = App::new(
            Config::default(),
            "http://127.0.0.1:8080/api/status".to_string(),
            Arc::clone(&source),
            tx,
        );
        (app, source, rx)
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    /// Feed queued events back into the app until nothing arrives for `span`.
    async fn pump(
        app: &mut App<CountingSource>,
        rx: &mut mpsc::UnboundedReceiver<AppEvent>,
        span: Duration,
    ) {
        while let Ok(Some(event)) = tokio::time::timeout(span, rx.recv()).await {
            app.handle_event(event);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_render_does_not_wait_for_interval() {
        let (mut app, source, mut rx) = make_app();
        app.poller.start();
        pump(&mut app, &mut rx, Duration::from_millis(100)).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.view.indicator, Indicator::Online);
        assert_eq!(app.view.cpu_usage, "42.4%");
        assert_eq!(app.last_outcome, Some(Outcome::Rendered));
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_lost_pauses_and_focus_gained_resumes() {
        let (mut app, source, mut rx) = make_app();
        app.poller.start();
        pump(&mut app, &mut rx, Duration::from_millis(100)).await;

        app.handle_event(AppEvent::FocusLost);
        assert_eq!(app.poller.state(), PollState::Paused);
        assert!(!app.poller.timer_running());

        app.handle_event(AppEvent::FocusGained);
        assert_eq!(app.poller.state(), PollState::Active);
        pump(&mut app, &mut rx, Duration::from_millis(100)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_pause_holds_through_focus_gain() {
        let (mut app, _source, _rx) = make_app();
        app.poller.start();

        app.handle_event(key(KeyCode::Char('p')));
        assert!(app.manual_pause);
        assert_eq!(app.poller.state(), PollState::Paused);

        app.handle_event(AppEvent::FocusLost);
        app.handle_event(AppEvent::FocusGained);
        assert_eq!(app.poller.state(), PollState::Paused);

        app.handle_event(key(KeyCode::Char('p')));
        assert_eq!(app.poller.state(), PollState::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_key_fetches_without_touching_timer() {
        let (mut app, source, mut rx) = make_app();
        app.handle_event(key(KeyCode::Char('r')));
        pump(&mut app, &mut rx, Duration::from_millis(100)).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.poller.state(), PollState::Paused);
        assert!(!app.poller.timer_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_keys() {
        let (mut app, _source, _rx) = make_app();
        app.handle_event(key(KeyCode::Char('q')));
        assert!(app.should_quit);

        let (mut app, _source, _rx) = make_app();
        app.handle_event(AppEvent::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.should_quit);
    }

    struct DownSource;

    impl StatusSource for DownSource {
        async fn fetch(&self) -> Result<StatusSnapshot, PollError> {
            Err(PollError::Status {
                url: "http://127.0.0.1:8080/api/status".to_string(),
                status: 404,
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_once_renders_snapshot() {
        let source = CountingSource::default();
        let (view, result) = fetch_once(&source, &Labels::default()).await;
        assert!(result.is_ok());
        assert_eq!(view.mem_detail, "1.5 GB / 3.8 GB");
        assert_eq!(view.lines()[2], "oled: online");
    }

    #[tokio::test]
    async fn test_fetch_once_failure_marks_indicator() {
        let (view, result) = fetch_once(&DownSource, &Labels::default()).await;
        assert!(matches!(result, Err(PollError::Status { status: 404, .. })));
        assert_eq!(view.indicator, Indicator::Offline);
        assert_eq!(view.indicator_label, "connection failed");
        assert_eq!(view.clock, "--");
    }
}
