use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::{Labels, PollingConfig};
use crate::error::PollError;
use crate::event::AppEvent;
use crate::render::{render, render_failure, Renderer};
use crate::status::{StatusSnapshot, StatusSource};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollState {
    /// The repeating timer is running.
    Active,
    /// No timer; nothing is fetched until the dashboard is visible again.
    Paused,
}

/// Result of one fetch, tagged with the order it was issued in.
#[derive(Debug)]
pub struct PollCompletion {
    pub seq: u64,
    pub result: Result<StatusSnapshot, PollError>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Rendered,
    Failed,
    /// An older request finished after a newer one had already been shown.
    Stale,
}

/// Owns the single poll timer and the visibility state machine.
///
/// The timer task and every fetch task only ever send events back to the
/// event loop; all state changes happen through `&mut self` on that loop.
pub struct Poller<S: StatusSource> {
    source: Arc<S>,
    interval: Duration,
    discard_stale: bool,
    events: mpsc::UnboundedSender<AppEvent>,
    state: PollState,
    timer: Option<JoinHandle<()>>,
    /// Bumped each time a timer is spawned; ticks carry the value they were
    /// sent under.
    timer_generation: u64,
    next_seq: u64,
    newest_applied: u64,
    in_flight: usize,
}

impl<S: StatusSource> Poller<S> {
    /// A poller that has not started yet. Call `start` to begin polling.
    pub fn new(
        source: Arc<S>,
        settings: &PollingConfig,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            source,
            interval: settings.interval(),
            discard_stale: settings.discard_stale,
            events,
            state: PollState::Paused,
            timer: None,
            timer_generation: 0,
            next_seq: 1,
            newest_applied: 0,
            in_flight: 0,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn timer_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Initial entry into Active: fetch right away, then every interval.
    pub fn start(&mut self) {
        self.activate();
    }

    /// Dashboard hidden. Cancels the timer; fetches already in flight still
    /// complete and render.
    pub fn on_hidden(&mut self) {
        if self.state == PollState::Paused {
            return;
        }
        self.cancel_timer();
        self.state = PollState::Paused;
        tracing::info!(event = "dash.poll.paused");
    }

    /// Dashboard visible again. No-op when already polling.
    pub fn on_visible(&mut self) {
        if self.state == PollState::Active {
            return;
        }
        tracing::info!(event = "dash.poll.resumed");
        self.activate();
    }

    /// A timer tick. Ticks still queued from a cancelled timer are ignored,
    /// even when polling has resumed since.
    pub fn on_tick(&mut self, generation: u64) {
        if self.state != PollState::Active || generation != self.timer_generation {
            tracing::debug!(
                event = "dash.poll.tick_ignored",
                generation,
                current = self.timer_generation
            );
            return;
        }
        self.fetch_now();
    }

    /// Start one fetch cycle without touching the timer.
    pub fn fetch_now(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight += 1;

        let source = Arc::clone(&self.source);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = source.fetch().await;
            // The receiver is gone only when the app is shutting down.
            let _ = events.send(AppEvent::PollDone(PollCompletion { seq, result }));
        });

        tracing::debug!(event = "dash.poll.started", seq);
        seq
    }

    /// Second half of a fetch cycle: apply a finished fetch to `renderer`.
    /// Failures never stop the timer; the next tick simply tries again.
    pub fn complete(
        &mut self,
        completion: PollCompletion,
        labels: &Labels,
        renderer: &mut impl Renderer,
    ) -> Outcome {
        let PollCompletion { seq, result } = completion;
        self.in_flight = self.in_flight.saturating_sub(1);

        if self.discard_stale && seq < self.newest_applied {
            tracing::debug!(
                event = "dash.poll.stale_dropped",
                seq,
                newest = self.newest_applied
            );
            return Outcome::Stale;
        }
        self.newest_applied = self.newest_applied.max(seq);

        match result {
            Ok(snapshot) => {
                render(&snapshot, labels, Local::now(), renderer);
                tracing::debug!(event = "dash.poll.rendered", seq);
                Outcome::Rendered
            }
            Err(e) => {
                tracing::warn!(
                    event = "dash.poll.failed",
                    seq,
                    kind = ?e.kind(),
                    error_code = e.error_code(),
                    error = %e
                );
                render_failure(labels, renderer);
                Outcome::Failed
            }
        }
    }

    /// Stop the timer for good. Later completions are still accepted if the
    /// caller keeps feeding them in.
    pub fn shutdown(&mut self) {
        self.cancel_timer();
        self.state = PollState::Paused;
    }

    fn activate(&mut self) {
        self.cancel_timer();
        self.state = PollState::Active;
        self.fetch_now();
        self.timer_generation += 1;
        self.timer = Some(spawn_timer(
            self.interval,
            self.timer_generation,
            self.events.clone(),
        ));
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl<S: StatusSource> Drop for Poller<S> {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

/// Repeating timer whose first tick comes one full interval after start.
fn spawn_timer(
    interval: Duration,
    generation: u64,
    events: mpsc::UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if events.send(AppEvent::PollTick(generation)).is_err() {
                break;
            }
        }
    })
}
