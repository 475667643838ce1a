use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::poller::PollCompletion;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    /// Terminal resized; the next draw picks up the new size.
    Resize,
    /// Terminal focus gained: the dashboard is visible again.
    FocusGained,
    /// Terminal focus lost: the dashboard is hidden.
    FocusLost,
    /// The repeating poll timer fired. Carries the generation of the timer
    /// that sent it.
    PollTick(u64),
    /// A fetch started by the poller finished.
    PollDone(PollCompletion),
}

pub fn start_terminal_events(event_tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        loop {
            match reader.next().await {
                Some(Ok(event)) => {
                    let app_event = match event {
                        // Release/repeat events only show up with the kitty protocol.
                        Event::Key(key) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                        Event::Resize(..) => AppEvent::Resize,
                        Event::FocusGained => AppEvent::FocusGained,
                        Event::FocusLost => AppEvent::FocusLost,
                        _ => continue,
                    };
                    if event_tx.send(app_event).is_err() {
                        break;
                    }
                }
                Some(Err(e)) => {
                    tracing::error!(event = "dash.terminal.read_failed", error = %e);
                    break;
                }
                None => break,
            }
        }
    });
}
