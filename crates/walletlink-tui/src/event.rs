//! Terminal event handling.

use color_eyre::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Terminal events.
#[derive(Debug)]
pub enum Event {
    /// Periodic tick for animations.
    Tick,
    /// Key press.
    Key(KeyEvent),
    /// Terminal resize (width, height).
    #[allow(dead_code)]
    Resize(u16, u16),
}

fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        // Windows reports releases as well.
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
        _ => None,
    }
}

/// Polls the terminal on a blocking thread and forwards events.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    token: CancellationToken,
}

impl EventHandler {
    /// Create a new event handler with the given tick rate in milliseconds.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let tick_rate = Duration::from_millis(tick_rate_ms);

        let cancelled = token.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_rate);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = interval.tick() => {
                        if tx.send(Event::Tick).is_err() {
                            break;
                        }
                    }
                    polled = tokio::task::spawn_blocking(|| {
                        match event::poll(Duration::from_millis(50)) {
                            Ok(true) => event::read().ok(),
                            _ => None,
                        }
                    }) => {
                        if let Ok(Some(raw)) = polled
                            && let Some(event) = translate(raw)
                            && tx.send(event).is_err()
                        {
                            break;
                        }
                    }
                }
            }
        });

        Self { rx, token }
    }

    /// Get the next event.
    pub async fn next(&mut self) -> Result<Event> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| color_eyre::eyre::eyre!("Event channel closed"))
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
