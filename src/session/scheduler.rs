//! Automatic day advancement
//!
//! The engine itself only steps one day at a time. `AutoAdvance` is the
//! host-side timer: a tokio task calling `advance_day` at a fixed period
//! until the game ends or the task is cancelled. Day reports are streamed
//! back over a channel.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use crate::session::controller::{DayReport, SessionController};

/// Session shared between the host and the auto-advance task
pub type SharedSession<R> = Arc<Mutex<SessionController<R>>>;

/// Handle to a running auto-advance task
///
/// Dropping the handle cancels the task.
pub struct AutoAdvance {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl AutoAdvance {
    /// Spawn the repeating task; the first day advances after one `period`
    pub fn spawn<R>(session: SharedSession<R>, period: Duration) -> (Self, mpsc::UnboundedReceiver<DayReport>)
    where
        R: Rng + Send + 'static,
    {
        let (cancel, mut cancelled) = watch::channel(false);
        let (reports, receiver) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = cancelled.changed() => break,
                }

                let mut session = session.lock().await;
                if session.is_game_over() {
                    break;
                }
                match session.advance_day() {
                    Ok(report) => {
                        let game_over = report.game_over;
                        // The host may have dropped the receiver
                        let _ = reports.send(report);
                        if game_over {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Auto-advance stopped: {}", e);
                        break;
                    }
                }
            }
            tracing::debug!("Auto-advance task finished");
        });

        (Self { cancel, handle }, receiver)
    }

    /// Stop advancing; safe to call more than once
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task to stop
    pub async fn join(self) {
        let AutoAdvance { cancel, handle } = self;
        if let Err(e) = handle.await {
            tracing::warn!("Auto-advance task failed: {}", e);
        }
        drop(cancel);
    }
}
