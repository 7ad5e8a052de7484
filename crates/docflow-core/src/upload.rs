//! Simulated upload progress
//!
//! Stands in for a real transfer: a background task advances progress by a
//! random step each tick until it reaches 100%. It is independent of the
//! store; callers submit once the upload reports completion.

use crate::config::UploadConfig;
use crate::types::Attachment;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

/// Progress report from a running upload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UploadEvent {
    Progress { percent: f64 },
    Completed,
    Cancelled,
}

/// How an upload ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Completed,
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The background task panicked or was aborted
    #[error("upload task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Spawns simulated uploads
#[derive(Debug, Clone, Default)]
pub struct UploadSimulator {
    config: UploadConfig,
}

impl UploadSimulator {
    #[must_use]
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    /// Start uploading `attachment`. Must be called inside a tokio runtime.
    pub fn start(&self, attachment: Attachment) -> UploadHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let task = tokio::spawn(run(attachment, self.config.clone(), events_tx, cancel_rx));
        UploadHandle {
            events: events_rx,
            cancel: Some(cancel_tx),
            task,
        }
    }
}

/// Caller's side of a running upload. Dropping it cancels the upload.
#[derive(Debug)]
pub struct UploadHandle {
    events: mpsc::UnboundedReceiver<UploadEvent>,
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<UploadOutcome>,
}

impl UploadHandle {
    /// Request cancellation; no effect once the upload has finished
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
    }

    /// Next progress event; `None` after the final event
    pub async fn next_event(&mut self) -> Option<UploadEvent> {
        self.events.recv().await
    }

    /// Wait for the upload to finish, discarding unread events
    pub async fn wait(self) -> Result<UploadOutcome, UploadError> {
        let UploadHandle { task, cancel, .. } = self;
        let outcome = task.await?;
        drop(cancel);
        Ok(outcome)
    }
}

async fn run(
    attachment: Attachment,
    config: UploadConfig,
    events: mpsc::UnboundedSender<UploadEvent>,
    mut cancel: oneshot::Receiver<()>,
) -> UploadOutcome {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut ticker = tokio::time::interval(Duration::from_millis(config.tick_ms));
    ticker.tick().await;

    let mut percent = 0.0_f64;
    loop {
        tokio::select! {
            _ = &mut cancel => {
                debug!(file = %attachment.name, percent, "upload cancelled");
                let _ = events.send(UploadEvent::Cancelled);
                return UploadOutcome::Cancelled;
            }
            _ = ticker.tick() => {
                // step lies in (0, max_step]
                let step = config.max_step * (1.0 - rng.random::<f64>());
                percent += step;
                if percent >= 100.0 {
                    let _ = events.send(UploadEvent::Progress { percent: 100.0 });
                    let _ = events.send(UploadEvent::Completed);
                    debug!(file = %attachment.name, size = attachment.size, "upload completed");
                    return UploadOutcome::Completed;
                }
                let _ = events.send(UploadEvent::Progress { percent });
            }
        }
    }
}
