//! Background model loading with stale-result cancellation.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info};

use super::MeshSource;
use crate::error::Result;
use crate::reactive::{ReactiveTarget, TargetSet};

/// Identifies one load request; later requests supersede earlier ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

/// Finished load: fully built targets, or the reason there are none
#[derive(Debug)]
pub struct LoadOutcome {
    pub ticket: LoadTicket,
    pub path: PathBuf,
    pub result: Result<Vec<ReactiveTarget>>,
}

/// Runs parse + target construction off the frame loop
///
/// Each [`request`](ModelLoader::request) bumps the generation. Results are
/// delivered through [`poll`](ModelLoader::poll) only if they belong to the
/// newest request; anything older is dropped when it arrives.
pub struct ModelLoader {
    source: Arc<dyn MeshSource>,
    sender: Sender<LoadOutcome>,
    receiver: Receiver<LoadOutcome>,
    generation: u64,
    pending: bool,
}

impl ModelLoader {
    pub fn new(source: Arc<dyn MeshSource>) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            source,
            sender,
            receiver,
            generation: 0,
            pending: false,
        }
    }

    /// Start loading `path` on a worker thread
    pub fn request(&mut self, path: impl Into<PathBuf>) -> Result<LoadTicket> {
        self.request_on(path, |name, job| {
            thread::Builder::new().name(name).spawn(job).map(drop)
        })
    }

    /// Issue a request through `spawn`; the current request stays in force
    /// if spawning fails
    fn request_on<S>(&mut self, path: impl Into<PathBuf>, spawn: S) -> Result<LoadTicket>
    where
        S: FnOnce(String, Box<dyn FnOnce() + Send>) -> io::Result<()>,
    {
        let ticket = LoadTicket(self.generation + 1);
        let path = path.into();

        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();
        let worker_path = path.clone();

        spawn(
            "model-loader".to_string(),
            Box::new(move || {
                let started = Instant::now();
                let result = source
                    .load(&worker_path)
                    .and_then(|asset| TargetSet::build_model_targets(&asset));
                debug!(
                    path = ?worker_path,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    ok = result.is_ok(),
                    "model load finished"
                );
                // Receiver lives as long as the loader; a send error only means shutdown
                let _ = sender.send(LoadOutcome {
                    ticket,
                    path: worker_path,
                    result,
                });
            }),
        )?;

        info!(path = ?path, ticket = ticket.0, "model load requested");
        self.generation = ticket.0;
        self.pending = true;
        Ok(ticket)
    }

    /// Invalidate any in-flight request
    pub fn cancel(&mut self) {
        if self.pending {
            debug!(ticket = self.generation, "cancelling model load");
        }
        self.generation += 1;
        self.pending = false;
    }

    /// Whether the newest request is still outstanding
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Non-blocking: the newest request's outcome, if it has arrived
    pub fn poll(&mut self) -> Option<LoadOutcome> {
        while let Ok(outcome) = self.receiver.try_recv() {
            if let Some(outcome) = self.accept(outcome) {
                return Some(outcome);
            }
        }
        None
    }

    /// Block up to `timeout` for the newest request's outcome
    pub fn wait(&mut self, timeout: Duration) -> Option<LoadOutcome> {
        // `None` when the timeout is too large to represent: wait unbounded
        let deadline = Instant::now().checked_add(timeout);
        while self.pending {
            let received = match deadline {
                Some(deadline) => self
                    .receiver
                    .recv_timeout(deadline.saturating_duration_since(Instant::now())),
                None => self
                    .receiver
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(outcome) => {
                    if let Some(outcome) = self.accept(outcome) {
                        return Some(outcome);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        None
    }

    fn accept(&mut self, outcome: LoadOutcome) -> Option<LoadOutcome> {
        if outcome.ticket.0 != self.generation {
            debug!(
                ticket = outcome.ticket.0,
                current = self.generation,
                "discarding stale model load"
            );
            return None;
        }
        self.pending = false;
        Some(outcome)
    }
}
