use std::path::PathBuf;

use tokio::{
    sync::{mpsc, oneshot},
    task::{self, JoinHandle},
};
use tracing::{debug, info};

use crate::{
    capture::CaptureCoordinator,
    error::{CaptureError, Result},
    film::{FilmState, Roll},
    frame::Frame,
};

/// Pending requests before callers start waiting on the queue
const QUEUE_DEPTH: usize = 32;

enum Command {
    Capture {
        frame: Frame,
        reply: oneshot::Sender<Result<PathBuf>>,
    },
    ResetFilm {
        reply: oneshot::Sender<Result<Roll>>,
    },
    DeleteRoll {
        roll_name: String,
        reply: oneshot::Sender<Result<()>>,
    },
    Status {
        reply: oneshot::Sender<FilmState>,
    },
}

/// Runs a [`CaptureCoordinator`] on a blocking thread and feeds it one request at a time
///
/// Captures arriving while another is being processed wait in the queue, so
/// two photos can never race for the last exposure.
pub struct CaptureWorker {
    tx: mpsc::Sender<Command>,
    task: JoinHandle<CaptureCoordinator>,
}

impl CaptureWorker {
    /// Must be called from within a Tokio runtime
    pub fn spawn(mut coordinator: CaptureCoordinator) -> Self {
        let (tx, mut rx) = mpsc::channel(QUEUE_DEPTH);

        let task = task::spawn_blocking(move || {
            debug!("Capture worker started");
            while let Some(command) = rx.blocking_recv() {
                // A caller that gave up waiting just drops its reply
                match command {
                    Command::Capture { frame, reply } => {
                        let _ = reply.send(coordinator.on_image_captured(&frame));
                    }
                    Command::ResetFilm { reply } => {
                        let _ = reply.send(coordinator.reset_film().map(Roll::clone));
                    }
                    Command::DeleteRoll { roll_name, reply } => {
                        let _ = reply.send(coordinator.delete_roll(&roll_name));
                    }
                    Command::Status { reply } => {
                        let _ = reply.send(coordinator.status());
                    }
                }
            }
            debug!("Capture worker stopped");
            coordinator
        });

        Self { tx, task }
    }

    pub fn handle(&self) -> CaptureHandle {
        CaptureHandle { tx: self.tx.clone() }
    }

    /// Stop accepting requests and get the coordinator back
    ///
    /// Waits until every outstanding [`CaptureHandle`] is dropped and the queue drained.
    pub async fn shutdown(self) -> Result<CaptureCoordinator> {
        drop(self.tx);
        let coordinator = self.task.await.map_err(|_| CaptureError::WorkerStopped)?;
        info!("Capture worker shut down");
        Ok(coordinator)
    }
}

/// Cheap, cloneable front end to a running [`CaptureWorker`]
#[derive(Clone)]
pub struct CaptureHandle {
    tx: mpsc::Sender<Command>,
}

impl CaptureHandle {
    pub async fn capture(&self, frame: Frame) -> Result<PathBuf> {
        self.request(|reply| Command::Capture { frame, reply }).await?
    }

    pub async fn reset_film(&self) -> Result<Roll> {
        self.request(|reply| Command::ResetFilm { reply }).await?
    }

    pub async fn delete_roll(&self, roll_name: impl Into<String>) -> Result<()> {
        let roll_name = roll_name.into();
        self.request(|reply| Command::DeleteRoll { roll_name, reply }).await?
    }

    pub async fn status(&self) -> Result<FilmState> {
        self.request(|reply| Command::Status { reply }).await
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| CaptureError::WorkerStopped)?;
        response.await.map_err(|_| CaptureError::WorkerStopped)
    }
}
