//! Background execution of the two pipelines.
//!
//! A job runs on its own named OS thread while holding the shared
//! [`OperationLock`] slot. The caller gets a [`JobHandle`] with an event
//! stream; the last event is always `Finished` carrying a [`JobOutcome`].
//! The slot is released before `Finished` is sent, so a caller that has seen
//! the outcome can start the next job right away.

use super::cancel::CancelToken;
use super::operation_lock::{JobKind, OperationGuard, OperationLock};
use super::scratch::ScratchSpace;
use crate::services::archive::{run_extraction, Decompressor, ExtractionRequest, ExtractionStage};
use crate::services::compression::Compressor;
use crate::services::packaging::{run_packaging, PackageSpec};
use crate::types::errors::{AppResult, ExtractionError, JobError, PackagingError};
use serde::Serialize;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "event", content = "data")]
pub enum JobEvent {
    Started { kind: JobKind },
    Progress { percent: u8, stage: String },
    Finished(JobOutcome),
}

/// Terminal result of a job, as shown to the user.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum JobOutcome {
    #[serde(rename_all = "camelCase")]
    Completed {
        message: String,
        files_copied: usize,
        templates_copied: Vec<String>,
        output: Option<PathBuf>,
    },
    Failed {
        message: String,
    },
    Cancelled {
        message: String,
    },
    Unexpected {
        message: String,
    },
}

impl JobOutcome {
    pub fn success(&self) -> bool {
        matches!(self, JobOutcome::Completed { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            JobOutcome::Completed { message, .. }
            | JobOutcome::Failed { message }
            | JobOutcome::Cancelled { message }
            | JobOutcome::Unexpected { message } => message,
        }
    }
}

/// What a running pipeline sees of its job.
pub struct JobContext {
    events: UnboundedSender<JobEvent>,
    pub cancel: CancelToken,
    pub scratch: ScratchSpace,
}

impl JobContext {
    pub fn progress(&self, percent: u8, stage: &str) {
        // Receiver gone means the caller stopped listening; keep working.
        let _ = self.events.send(JobEvent::Progress {
            percent,
            stage: stage.to_string(),
        });
    }
}

pub struct JobHandle {
    kind: JobKind,
    events: UnboundedReceiver<JobEvent>,
    cancel: CancelToken,
    scratch: ScratchSpace,
    outcome: Option<JobOutcome>,
}

impl JobHandle {
    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Next event from the worker, `None` once the stream is exhausted.
    pub async fn next_event(&mut self) -> Option<JobEvent> {
        let event = self.events.recv().await;
        if let Some(JobEvent::Finished(outcome)) = &event {
            self.outcome = Some(outcome.clone());
        }
        event
    }

    /// Drain events until the job finishes.
    pub async fn wait(mut self) -> Result<JobOutcome, JobError> {
        self.wait_for_outcome().await
    }

    /// Ask the worker to stop and wait at most `bound` for it to acknowledge.
    ///
    /// Returns `None` if the worker was abandoned. Its scratch directories are
    /// purged regardless; the slot stays held until the thread finally ends.
    pub async fn cancel_and_wait(mut self, bound: Duration) -> Option<JobOutcome> {
        self.cancel.cancel();
        match tokio::time::timeout(bound, self.wait_for_outcome()).await {
            Ok(Ok(outcome)) => Some(outcome),
            Ok(Err(e)) => {
                log::error!("{} job ended abnormally: {e}", self.kind);
                self.scratch.purge();
                None
            }
            Err(_) => {
                let purged = self.scratch.purge();
                log::warn!(
                    "{} job did not stop within {:?}; abandoned ({purged} scratch dir(s) purged)",
                    self.kind,
                    bound
                );
                None
            }
        }
    }

    async fn wait_for_outcome(&mut self) -> Result<JobOutcome, JobError> {
        if let Some(outcome) = self.outcome.clone() {
            return Ok(outcome);
        }
        while let Some(event) = self.next_event().await {
            if let JobEvent::Finished(outcome) = event {
                return Ok(outcome);
            }
        }
        Err(JobError::Disconnected)
    }
}

/// Single-slot executor shared by extraction and packaging.
#[derive(Clone, Default)]
pub struct JobRunner {
    lock: Arc<OperationLock>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<JobKind> {
        self.lock.active()
    }

    /// Hold the slot for work that runs on the caller's thread.
    pub fn reserve(&self, kind: JobKind) -> AppResult<OperationGuard> {
        self.lock.try_acquire(kind)
    }

    pub fn start_extraction(
        &self,
        request: ExtractionRequest,
        decompressor: Arc<dyn Decompressor>,
    ) -> AppResult<JobHandle> {
        self.spawn(JobKind::Extraction, move |ctx| {
            let mut on_stage =
                |stage: ExtractionStage| ctx.progress(stage.percent(), stage.label());

            match run_extraction(
                &request,
                decompressor.as_ref(),
                &ctx.scratch,
                &ctx.cancel,
                &mut on_stage,
            ) {
                Ok(report) => {
                    if !report.failed_files.is_empty() {
                        log::warn!("{} file(s) could not be copied", report.failed_files.len());
                    }
                    JobOutcome::Completed {
                        message: "Extraction completed successfully.".to_string(),
                        files_copied: report.files_copied,
                        templates_copied: report.templates_copied,
                        output: Some(request.content_dir.clone()),
                    }
                }
                Err(ExtractionError::Cancelled) => JobOutcome::Cancelled {
                    message: ExtractionError::Cancelled.to_string(),
                },
                Err(e) => {
                    log::error!("Extraction failed: {e}");
                    JobOutcome::Failed {
                        message: e.to_string(),
                    }
                }
            }
        })
    }

    pub fn start_packaging(
        &self,
        spec: PackageSpec,
        compressor: Box<dyn Compressor>,
    ) -> AppResult<JobHandle> {
        self.spawn(JobKind::Packaging, move |ctx| {
            let mut on_progress = |percent: u8, stage: &str| ctx.progress(percent, stage);

            match run_packaging(&spec, compressor.as_ref(), &ctx.cancel, &mut on_progress) {
                Ok(output) => JobOutcome::Completed {
                    message: "Packaging completed successfully.".to_string(),
                    files_copied: 0,
                    templates_copied: Vec::new(),
                    output: Some(output),
                },
                Err(PackagingError::Cancelled) => JobOutcome::Cancelled {
                    message: PackagingError::Cancelled.to_string(),
                },
                Err(e) => {
                    log::error!("Packaging failed: {e}");
                    JobOutcome::Failed {
                        message: e.to_string(),
                    }
                }
            }
        })
    }

    /// Claim the slot and run `work` on a dedicated thread.
    /// Rejected with `AppError::Busy` while any job holds the slot.
    pub fn spawn<F>(&self, kind: JobKind, work: F) -> AppResult<JobHandle>
    where
        F: FnOnce(&JobContext) -> JobOutcome + Send + 'static,
    {
        let guard = self.lock.try_acquire(kind)?;

        let (tx, rx) = unbounded_channel();
        let cancel = CancelToken::new();
        let scratch = ScratchSpace::new();
        let ctx = JobContext {
            events: tx,
            cancel: cancel.clone(),
            scratch: scratch.clone(),
        };
        let _ = ctx.events.send(JobEvent::Started { kind });

        std::thread::Builder::new()
            .name(format!("dimcreator-{}", kind.to_string().to_lowercase()))
            .spawn(move || run_worker(kind, guard, ctx, work))
            .map_err(JobError::Spawn)?;

        log::info!("{kind} job started");
        Ok(JobHandle {
            kind,
            events: rx,
            cancel,
            scratch,
            outcome: None,
        })
    }
}

fn run_worker<F>(kind: JobKind, guard: OperationGuard, ctx: JobContext, work: F)
where
    F: FnOnce(&JobContext) -> JobOutcome,
{
    let outcome = match catch_unwind(AssertUnwindSafe(|| work(&ctx))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let detail = panic_message(payload.as_ref());
            log::error!("{kind} job panicked: {detail}");
            JobOutcome::Unexpected {
                message: format!("An unexpected error occurred: {detail}"),
            }
        }
    };

    let leftover = ctx.scratch.purge();
    if leftover > 0 {
        log::warn!("Removed {leftover} leftover scratch dir(s) after {kind} job");
    }

    log::info!("{kind} job finished: {}", outcome.message());
    drop(guard);
    let _ = ctx.events.send(JobEvent::Finished(outcome));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "tests/job_runner_tests.rs"]
mod tests;
