use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::{AskError, AskOutcome, AskPipeline, AskRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AskJobState {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskJobUpdate {
    pub job_id: u64,
    pub state: AskJobState,
    pub outcome: Option<AskOutcome>,
    pub error: Option<AskError>,
}

impl AskJobUpdate {
    fn running(job_id: u64) -> Self {
        Self {
            job_id,
            state: AskJobState::Running,
            outcome: None,
            error: None,
        }
    }

    fn finished(job_id: u64, result: Result<AskOutcome, AskError>) -> Self {
        match result {
            Ok(outcome) => Self {
                job_id,
                state: AskJobState::Succeeded,
                outcome: Some(outcome),
                error: None,
            },
            Err(error) => Self {
                job_id,
                state: AskJobState::Failed,
                outcome: None,
                error: Some(error),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("ask job {active_job_id} is still running; trigger ignored")]
    Busy { active_job_id: u64 },
    #[error("failed to start ask worker thread: {message}")]
    Spawn { message: String },
}

/// Runs asks off the caller's thread, one at a time.
///
/// Each accepted submission gets its own worker thread. Submitting while a job runs is
/// rejected with [`JobError::Busy`]; nothing is queued.
pub struct AskJobManager {
    pipeline: AskPipeline,
    next_job_id: AtomicU64,
    shared: Arc<Mutex<SharedState>>,
    worker_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl AskJobManager {
    pub fn new(pipeline: AskPipeline) -> Self {
        Self {
            pipeline,
            next_job_id: AtomicU64::new(1),
            shared: Arc::new(Mutex::new(SharedState::default())),
            worker_handle: Mutex::new(None),
        }
    }

    pub fn submit(&self, request: AskRequest) -> Result<u64, JobError> {
        let mut worker_handle = self
            .worker_handle
            .lock()
            .expect("ask worker handle lock poisoned");
        let mut shared = self.shared.lock().expect("ask job state lock poisoned");

        if shared.state == AskJobState::Running {
            let active_job_id = shared.latest.as_ref().map_or(0, |update| update.job_id);
            debug!(active_job_id, "ask trigger ignored while a job is running");
            return Err(JobError::Busy { active_job_id });
        }

        let job_id = self.next_job_id.fetch_add(1, Ordering::SeqCst);
        let previous_state = shared.state;
        let previous_latest = shared.latest.clone();
        shared.record(AskJobUpdate::running(job_id));

        // The new worker blocks on `shared` until this lock is released, so its final update
        // always lands after the running one.
        let pipeline = self.pipeline.clone();
        let worker_shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(format!("screenask-ask-job-{job_id}"))
            .spawn(move || run_job(job_id, &pipeline, request, &worker_shared));

        let handle = match spawned {
            Ok(handle) => handle,
            Err(error) => {
                shared.updates.pop_back();
                shared.state = previous_state;
                shared.latest = previous_latest;
                return Err(JobError::Spawn {
                    message: error.to_string(),
                });
            }
        };
        drop(shared);

        info!(
            job_id,
            region = ?request.region.map(|region| region.to_string()),
            brief = request.brief,
            "ask job started"
        );
        if let Some(finished) = worker_handle.replace(handle) {
            let _ = finished.join();
        }
        Ok(job_id)
    }

    pub fn state(&self) -> AskJobState {
        self.shared
            .lock()
            .expect("ask job state lock poisoned")
            .state
    }

    pub fn latest_update(&self) -> Option<AskJobUpdate> {
        self.shared
            .lock()
            .expect("ask job state lock poisoned")
            .latest
            .clone()
    }

    pub fn drain_updates(&self) -> Vec<AskJobUpdate> {
        let mut shared = self.shared.lock().expect("ask job state lock poisoned");
        shared.updates.drain(..).collect()
    }
}

impl Drop for AskJobManager {
    fn drop(&mut self) {
        if let Some(handle) = self
            .worker_handle
            .lock()
            .expect("ask worker handle lock poisoned")
            .take()
        {
            let _ = handle.join();
        }
    }
}

#[derive(Default)]
struct SharedState {
    state: AskJobState,
    latest: Option<AskJobUpdate>,
    updates: VecDeque<AskJobUpdate>,
}

impl SharedState {
    fn record(&mut self, update: AskJobUpdate) {
        self.state = update.state;
        self.latest = Some(update.clone());
        self.updates.push_back(update);
    }
}

fn run_job(
    job_id: u64,
    pipeline: &AskPipeline,
    request: AskRequest,
    shared: &Arc<Mutex<SharedState>>,
) {
    let result = pipeline.run(&request);
    if let Err(error) = &result {
        warn!(job_id, error = %error, "ask job failed");
    }

    shared
        .lock()
        .expect("ask job state lock poisoned during update")
        .record(AskJobUpdate::finished(job_id, result));
}
