mod ask_job_manager;
mod ask_pipeline;

pub use ask_job_manager::{AskJobManager, AskJobState, AskJobUpdate, JobError};
pub use ask_pipeline::{AskError, AskOutcome, AskPipeline, AskRequest};
