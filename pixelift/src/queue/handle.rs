//! Job handle for status queries.
//!
//! The [`JobHandle`] is returned when a job is submitted to the queue.
//! It provides methods to query the job's status and wait for the
//! terminal state. Progress updates travel separately through the event
//! sink; the handle only tracks the state machine.
//!
//! # Example
//!
//! ```ignore
//! use pixelift::queue::{JobQueue, JobStatus};
//!
//! let mut handle = queue.submit(request)?;
//!
//! // Check status without waiting
//! if handle.status() == JobStatus::Processing {
//!     println!("Job is running");
//! }
//!
//! // Wait for completion
//! let final_status = handle.wait().await;
//! ```

use super::job::{JobId, JobStatus};
use tokio::sync::watch;

/// Handle to a submitted job.
///
/// This handle is cloneable and can be shared across tasks. All clones
/// refer to the same underlying job.
#[derive(Clone)]
pub struct JobHandle {
    job_id: JobId,
    status_rx: watch::Receiver<JobStatus>,
}

impl JobHandle {
    /// Creates a new job handle.
    ///
    /// This is called by the queue when a job is submitted.
    pub(crate) fn new(job_id: JobId, status_rx: watch::Receiver<JobStatus>) -> Self {
        Self { job_id, status_rx }
    }

    /// Returns the job's unique identifier.
    pub fn id(&self) -> &JobId {
        &self.job_id
    }

    /// Returns the current job status.
    ///
    /// This is a non-blocking operation that returns the most recent status.
    pub fn status(&self) -> JobStatus {
        *self.status_rx.borrow()
    }

    /// Returns true once the job has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// Waits for the job to reach a terminal state and returns it.
    pub async fn wait(&mut self) -> JobStatus {
        loop {
            if self.status().is_terminal() {
                break;
            }
            // Wait for status change
            if self.status_rx.changed().await.is_err() {
                // Channel closed - last observed status is final
                break;
            }
        }
        self.status()
    }
}

impl std::fmt::Debug for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobHandle")
            .field("job_id", &self.job_id)
            .field("status", &self.status())
            .finish()
    }
}
