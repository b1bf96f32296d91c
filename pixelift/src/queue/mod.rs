//! Single-flight job queue with simulated progress.
//!
//! The remote upscale service accepts one request per user at a time, so
//! the queue processes jobs strictly one by one: the active job runs, any
//! further submissions wait in FIFO order, and the next job starts the
//! moment the active one reaches a terminal state.
//!
//! # Architecture
//!
//! ```text
//! submit() ──▶ pending (FIFO) ──▶ driver task ──▶ Completed / Failed
//!                                   │
//!                                   ├── progress ticker (simulated)
//!                                   └── remote upscale call
//! ```
//!
//! Each dispatched job gets one driver task and one ticker task, both
//! wired to a per-job [`CancellationToken`]. The ticker animates
//! progress and counts the ETA down while the remote call is in flight;
//! whichever way the job ends, the token stops the ticker.
//!
//! # Lifecycle
//!
//! Jobs move `Pending → Processing → {Completed, Failed}`. Cancellation
//! is only valid while processing and lands the job in `Failed` with a
//! fixed reason; completion side effects (history record, usage
//! increment) happen exactly once, guarded by the state machine.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

mod core;
mod handle;
mod job;
mod progress;

pub use core::{CancelError, JobQueue, SubmitError};
pub use handle::JobHandle;
pub use job::{JobId, JobRequest, JobStatus, ProcessingPhase, UpscaleJob, CANCELLED_REASON};
pub use progress::{initial_eta_seconds, QueueSettings};
