//! Remote collaborator seams.
//!
//! The core delegates two concerns over the network: the actual upscaling
//! computation ([`UpscaleClient`]) and per-user usage accounting
//! ([`UsageTracker`]). Both are traits so the queue and service can be
//! exercised against in-process implementations; [`HttpApiClient`] is the
//! production implementation and [`OfflineUpscaleClient`] a canned one for
//! demos and tests.
//!
//! The core never retries a failed call. A transport error, a timeout, or
//! a `success = false` response all surface as one failed job.

mod http;
mod offline;
mod types;

pub use http::HttpApiClient;
pub use offline::OfflineUpscaleClient;
pub use types::{
    Dimensions, RemoteError, UpscaleClient, UpscaleRequest, UpscaleResponse, UsageStats,
    UsageTracker,
};

#[cfg(test)]
mod mock;
#[cfg(test)]
pub(crate) use mock::MockRemote;
