//! Host reachability check run before detection.
//!
//! When the host itself is down every `ls-remote` fails, and every tracked
//! repository would look unreachable and be soft-deleted. The runner refuses
//! to start detection unless the host answers.

mod error;
mod http;

pub use error::HealthError;
pub use http::{HttpHostCheck, DEFAULT_HOST_CHECK_TIMEOUT};

use crate::registry::Host;
use async_trait::async_trait;

/// Verifies that a host is up before its repositories are queried.
#[async_trait]
pub trait HostCheck: Send + Sync {
    /// Returns `Ok(())` if the host answers.
    async fn check(&self, host: &Host) -> Result<(), HealthError>;
}
