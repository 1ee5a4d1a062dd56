//! Consumer coordination around the copy window.

use tracing::debug;

/// Capability to halt and restart the host's message consumers.
///
/// The engine pauses consumers before touching the destination and resumes
/// them on every path out of the copy window, so nothing else mutates the
/// destination (or observes it half-populated) while the copy is in flight.
pub trait ConsumerRegistry: Send + Sync {
    /// Stop all consumers.
    fn pause(&self);

    /// Restart all consumers.
    fn resume(&self);
}

/// Registry for hosts without a consumer system.
pub struct NoopConsumerRegistry;

impl ConsumerRegistry for NoopConsumerRegistry {
    fn pause(&self) {
        debug!("No consumer registry configured, nothing to pause");
    }

    fn resume(&self) {
        debug!("No consumer registry configured, nothing to resume");
    }
}
