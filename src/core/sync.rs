//! Synchronization hooks around the blocking transport calls.
//!
//! The transports never lock internally. Callers that drive a link
//! from several tasks install hooks that take and release an external
//! mutex immediately before and after each blocking operation.

/// Strategy object bracketing blocking reads and writes.
///
/// All methods default to no-ops; implement only the pairs the
/// component uses (the socket server only calls the write pair).
pub trait IoHooks: Send {
    /// Called immediately before a blocking receive.
    fn read_pre(&self) {}

    /// Called immediately after a blocking receive returns.
    fn read_post(&self) {}

    /// Called immediately before a blocking send.
    fn write_pre(&self) {}

    /// Called immediately after a blocking send returns.
    fn write_post(&self) {}
}

/// Default hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl IoHooks for NoopHooks {}
