//! Algorithm seam between event-processing code and the surrounding sequencer.

use crate::context::AlgorithmContext;
use crate::error::Result;

/// Outcome of processing one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessCode {
    /// The event was processed, outputs are in the store.
    Success,
    /// Processing of this event was aborted, no outputs were published.
    Abort,
    /// Request to stop processing further events.
    End,
}

/// Event-processing algorithm.
///
/// Implementations hold only immutable configuration, so a single instance
/// can run on many events concurrently. All per-event state lives inside
/// [`Algorithm::execute`].
pub trait Algorithm: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Processes one event.
    ///
    /// Errors (e.g. a missing input collection) abort this event for this
    /// algorithm and are reported to the caller.
    fn execute(&self, ctx: &mut AlgorithmContext<'_>) -> Result<ProcessCode>;
}
