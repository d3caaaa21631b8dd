//! Per-event execution context.

use crate::store::WhiteBoard;

/// Opaque handle selecting the geometry conditions (e.g. an alignment epoch).
///
/// Geometry providers interpret the epoch; the algorithms only pass it on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GeometryContext {
    alignment_epoch: u64,
}

impl GeometryContext {
    /// Creates a context for the given alignment epoch.
    #[must_use]
    pub fn new(alignment_epoch: u64) -> Self {
        Self { alignment_epoch }
    }

    /// Returns the alignment epoch.
    #[must_use]
    pub fn alignment_epoch(&self) -> u64 {
        self.alignment_epoch
    }
}

/// Everything an algorithm needs to process one event.
#[derive(Debug)]
pub struct AlgorithmContext<'a> {
    /// Index of the algorithm within the sequence.
    pub algorithm_number: usize,
    /// Event number within the run.
    pub event_number: usize,
    /// Event-local store holding the named collections.
    pub event_store: &'a mut WhiteBoard,
    /// Geometry conditions for this event.
    pub geo_context: GeometryContext,
}

impl<'a> AlgorithmContext<'a> {
    /// Creates a context with nominal geometry conditions.
    pub fn new(
        algorithm_number: usize,
        event_number: usize,
        event_store: &'a mut WhiteBoard,
    ) -> Self {
        Self {
            algorithm_number,
            event_number,
            event_store,
            geo_context: GeometryContext::default(),
        }
    }

    /// Sets the geometry conditions.
    #[must_use]
    pub fn with_geo_context(mut self, geo_context: GeometryContext) -> Self {
        self.geo_context = geo_context;
        self
    }
}
