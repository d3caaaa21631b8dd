//! simdigi-core: Core types for geometry-indexed event processing.
//!
//! This crate provides the hierarchical geometry identifier, the flat sorted
//! multimaps used to store event data by geometry, simulated particles and
//! their barcodes, and the event store / algorithm seam used by the
//! digitization algorithms.
//!

pub mod algorithm;
pub mod barcode;
pub mod container;
pub mod context;
pub mod error;
pub mod geometry_id;
pub mod particle;
pub mod random;
pub mod store;
pub mod units;

pub use algorithm::{Algorithm, ProcessCode};
pub use barcode::{Barcode, BarcodeConfig, BarcodeSvc};
pub use container::{
    invert_index_multimap, FlatMultimap, GeometryIdMultimap, IndexMultimap, UnsortedInsert,
};
pub use context::{AlgorithmContext, GeometryContext};
pub use error::{ConfigError, Error, Result, StoreError};
pub use geometry_id::{GeoIdValue, GeometryField, GeometryId};
pub use particle::{PdgType, SimParticle, SimVertex};
pub use random::{derive_substream_seed, RandomEngine, RandomNumbers};
pub use store::WhiteBoard;

/// Event-unique hit index.
pub type HitId = usize;

/// Map hit indices to the barcodes of their truth particles.
///
/// A hit can have multiple underlying particles; all of them are found with
/// [`FlatMultimap::equal_range`].
pub type HitParticlesMap = IndexMultimap<Barcode, HitId>;
