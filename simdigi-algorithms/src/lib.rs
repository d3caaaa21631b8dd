//! simdigi-algorithms: Digitization algorithms for simulated hits.
//!
//! This crate provides:
//! - **Projection** of global hit kinematics into module frames
//! - **Stepping** of straight tracks through segmented planar modules
//! - **Cluster building** with path-length weighted centroids and Lorentz drift
//! - **Digitization** of sorted hit collections into planar module clusters
//! - **Hit smearing** into two-dimensional source links
//! - **Particle selection** by production point and kinematics
//!
#![warn(missing_docs)]

mod cluster;
mod digitization;
mod options;
mod projector;
mod selector;
mod smearing;
mod stepper;

pub use cluster::{
    build_cluster, centroid, cluster_covariance, lorentz_shift, Identifier, PlanarModuleCluster,
    LOCAL_VARIANCE, TIME_VARIANCE,
};
pub use digitization::{DigitizationAlgorithm, DigitizationConfig, PlanarModuleClusters};
pub use options::{DigitizationOptions, SmearingOptions};
pub use projector::{to_local, LocalHit};
pub use selector::{ParticleSelector, ParticleSelectorConfig};
pub use smearing::{HitSmearing, HitSmearingConfig, SimSourceLink, SimSourceLinkContainer};
pub use stepper::{DigitizationStep, ModuleStepper, PlanarModuleStepper};

// Re-export the geometry cell type used by clusters and steps
pub use simdigi_geometry::DigitizationCell;
