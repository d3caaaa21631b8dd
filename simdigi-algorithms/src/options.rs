//! User-facing options for the digitization algorithms.
//!
//! Options hold plain values only and are turned into algorithm
//! configurations once the shared services are available.

use std::sync::Arc;

use simdigi_core::units::UM;
use simdigi_core::RandomNumbers;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::digitization::DigitizationConfig;
use crate::smearing::HitSmearingConfig;
use crate::stepper::ModuleStepper;

/// Digitization options.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DigitizationOptions {
    /// Collection name of the produced clusters.
    pub clusters: String,
    /// Collection name of the space points built from the clusters.
    pub space_points: String,
}

impl Default for DigitizationOptions {
    fn default() -> Self {
        Self {
            clusters: "clusters".to_string(),
            space_points: "space-points".to_string(),
        }
    }
}

impl DigitizationOptions {
    /// Builds the digitization configuration reading `input_sim_hits`.
    #[must_use]
    pub fn to_config(
        &self,
        input_sim_hits: impl Into<String>,
        stepper: Arc<dyn ModuleStepper>,
        random_numbers: Arc<RandomNumbers>,
    ) -> DigitizationConfig {
        DigitizationConfig::new(input_sim_hits, self.clusters.clone())
            .with_stepper(stepper)
            .with_random_numbers(random_numbers)
    }
}

/// Hit smearing options.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SmearingOptions {
    /// Collection name of the produced source links.
    pub source_links: String,
    /// Resolution along loc0 (mm).
    pub sigma_loc0: f64,
    /// Resolution along loc1 (mm).
    pub sigma_loc1: f64,
}

impl Default for SmearingOptions {
    fn default() -> Self {
        Self {
            source_links: "sourcelinks".to_string(),
            sigma_loc0: 25.0 * UM,
            sigma_loc1: 100.0 * UM,
        }
    }
}

impl SmearingOptions {
    /// Builds the smearing configuration reading `input_sim_hits`.
    #[must_use]
    pub fn to_config(
        &self,
        input_sim_hits: impl Into<String>,
        random_numbers: Arc<RandomNumbers>,
    ) -> HitSmearingConfig {
        HitSmearingConfig::new(input_sim_hits, self.source_links.clone())
            .with_resolution(self.sigma_loc0, self.sigma_loc1)
            .with_random_numbers(random_numbers)
    }
}
