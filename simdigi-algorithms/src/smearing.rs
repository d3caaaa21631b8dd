//! Gaussian smearing of simulated hits into two-dimensional measurements.

use std::sync::Arc;

use glam::{DMat2, DVec2};
use log::{debug, error};
use rand::Rng;
use rand_distr::StandardNormal;
use simdigi_core::units::UM;
use simdigi_core::{
    Algorithm, AlgorithmContext, ConfigError, GeometryContext, GeometryId, GeometryIdMultimap,
    HitId, ProcessCode, RandomNumbers, Result, UnsortedInsert,
};
use simdigi_geometry::{SimHit, SimHits, Surface};

use crate::projector::to_local;

/// Smeared local measurement linked to the simulated hit it came from.
#[derive(Clone, Debug)]
pub struct SimSourceLink {
    /// Index of the truth hit in the input collection.
    pub hit_index: HitId,
    /// Module the hit was recorded on.
    pub geometry_id: GeometryId,
    /// Reference surface of the measurement.
    pub surface: Arc<Surface>,
    /// Smeared local position (loc0, loc1).
    pub values: DVec2,
    /// Covariance of the local position.
    pub covariance: DMat2,
}

// Links are equal if they refer to the same truth hit.
impl PartialEq for SimSourceLink {
    fn eq(&self, other: &Self) -> bool {
        self.hit_index == other.hit_index && self.geometry_id == other.geometry_id
    }
}

/// Source links of one event keyed by module geometry id.
pub type SimSourceLinkContainer = GeometryIdMultimap<SimSourceLink>;

/// Hit smearing configuration.
#[derive(Clone, Debug)]
pub struct HitSmearingConfig {
    /// Input collection of simulated hits.
    pub input_sim_hits: String,
    /// Output collection of source links.
    pub output_source_links: String,
    /// Resolution along loc0.
    pub sigma_loc0: f64,
    /// Resolution along loc1.
    pub sigma_loc1: f64,
    /// Random number service.
    pub random_numbers: Option<Arc<RandomNumbers>>,
}

impl Default for HitSmearingConfig {
    fn default() -> Self {
        Self {
            input_sim_hits: String::new(),
            output_source_links: "sourcelinks".to_string(),
            sigma_loc0: 25.0 * UM,
            sigma_loc1: 100.0 * UM,
            random_numbers: None,
        }
    }
}

impl HitSmearingConfig {
    /// Create with input and output collection names.
    #[must_use]
    pub fn new(input_sim_hits: impl Into<String>, output_source_links: impl Into<String>) -> Self {
        Self {
            input_sim_hits: input_sim_hits.into(),
            output_source_links: output_source_links.into(),
            ..Self::default()
        }
    }

    /// Set both resolutions.
    #[must_use]
    pub fn with_resolution(mut self, sigma_loc0: f64, sigma_loc1: f64) -> Self {
        self.sigma_loc0 = sigma_loc0;
        self.sigma_loc1 = sigma_loc1;
        self
    }

    /// Set the random number service.
    #[must_use]
    pub fn with_random_numbers(mut self, random_numbers: Arc<RandomNumbers>) -> Self {
        self.random_numbers = Some(random_numbers);
        self
    }
}

/// Creates source links by smearing the truth local position of each hit.
#[derive(Debug)]
pub struct HitSmearing {
    config: HitSmearingConfig,
    random_numbers: Arc<RandomNumbers>,
}

impl HitSmearing {
    /// Validates the configuration and builds the algorithm.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] for an empty collection name, a negative
    /// resolution or a missing random number service.
    pub fn new(config: HitSmearingConfig) -> std::result::Result<Self, ConfigError> {
        if config.input_sim_hits.is_empty() {
            return Err(ConfigError::MissingInput("simulated hits"));
        }
        if config.output_source_links.is_empty() {
            return Err(ConfigError::MissingOutput("source links"));
        }
        for (name, sigma) in [
            ("sigma_loc0", config.sigma_loc0),
            ("sigma_loc1", config.sigma_loc1),
        ] {
            if !(sigma >= 0.0) {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: format!("resolution must be non-negative, got {sigma}"),
                });
            }
        }
        let random_numbers = config
            .random_numbers
            .clone()
            .ok_or(ConfigError::MissingCollaborator("random number service"))?;
        Ok(Self {
            config,
            random_numbers,
        })
    }

    /// The validated configuration.
    #[must_use]
    pub fn config(&self) -> &HitSmearingConfig {
        &self.config
    }

    /// Smears the entries in order, stopping at the first key that breaks
    /// the ordering.
    fn smear<'a, I, R>(
        &self,
        gctx: &GeometryContext,
        rng: &mut R,
        entries: I,
    ) -> std::result::Result<SimSourceLinkContainer, UnsortedInsert<GeometryId, SimSourceLink>>
    where
        I: IntoIterator<Item = &'a (GeometryId, SimHit)>,
        R: Rng,
    {
        let covariance = self.covariance();
        let sigma = DVec2::new(self.config.sigma_loc0, self.config.sigma_loc1);
        let entries = entries.into_iter();
        let mut links = SimSourceLinkContainer::with_capacity(entries.size_hint().0);
        for (hit_index, (id, hit)) in entries.enumerate() {
            let local = to_local(hit.surface(), gctx, hit.position(), hit.direction());
            let noise = DVec2::new(rng.sample(StandardNormal), rng.sample(StandardNormal));
            let link = SimSourceLink {
                hit_index,
                geometry_id: *id,
                surface: Arc::clone(hit.surface()),
                values: local.position + sigma * noise,
                covariance,
            };
            links.insert_sorted_end(*id, link)?;
        }
        Ok(links)
    }

    fn covariance(&self) -> DMat2 {
        DMat2::from_diagonal(DVec2::new(
            self.config.sigma_loc0 * self.config.sigma_loc0,
            self.config.sigma_loc1 * self.config.sigma_loc1,
        ))
    }
}

impl Algorithm for HitSmearing {
    fn name(&self) -> &str {
        "HitSmearing"
    }

    fn execute(&self, ctx: &mut AlgorithmContext<'_>) -> Result<ProcessCode> {
        let mut rng = self.random_numbers.spawn_generator(ctx);
        let smeared = {
            let hits: &SimHits = ctx.event_store.get(&self.config.input_sim_hits)?;
            self.smear(&ctx.geo_context, &mut rng, hits)
        };
        let links = match smeared {
            Ok(links) => links,
            Err(rejected) => {
                error!(
                    "event {}: hit ordering broke at {} after {}",
                    ctx.event_number, rejected.key, rejected.last
                );
                return Ok(ProcessCode::Abort);
            }
        };

        debug!("event {}: {} source links", ctx.event_number, links.len());
        ctx.event_store
            .add(self.config.output_source_links.clone(), links)?;
        Ok(ProcessCode::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DVec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use simdigi_core::WhiteBoard;
    use simdigi_geometry::{sim_hits_from_unsorted, Transform3};

    fn config() -> HitSmearingConfig {
        HitSmearingConfig::new("hits", "sourcelinks")
            .with_resolution(0.01, 0.05)
            .with_random_numbers(Arc::new(RandomNumbers::new(7)))
    }

    fn hits() -> SimHits {
        sim_hits_from_unsorted((0u32..3).map(|i| {
            let z = 10.0 * f64::from(i + 1);
            let surface = Arc::new(Surface::new(
                GeometryId::sensitive_module(1, 2, u64::from(i + 1)),
                Transform3::from_translation(DVec3::new(0.0, 0.0, z)),
            ));
            SimHit::new(
                surface,
                DVec3::new(0.1 * f64::from(i), -0.2, z),
                DVec3::Z,
                1.0,
                0.0,
                u64::from(i),
            )
        }))
    }

    fn run(algorithm: &HitSmearing, event: usize) -> SimSourceLinkContainer {
        let mut store = WhiteBoard::new();
        store.add("hits", hits()).unwrap();
        let mut ctx = AlgorithmContext::new(0, event, &mut store);
        assert_eq!(algorithm.execute(&mut ctx).unwrap(), ProcessCode::Success);
        store
            .get::<SimSourceLinkContainer>("sourcelinks")
            .unwrap()
            .clone()
    }

    #[test]
    fn test_construction_validation() {
        assert!(HitSmearing::new(config()).is_ok());
        assert!(matches!(
            HitSmearing::new(config().with_resolution(-1.0, 0.1)),
            Err(ConfigError::InvalidParameter { name: "sigma_loc0", .. })
        ));
        assert!(matches!(
            HitSmearing::new(config().with_resolution(0.1, f64::NAN)),
            Err(ConfigError::InvalidParameter { name: "sigma_loc1", .. })
        ));
        let mut no_rng = config();
        no_rng.random_numbers = None;
        assert!(matches!(
            HitSmearing::new(no_rng),
            Err(ConfigError::MissingCollaborator(_))
        ));
        let mut no_input = config();
        no_input.input_sim_hits.clear();
        assert!(matches!(
            HitSmearing::new(no_input),
            Err(ConfigError::MissingInput(_))
        ));
    }

    #[test]
    fn test_links_follow_hit_order() {
        let algorithm = HitSmearing::new(config()).unwrap();
        let links = run(&algorithm, 0);
        assert_eq!(links.len(), 3);
        assert!(links.is_sorted());
        let indices: Vec<HitId> = links.values().map(|l| l.hit_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        let cov = links.values().next().unwrap().covariance;
        assert_relative_eq!(cov.x_axis.x, 1e-4);
        assert_relative_eq!(cov.y_axis.y, 2.5e-3);
    }

    #[test]
    fn test_zero_resolution_is_truth() {
        let algorithm = HitSmearing::new(config().with_resolution(0.0, 0.0)).unwrap();
        let links = run(&algorithm, 3);
        for (i, link) in (0u32..).zip(links.values()) {
            assert_relative_eq!(link.values.x, 0.1 * f64::from(i), epsilon = 1e-12);
            assert_relative_eq!(link.values.y, -0.2, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_unsorted_entries_stop_smearing() {
        let algorithm = HitSmearing::new(config()).unwrap();
        let mut entries = hits().into_vec();
        entries.swap(0, 2);
        let mut rng = StdRng::seed_from_u64(7);
        let rejected = algorithm
            .smear(&GeometryContext::default(), &mut rng, &entries)
            .unwrap_err();
        assert_eq!(rejected.last, GeometryId::sensitive_module(1, 2, 3));
        assert_eq!(rejected.key, GeometryId::sensitive_module(1, 2, 2));
        assert_eq!(rejected.value.hit_index, 1);
    }

    #[test]
    fn test_reproducible_per_event() {
        let algorithm = HitSmearing::new(config()).unwrap();
        let a = run(&algorithm, 5);
        let b = run(&algorithm, 5);
        let c = run(&algorithm, 6);
        let values = |links: &SimSourceLinkContainer| -> Vec<DVec2> {
            links.values().map(|l| l.values).collect()
        };
        assert_eq!(values(&a), values(&b));
        assert_ne!(values(&a), values(&c));
    }
}
