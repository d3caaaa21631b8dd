//! Digitization of simulated hits into planar module clusters.
//!
//! For every hit on a digitizable module the track is stepped through the
//! sensor, the cells are combined into a path-length weighted centroid with
//! the Lorentz drift applied, and the resulting cluster is stored under the
//! geometry id of the module. Input hits are sorted by geometry id, so the
//! clusters are appended in order.

use std::sync::Arc;

use log::{debug, trace, warn};
use simdigi_core::{
    Algorithm, AlgorithmContext, ConfigError, GeometryContext, GeometryId, GeometryIdMultimap,
    ProcessCode, RandomNumbers, Result, UnsortedInsert,
};
use simdigi_geometry::{DetectorElement, SimHit, SimHits};

use crate::cluster::{build_cluster, Identifier, PlanarModuleCluster};
use crate::projector::to_local;
use crate::stepper::ModuleStepper;

/// Clusters of one event keyed by module geometry id.
pub type PlanarModuleClusters = GeometryIdMultimap<PlanarModuleCluster>;

/// Digitization configuration.
#[derive(Clone, Debug)]
pub struct DigitizationConfig {
    /// Input collection of simulated hits.
    pub input_sim_hits: String,
    /// Output collection of clusters.
    pub output_clusters: String,
    /// Stepper computing the cells crossed in a module.
    pub planar_module_stepper: Option<Arc<dyn ModuleStepper>>,
    /// Random number service.
    pub random_numbers: Option<Arc<RandomNumbers>>,
}

impl Default for DigitizationConfig {
    fn default() -> Self {
        Self {
            input_sim_hits: String::new(),
            output_clusters: "clusters".to_string(),
            planar_module_stepper: None,
            random_numbers: None,
        }
    }
}

impl DigitizationConfig {
    /// Create with input and output collection names.
    #[must_use]
    pub fn new(input_sim_hits: impl Into<String>, output_clusters: impl Into<String>) -> Self {
        Self {
            input_sim_hits: input_sim_hits.into(),
            output_clusters: output_clusters.into(),
            ..Self::default()
        }
    }

    /// Set the module stepper.
    #[must_use]
    pub fn with_stepper(mut self, stepper: Arc<dyn ModuleStepper>) -> Self {
        self.planar_module_stepper = Some(stepper);
        self
    }

    /// Set the random number service.
    #[must_use]
    pub fn with_random_numbers(mut self, random_numbers: Arc<RandomNumbers>) -> Self {
        self.random_numbers = Some(random_numbers);
        self
    }
}

/// Turns simulated hits into planar module clusters.
#[derive(Debug)]
pub struct DigitizationAlgorithm {
    config: DigitizationConfig,
    stepper: Arc<dyn ModuleStepper>,
}

impl DigitizationAlgorithm {
    /// Validates the configuration and builds the algorithm.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] for an empty collection name or a missing
    /// stepper or random number service.
    pub fn new(config: DigitizationConfig) -> std::result::Result<Self, ConfigError> {
        if config.input_sim_hits.is_empty() {
            return Err(ConfigError::MissingInput("simulated hits"));
        }
        if config.output_clusters.is_empty() {
            return Err(ConfigError::MissingOutput("clusters"));
        }
        let stepper = config
            .planar_module_stepper
            .clone()
            .ok_or(ConfigError::MissingCollaborator("planar module stepper"))?;
        if config.random_numbers.is_none() {
            return Err(ConfigError::MissingCollaborator("random number service"));
        }
        Ok(Self { config, stepper })
    }

    /// The validated configuration.
    #[must_use]
    pub fn config(&self) -> &DigitizationConfig {
        &self.config
    }

    /// Digitizes the hits of one event.
    ///
    /// Hits without a digitizable module or without any cell steps are
    /// skipped.
    #[must_use]
    pub fn digitize(&self, gctx: &GeometryContext, hits: &SimHits) -> PlanarModuleClusters {
        self.digitize_entries(gctx, hits)
    }

    fn digitize_entries<'a, I>(&self, gctx: &GeometryContext, entries: I) -> PlanarModuleClusters
    where
        I: IntoIterator<Item = &'a (GeometryId, SimHit)>,
    {
        let entries = entries.into_iter();
        let mut clusters = PlanarModuleClusters::with_capacity(entries.size_hint().0);
        for (id, hit) in entries {
            let surface = hit.surface();
            // Only identified detector elements carry a digitization module.
            let Some(element) = surface
                .associated_detector_element()
                .and_then(DetectorElement::as_identified)
            else {
                trace!("no identified detector element on {id}, hit skipped");
                continue;
            };
            let Some(module) = element.digitization_module() else {
                trace!("no digitization module on {id}, hit skipped");
                continue;
            };

            let local = to_local(surface, gctx, hit.position(), hit.direction());
            let steps = self
                .stepper
                .cell_steps(gctx, module, local.position, local.direction);
            let identifier = Identifier::new(id.value(), vec![hit.particle()]);
            let Some(cluster) = build_cluster(
                Arc::clone(surface),
                module,
                element.thickness(),
                identifier,
                hit.time(),
                &steps,
            ) else {
                trace!("no cell steps for hit on {id} at {}", local.position);
                continue;
            };

            if let Err(UnsortedInsert { last, key, value }) =
                clusters.insert_sorted_end(*id, cluster)
            {
                warn!("hit on {key} follows {last}, input hits are not sorted");
                clusters.insert(key, value);
            }
        }
        clusters
    }
}

impl Algorithm for DigitizationAlgorithm {
    fn name(&self) -> &str {
        "DigitizationAlgorithm"
    }

    fn execute(&self, ctx: &mut AlgorithmContext<'_>) -> Result<ProcessCode> {
        let (clusters, n_hits) = {
            let hits: &SimHits = ctx.event_store.get(&self.config.input_sim_hits)?;
            (self.digitize(&ctx.geo_context, hits), hits.len())
        };
        debug!(
            "event {}: {} clusters from {} hits",
            ctx.event_number,
            clusters.len(),
            n_hits
        );
        ctx.event_store
            .add(self.config.output_clusters.clone(), clusters)?;
        Ok(ProcessCode::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stepper::PlanarModuleStepper;
    use glam::DVec3;
    use simdigi_core::WhiteBoard;
    use simdigi_geometry::{
        CartesianSegmentation, DigitizationModule, PassiveDetectorElement, PlanarDetectorElement,
        Surface, Transform3,
    };

    fn config() -> DigitizationConfig {
        DigitizationConfig::new("hits", "clusters")
            .with_stepper(Arc::new(PlanarModuleStepper::new()))
            .with_random_numbers(Arc::new(RandomNumbers::new(1)))
    }

    fn digitized_surface(sensitive: u64) -> Arc<Surface> {
        let id = GeometryId::sensitive_module(1, 2, sensitive);
        let seg = CartesianSegmentation::new(2, 2, 1.0, 1.0).unwrap();
        let module = DigitizationModule::new(seg, 0.25, 1, 0.0).unwrap();
        let element = PlanarDetectorElement::new(id.value(), Transform3::identity(), 0.5)
            .with_module(Arc::new(module));
        Arc::new(Surface::from_element(id, Arc::new(element)))
    }

    #[test]
    fn test_construction_validation() {
        assert!(DigitizationAlgorithm::new(config()).is_ok());

        let mut empty_input = config();
        empty_input.input_sim_hits.clear();
        assert_eq!(
            DigitizationAlgorithm::new(empty_input).unwrap_err(),
            ConfigError::MissingInput("simulated hits")
        );

        let mut empty_output = config();
        empty_output.output_clusters.clear();
        assert!(matches!(
            DigitizationAlgorithm::new(empty_output),
            Err(ConfigError::MissingOutput(_))
        ));

        let mut no_stepper = config();
        no_stepper.planar_module_stepper = None;
        assert_eq!(
            DigitizationAlgorithm::new(no_stepper).unwrap_err(),
            ConfigError::MissingCollaborator("planar module stepper")
        );

        let mut no_rng = config();
        no_rng.random_numbers = None;
        assert!(matches!(
            DigitizationAlgorithm::new(no_rng),
            Err(ConfigError::MissingCollaborator("random number service"))
        ));
    }

    #[test]
    fn test_skips_non_digitizable_surfaces() {
        let algorithm = DigitizationAlgorithm::new(config()).unwrap();
        let passive_id = GeometryId::sensitive_module(1, 2, 1);
        let passive = Arc::new(Surface::from_element(
            passive_id,
            Arc::new(PassiveDetectorElement::new(Transform3::identity(), 1.0)),
        ));
        let bare = Arc::new(Surface::new(
            GeometryId::sensitive_module(1, 2, 2),
            Transform3::identity(),
        ));
        let sensitive = digitized_surface(3);

        let hits = simdigi_geometry::sim_hits_from_unsorted([
            SimHit::new(passive, DVec3::ZERO, DVec3::Z, 1.0, 0.0, 1),
            SimHit::new(bare, DVec3::ZERO, DVec3::Z, 1.0, 0.0, 2),
            SimHit::new(sensitive, DVec3::ZERO, DVec3::Z, 1.0, 0.0, 3),
        ]);
        let clusters = algorithm.digitize(&GeometryContext::default(), &hits);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters.keys().next().unwrap().sensitive(), 3);
    }

    #[test]
    fn test_unsorted_entries_are_reordered() {
        let algorithm = DigitizationAlgorithm::new(config()).unwrap();
        let entries: Vec<(GeometryId, SimHit)> = [3, 1, 2, 1]
            .into_iter()
            .enumerate()
            .map(|(n, sensitive)| {
                let surface = digitized_surface(sensitive);
                let id = surface.geometry_id();
                (
                    id,
                    SimHit::new(surface, DVec3::ZERO, DVec3::Z, 1.0, 0.0, n as u64),
                )
            })
            .collect();

        let clusters = algorithm.digitize_entries(&GeometryContext::default(), &entries);
        assert_eq!(clusters.len(), 4);
        assert!(clusters.is_sorted());
        let particles: Vec<u64> = clusters
            .values()
            .map(|c| c.identifier.truth_particles[0])
            .collect();
        assert_eq!(particles, vec![1, 3, 2, 0]);
    }

    #[test]
    fn test_missing_input_aborts_event() {
        let algorithm = DigitizationAlgorithm::new(config()).unwrap();
        let mut store = WhiteBoard::new();
        let mut ctx = AlgorithmContext::new(0, 0, &mut store);
        let err = algorithm.execute(&mut ctx).unwrap_err();
        assert!(matches!(
            err,
            simdigi_core::Error::Store(simdigi_core::StoreError::Missing(_))
        ));
        assert!(!store.exists("clusters"));
    }
}
