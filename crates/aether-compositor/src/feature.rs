//! Registers the sky atmosphere pass with the host for each camera.

use aether_atmosphere::AtmosphereParameters;

use crate::pass::{PassSettings, SkyAtmospherePass};
use crate::program::ProgramLibrary;
use crate::queue::PassQueue;

/// Owns the sky atmosphere pass and decides per camera whether it runs.
#[derive(Debug)]
pub struct SkyAtmosphereFeature {
    pass: SkyAtmospherePass,
}

impl SkyAtmosphereFeature {
    /// Build the feature and resolve its programs once.
    pub fn create(settings: PassSettings, library: &ProgramLibrary) -> Self {
        tracing::info!(
            label = %settings.profiler_label,
            injection_point = ?settings.injection_point,
            dispatch = ?settings.dispatch,
            "created sky atmosphere feature"
        );
        Self {
            pass: SkyAtmospherePass::new(settings, library),
        }
    }

    /// Enqueue the pass for the current camera.
    ///
    /// `resolved` is the atmosphere settings the host resolved for this
    /// camera. Nothing is enqueued when they are missing or disabled, or when
    /// the pass could not resolve its program. Returns whether the pass was
    /// enqueued.
    pub fn add_passes<'a>(
        &'a mut self,
        queue: &mut PassQueue<'a>,
        resolved: Option<&AtmosphereParameters>,
    ) -> bool {
        let Some(params) = resolved.filter(|params| params.is_active()) else {
            return false;
        };
        if !self.pass.is_operational() {
            return false;
        }
        self.pass.setup(*params);
        queue.enqueue(&mut self.pass);
        true
    }
}
