//! The sky atmosphere pass: snapshots the camera color, composites the
//! atmosphere over it, and blits the result back.

use std::sync::Arc;

use aether_atmosphere::{AtmosphereParameters, AtmosphereUniform, PlanetGeometry};
use serde::{Deserialize, Serialize};

use crate::dispatch::{DispatchStrategy, Kernel, run_full_screen, run_tiled};
use crate::error::CompositorError;
use crate::frame::FrameContext;
use crate::program::{
    Program, ProgramError, ProgramLibrary, SKY_ATMOSPHERE_COMPUTE_PROGRAM, SKY_ATMOSPHERE_GROUP_SIZE,
    SKY_ATMOSPHERE_KERNEL, SKY_ATMOSPHERE_PROGRAM,
};
use crate::queue::{CameraTarget, InjectionPoint, RenderPass};
use crate::target_pool::{TargetDescriptor, TargetPool};

/// Temporary holding the snapshot of the camera color.
pub const SOURCE_TARGET: &str = "_Source_RT";
/// Temporary receiving the composited atmosphere.
pub const ATMOSPHERE_TARGET: &str = "Sky_Atmosphere_RT";

/// Host-facing configuration of the pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PassSettings {
    /// Name of the profiling scope wrapped around each execution.
    pub profiler_label: String,
    /// Full-screen program to resolve from the library.
    pub shader_program: Option<String>,
    /// Compute program to resolve from the library.
    pub compute_program: Option<String>,
    pub injection_point: InjectionPoint,
    pub dispatch: DispatchStrategy,
    /// Tile workers for [`DispatchStrategy::Tiled`]. 0 means one per logical CPU.
    pub worker_threads: usize,
}

impl Default for PassSettings {
    fn default() -> Self {
        Self {
            profiler_label: "Sky Atmosphere Pass".to_string(),
            shader_program: Some(SKY_ATMOSPHERE_PROGRAM.to_string()),
            compute_program: Some(SKY_ATMOSPHERE_COMPUTE_PROGRAM.to_string()),
            injection_point: InjectionPoint::default(),
            dispatch: DispatchStrategy::default(),
            worker_threads: 0,
        }
    }
}

/// Why a pass did no work this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The program for the configured strategy failed to resolve.
    NotOperational,
    /// Nothing was handed to [`SkyAtmospherePass::setup`] for this camera.
    NoParameters,
    /// The resolved settings have the effect turned off.
    Disabled,
    /// The camera target has no pixels.
    EmptyTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Composited,
    Skipped(SkipReason),
}

/// Composites the single-scattering sky over the camera color.
#[derive(Debug)]
pub struct SkyAtmospherePass {
    settings: PassSettings,
    full_screen: Option<Arc<Program>>,
    compute: Option<Arc<Program>>,
    params: Option<AtmosphereParameters>,
}

impl SkyAtmospherePass {
    /// Resolve the configured programs. A program that cannot be resolved is
    /// reported here once and never looked up again. Only the program the
    /// configured strategy dispatches is an error; the other is a warning.
    pub fn new(settings: PassSettings, library: &ProgramLibrary) -> Self {
        let tiled = settings.dispatch == DispatchStrategy::Tiled;
        let full_screen = resolve_program(
            "shading",
            settings.shader_program.as_deref(),
            !tiled,
            |name| library.resolve_full_screen(name),
        );
        let compute = resolve_program(
            "compute",
            settings.compute_program.as_deref(),
            tiled,
            |name| library.resolve_compute(name, SKY_ATMOSPHERE_KERNEL),
        );

        let pass = Self {
            settings,
            full_screen,
            compute,
            params: None,
        };
        if !pass.is_operational() {
            tracing::error!(
                dispatch = ?pass.settings.dispatch,
                "sky atmosphere pass disabled: required program missing"
            );
        }
        pass
    }

    /// Whether the program needed by the configured strategy resolved.
    pub fn is_operational(&self) -> bool {
        match self.settings.dispatch {
            DispatchStrategy::FullScreen => self.full_screen.is_some(),
            DispatchStrategy::Tiled => self.compute.is_some(),
        }
    }

    /// Hand over this camera's resolved settings. They are consumed by the
    /// next [`RenderPass::execute`].
    pub fn setup(&mut self, params: AtmosphereParameters) {
        self.params = Some(params);
    }

    fn group_size(&self) -> (u32, u32) {
        self.compute
            .as_ref()
            .and_then(|program| program.group_size())
            .unwrap_or(SKY_ATMOSPHERE_GROUP_SIZE)
    }
}

impl RenderPass for SkyAtmospherePass {
    fn name(&self) -> &str {
        &self.settings.profiler_label
    }

    fn injection_point(&self) -> InjectionPoint {
        self.settings.injection_point
    }

    fn execute(
        &mut self,
        target: &mut CameraTarget<'_>,
        pool: &TargetPool,
    ) -> Result<PassOutcome, CompositorError> {
        let Some(params) = self.params.take() else {
            return Ok(PassOutcome::Skipped(SkipReason::NoParameters));
        };
        if !self.is_operational() {
            return Ok(PassOutcome::Skipped(SkipReason::NotOperational));
        }
        if !params.is_active() {
            return Ok(PassOutcome::Skipped(SkipReason::Disabled));
        }
        let desc = TargetDescriptor::matching(target.color);
        if desc.width == 0 || desc.height == 0 {
            return Ok(PassOutcome::Skipped(SkipReason::EmptyTarget));
        }

        let span = tracing::info_span!("profiler_scope", label = %self.settings.profiler_label);
        let _enter = span.enter();

        let mut source = pool.acquire(desc, SOURCE_TARGET);
        let mut atmosphere = pool.acquire(desc, ATMOSPHERE_TARGET);
        source.copy_from(target.color)?;

        let frame = FrameContext::new(desc.width, desc.height, target.camera, &target.main_light);
        let geometry = PlanetGeometry::EARTH;
        let uniform = AtmosphereUniform::new(
            &params,
            &geometry,
            frame.main_light_dir,
            frame.rt_size,
        );
        tracing::trace!(
            bytes = uniform.as_bytes().len(),
            sample_counts = uniform.sample_counts,
            mie_g = uniform.mie_g,
            "bound atmosphere uniform"
        );

        let kernel = Kernel::new(&frame, &uniform, geometry.eye_altitude, &source)?;
        match self.settings.dispatch {
            DispatchStrategy::FullScreen => run_full_screen(&kernel, &mut atmosphere)?,
            DispatchStrategy::Tiled => run_tiled(
                &kernel,
                &mut atmosphere,
                self.group_size(),
                self.settings.worker_threads,
            )?,
        }

        target.color.copy_from(&atmosphere)?;
        tracing::debug!(
            width = desc.width,
            height = desc.height,
            dispatch = ?self.settings.dispatch,
            "composited sky atmosphere"
        );
        Ok(PassOutcome::Composited)
    }
}

fn resolve_program(
    kind: &str,
    name: Option<&str>,
    required: bool,
    lookup: impl FnOnce(&str) -> Result<Arc<Program>, ProgramError>,
) -> Option<Arc<Program>> {
    let Some(name) = name else {
        if required {
            tracing::error!(kind, "no sky atmosphere program configured");
        } else {
            tracing::warn!(kind, "no sky atmosphere program configured");
        }
        return None;
    };
    match lookup(name) {
        Ok(program) => Some(program),
        Err(err) if required => {
            tracing::error!(kind, %err, "sky atmosphere program unavailable");
            None
        }
        Err(err) => {
            tracing::warn!(kind, %err, "unused sky atmosphere program unavailable");
            None
        }
    }
}
