//! Compositor for the single-scattering sky atmosphere.
//!
//! Hosts the [`SkyAtmosphereFeature`] and its [`SkyAtmospherePass`], plus
//! the small render-graph host they run against: [`ColorBuffer`] targets, a
//! [`TargetPool`] of scoped temporaries, and a [`PassQueue`] ordered by
//! [`InjectionPoint`].

mod camera;
mod color;
mod dispatch;
mod error;
mod feature;
mod frame;
mod pass;
mod program;
mod queue;
mod target_pool;

pub use camera::{CameraView, MainLight};
pub use color::ColorBuffer;
pub use dispatch::{
    DispatchStrategy, Kernel, Tile, TileGrid, run_full_screen, run_tiled, shade_pixel,
};
pub use error::CompositorError;
pub use feature::SkyAtmosphereFeature;
pub use frame::FrameContext;
pub use pass::{
    ATMOSPHERE_TARGET, PassOutcome, PassSettings, SOURCE_TARGET, SkipReason, SkyAtmospherePass,
};
pub use program::{
    Program, ProgramError, ProgramKind, ProgramLibrary, SKY_ATMOSPHERE_COMPUTE_PROGRAM,
    SKY_ATMOSPHERE_GROUP_SIZE, SKY_ATMOSPHERE_KERNEL, SKY_ATMOSPHERE_PROGRAM,
};
pub use queue::{CameraTarget, InjectionPoint, PassQueue, PassReport, RenderPass};
pub use target_pool::{TargetDescriptor, TargetPool, TemporaryTarget};
