//! Host-side pass scheduling for one camera.

use serde::{Deserialize, Serialize};

use crate::camera::{CameraView, MainLight};
use crate::color::ColorBuffer;
use crate::error::CompositorError;
use crate::pass::PassOutcome;
use crate::target_pool::TargetPool;

/// Where in the frame a pass runs. Variants are declared in execution order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InjectionPoint {
    BeforeRendering,
    BeforeRenderingOpaques,
    AfterRenderingOpaques,
    BeforeRenderingSkybox,
    AfterRenderingSkybox,
    /// Translucent geometry must blend against the composited sky.
    #[default]
    BeforeRenderingTransparents,
    AfterRenderingTransparents,
    BeforeRenderingPostProcessing,
    AfterRenderingPostProcessing,
    AfterRendering,
}

/// The camera being rendered and its color target.
pub struct CameraTarget<'a> {
    pub color: &'a mut ColorBuffer,
    pub camera: CameraView,
    pub main_light: MainLight,
}

/// A unit of work the host runs against a camera target.
pub trait RenderPass {
    /// Human-readable name for debugging and logging.
    fn name(&self) -> &str;

    /// When the pass runs relative to the host's own work.
    fn injection_point(&self) -> InjectionPoint;

    /// Run the pass for one camera.
    fn execute(
        &mut self,
        target: &mut CameraTarget<'_>,
        pool: &TargetPool,
    ) -> Result<PassOutcome, CompositorError>;
}

/// What happened to one enqueued pass.
#[derive(Debug)]
pub struct PassReport {
    pub name: String,
    pub injection_point: InjectionPoint,
    pub result: Result<PassOutcome, CompositorError>,
}

/// Passes enqueued for the current camera. Drained by [`PassQueue::execute`].
#[derive(Default)]
pub struct PassQueue<'a> {
    passes: Vec<&'a mut dyn RenderPass>,
}

impl<'a> PassQueue<'a> {
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    pub fn enqueue(&mut self, pass: &'a mut dyn RenderPass) {
        tracing::trace!(name = pass.name(), "enqueued pass");
        self.passes.push(pass);
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every enqueued pass in injection order and empty the queue.
    ///
    /// Passes sharing an injection point keep their enqueue order. A failing
    /// pass is logged and the remaining passes still run.
    pub fn execute(&mut self, target: &mut CameraTarget<'_>, pool: &TargetPool) -> Vec<PassReport> {
        let mut passes = std::mem::take(&mut self.passes);
        passes.sort_by_key(|pass| pass.injection_point());

        passes
            .into_iter()
            .map(|pass| {
                let result = pass.execute(target, pool);
                if let Err(err) = &result {
                    tracing::error!(pass = pass.name(), %err, "render pass failed");
                }
                PassReport {
                    name: pass.name().to_string(),
                    injection_point: pass.injection_point(),
                    result,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        name: &'static str,
        point: InjectionPoint,
        fill: f32,
        fail: bool,
    }

    impl RenderPass for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn injection_point(&self) -> InjectionPoint {
            self.point
        }

        fn execute(
            &mut self,
            target: &mut CameraTarget<'_>,
            _pool: &TargetPool,
        ) -> Result<PassOutcome, CompositorError> {
            if self.fail {
                return Err(CompositorError::SizeMismatch {
                    expected: (1, 1),
                    actual: (0, 0),
                });
            }
            target.color.pixels_mut().fill([self.fill; 4]);
            Ok(PassOutcome::Composited)
        }
    }

    fn recorder(name: &'static str, point: InjectionPoint, fill: f32) -> Recorder {
        Recorder {
            name,
            point,
            fill,
            fail: false,
        }
    }

    #[test]
    fn test_default_injection_point_is_before_transparents() {
        assert_eq!(InjectionPoint::default(), InjectionPoint::BeforeRenderingTransparents);
        assert!(InjectionPoint::AfterRenderingSkybox < InjectionPoint::BeforeRenderingTransparents);
        assert!(InjectionPoint::BeforeRenderingTransparents < InjectionPoint::AfterRenderingTransparents);
    }

    #[test]
    fn test_passes_run_in_injection_order() {
        let mut late = recorder("late", InjectionPoint::AfterRenderingTransparents, 2.0);
        let mut early = recorder("early", InjectionPoint::BeforeRenderingOpaques, 1.0);
        let mut queue = PassQueue::new();
        queue.enqueue(&mut late);
        queue.enqueue(&mut early);

        let mut color = ColorBuffer::new(2, 2);
        let mut target = CameraTarget {
            color: &mut color,
            camera: CameraView::default(),
            main_light: MainLight::default(),
        };
        let reports = queue.execute(&mut target, &TargetPool::new());

        let names: Vec<_> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["early", "late"]);
        assert!(queue.is_empty());
        assert_eq!(color.get(0, 0), [2.0; 4]);
    }

    #[test]
    fn test_failing_pass_does_not_stop_queue() {
        let mut broken = Recorder {
            fail: true,
            ..recorder("broken", InjectionPoint::BeforeRendering, 0.0)
        };
        let mut ok = recorder("ok", InjectionPoint::AfterRendering, 3.0);
        let mut queue = PassQueue::new();
        queue.enqueue(&mut ok);
        queue.enqueue(&mut broken);

        let mut color = ColorBuffer::new(1, 1);
        let mut target = CameraTarget {
            color: &mut color,
            camera: CameraView::default(),
            main_light: MainLight::default(),
        };
        let reports = queue.execute(&mut target, &TargetPool::new());
        assert!(reports[0].result.is_err());
        assert!(matches!(reports[1].result, Ok(PassOutcome::Composited)));
    }
}
