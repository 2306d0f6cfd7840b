use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use nightshade_core::{CanvasSize, ColorToken, RenderError, RenderedImage, UserInterfaceStyle};

/// Unique render target identifier.
pub type TargetId = Uuid;

/// Identifies one render request: the target it draws for and the
/// generation it was issued as. Only the latest generation may be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderHandle {
    pub target: TargetId,
    pub generation: u64,
}

/// Lifecycle of a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Idle,
    Rendering,
    Displayed,
}

/// Spinner shown while a render is in flight.
#[derive(Debug, Clone, Default)]
pub struct ActivityIndicator {
    animating: bool,
    /// Number of times the spinner went from stopped to animating.
    start_count: u32,
}

impl ActivityIndicator {
    pub fn start_animating(&mut self) {
        if !self.animating {
            self.animating = true;
            self.start_count += 1;
        }
    }

    pub fn stop_animating(&mut self) {
        self.animating = false;
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn start_count(&self) -> u32 {
        self.start_count
    }
}

/// Notifications sent to the UI layer as renders progress.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    /// Work was scheduled; the activity indicator is running.
    Started(RenderHandle),
    /// The image was installed on the target.
    Finished(RenderHandle),
    /// The pass failed; the indicator is stopped.
    Failed(RenderHandle, RenderError),
    /// A newer request exists, so this result was discarded.
    Superseded(RenderHandle),
}

/// The canvas size and colors of the most recent request, kept so a
/// re-render can reuse them.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSpec {
    pub canvas: CanvasSize,
    pub tokens: Vec<ColorToken>,
}

/// UI-owned state of one image view that displays background renders.
///
/// Lives on the UI context. Workers never see it; they only share the
/// latest-generation counter.
#[derive(Debug)]
pub struct RenderTarget {
    id: TargetId,
    state: RenderState,
    image: Option<RenderedImage>,
    activity: ActivityIndicator,
    style_override: Option<UserInterfaceStyle>,
    last_spec: Option<RenderSpec>,
    last_error: Option<RenderError>,
    latest_generation: Arc<AtomicU64>,
}

impl RenderTarget {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: RenderState::Idle,
            image: None,
            activity: ActivityIndicator::default(),
            style_override: None,
            last_spec: None,
            last_error: None,
            latest_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Force every render for this target to use `style`, regardless of the
    /// system appearance.
    pub fn with_style_override(mut self, style: UserInterfaceStyle) -> Self {
        self.style_override = Some(style);
        self
    }

    pub fn id(&self) -> TargetId {
        self.id
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn image(&self) -> Option<&RenderedImage> {
        self.image.as_ref()
    }

    pub fn activity(&self) -> &ActivityIndicator {
        &self.activity
    }

    pub fn style_override(&self) -> Option<UserInterfaceStyle> {
        self.style_override
    }

    pub fn last_spec(&self) -> Option<&RenderSpec> {
        self.last_spec.as_ref()
    }

    pub fn last_error(&self) -> Option<&RenderError> {
        self.last_error.as_ref()
    }

    pub fn current_generation(&self) -> u64 {
        self.latest_generation.load(Ordering::Acquire)
    }

    /// Remove the displayed image. A displayed target falls back to idle;
    /// an in-flight render keeps running.
    pub fn clear_image(&mut self) {
        self.image = None;
        if self.state == RenderState::Displayed {
            self.state = RenderState::Idle;
        }
    }

    /// Issue a new generation, superseding anything in flight.
    pub(crate) fn begin(&mut self, spec: RenderSpec) -> RenderHandle {
        let generation = self.latest_generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.state = RenderState::Rendering;
        self.last_spec = Some(spec);
        self.last_error = None;
        self.activity.start_animating();
        RenderHandle {
            target: self.id,
            generation,
        }
    }

    /// Shared counter a worker polls to notice it has been superseded.
    pub(crate) fn generation_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.latest_generation)
    }

    /// Apply a completion. Stale generations leave the target untouched.
    pub(crate) fn complete(
        &mut self,
        handle: RenderHandle,
        result: Result<RenderedImage, RenderError>,
    ) -> RenderEvent {
        if handle.target != self.id || handle.generation != self.current_generation() {
            return RenderEvent::Superseded(handle);
        }
        self.activity.stop_animating();
        match result {
            Ok(image) => {
                self.image = Some(image);
                self.state = RenderState::Displayed;
                RenderEvent::Finished(handle)
            }
            Err(err) => {
                // Whatever was on screen stays there.
                self.state = if self.image.is_some() {
                    RenderState::Displayed
                } else {
                    RenderState::Idle
                };
                self.last_error = Some(err.clone());
                RenderEvent::Failed(handle, err)
            }
        }
    }
}

impl Default for RenderTarget {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nightshade_core::{system, AppearanceContext, Rgba};

    fn spec() -> RenderSpec {
        RenderSpec {
            canvas: CanvasSize::new(2.0, 2.0),
            tokens: vec![system::white()],
        }
    }

    fn image() -> RenderedImage {
        RenderedImage::from_pixels(2, 2, vec![Rgba::WHITE; 4], AppearanceContext::light()).unwrap()
    }

    #[test]
    fn test_begin_bumps_generation() {
        let mut target = RenderTarget::new();
        assert_eq!(target.state(), RenderState::Idle);
        let a = target.begin(spec());
        let b = target.begin(spec());
        assert_eq!(b.generation, a.generation + 1);
        assert_eq!(target.state(), RenderState::Rendering);
        assert!(target.activity().is_animating());
        assert_eq!(target.activity().start_count(), 1);
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut target = RenderTarget::new();
        let a = target.begin(spec());
        let b = target.begin(spec());
        assert_eq!(target.complete(a, Ok(image())), RenderEvent::Superseded(a));
        assert!(target.image().is_none());
        assert!(target.activity().is_animating());
        assert_eq!(target.complete(b, Ok(image())), RenderEvent::Finished(b));
        assert_eq!(target.state(), RenderState::Displayed);
        assert!(!target.activity().is_animating());
    }

    #[test]
    fn test_failure_keeps_previous_image() {
        let mut target = RenderTarget::new();
        let a = target.begin(spec());
        target.complete(a, Ok(image()));
        let b = target.begin(spec());
        let event = target.complete(b, Err(RenderError::failed("boom")));
        assert!(matches!(event, RenderEvent::Failed(_, RenderError::RenderFailed(_))));
        assert_eq!(target.state(), RenderState::Displayed);
        assert!(target.image().is_some());
        assert!(target.last_error().is_some());
    }

    #[test]
    fn test_failure_without_image_goes_idle() {
        let mut target = RenderTarget::new();
        let a = target.begin(spec());
        target.complete(a, Err(RenderError::failed("boom")));
        assert_eq!(target.state(), RenderState::Idle);
    }

    #[test]
    fn test_clear_image() {
        let mut target = RenderTarget::new();
        let a = target.begin(spec());
        target.complete(a, Ok(image()));
        target.clear_image();
        assert!(target.image().is_none());
        assert_eq!(target.state(), RenderState::Idle);
    }

    #[test]
    fn test_foreign_handle_is_superseded() {
        let mut target = RenderTarget::new();
        let other = RenderTarget::new();
        target.begin(spec());
        let foreign = RenderHandle {
            target: other.id(),
            generation: 1,
        };
        assert_eq!(target.complete(foreign, Ok(image())), RenderEvent::Superseded(foreign));
    }
}
