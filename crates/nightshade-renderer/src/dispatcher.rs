use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use nightshade_core::{
    AppearanceContext, AppearanceSource, CanvasSize, ColorToken, ConfigError, RenderError,
    RenderedImage, RendererConfig,
};

use crate::pool::WorkerPool;
use crate::raster::{self, PassOutcome};
use crate::request::RenderRequest;
use crate::target::{RenderEvent, RenderHandle, RenderSpec, RenderTarget, TargetId};
use crate::ui::UiSender;

/// The UI-side state that owns render targets.
///
/// Completions are applied through this trait, always on the UI context.
pub trait RenderHost: 'static {
    fn render_target(&mut self, id: TargetId) -> Option<&mut RenderTarget>;

    /// Called for every start, completion, failure and dropped result.
    fn on_render_event(&mut self, _event: &RenderEvent) {}
}

impl RenderHost for RenderTarget {
    fn render_target(&mut self, id: TargetId) -> Option<&mut RenderTarget> {
        (self.id() == id).then_some(self)
    }
}

/// Runs render passes on a worker pool and hands results back to the UI queue.
pub struct Dispatcher<S: RenderHost> {
    config: RendererConfig,
    appearance: Arc<dyn AppearanceSource>,
    pool: WorkerPool,
    ui: UiSender<S>,
}

impl<S: RenderHost> Dispatcher<S> {
    pub fn new(
        config: RendererConfig,
        appearance: Arc<dyn AppearanceSource>,
        ui: UiSender<S>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let pool = WorkerPool::new(config.worker_threads)?;
        Ok(Self {
            config,
            appearance,
            pool,
            ui,
        })
    }

    /// The appearance a request for `target` would capture right now.
    pub fn effective_appearance(&self, target: &RenderTarget) -> AppearanceContext {
        self.appearance.current().overridden(target.style_override())
    }

    /// Start a background render for `target_id` and return immediately.
    ///
    /// Invalid input fails here and schedules nothing. Otherwise the current
    /// appearance is captured, any render already in flight for the target is
    /// superseded, and the result arrives later as a job on the UI queue.
    pub fn request_render(
        &self,
        host: &mut S,
        target_id: TargetId,
        canvas: CanvasSize,
        tokens: Vec<ColorToken>,
    ) -> Result<RenderHandle, RenderError> {
        RenderRequest::validate(&canvas, &tokens)?;
        let target = host
            .render_target(target_id)
            .ok_or_else(|| RenderError::invalid(format!("unknown render target {target_id}")))?;

        let appearance = self.effective_appearance(target);
        let request = RenderRequest::new(canvas, tokens.clone(), appearance, &self.config)?;
        let handle = target.begin(RenderSpec { canvas, tokens });
        let latest = target.generation_counter();
        let request =
            request.with_seed(self.config.seed.map(|seed| seed.wrapping_add(handle.generation)));

        log::debug!(
            "Render {}#{} requested: {}x{} with {} colors, {:?}",
            handle.target,
            handle.generation,
            canvas.width,
            canvas.height,
            request.tokens().len(),
            appearance.style
        );

        let ui = self.ui.clone();
        let scheduled = self.pool.execute(move || {
            let superseded = || latest.load(Ordering::Acquire) != handle.generation;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                raster::render_pass(&request, superseded)
            }))
            .unwrap_or_else(|_| Err(RenderError::failed("drawing routine panicked")));

            let result = match outcome {
                Ok(PassOutcome::Completed(image)) => Ok(image),
                Ok(PassOutcome::Abandoned) => {
                    log::debug!("Render {}#{} abandoned", handle.target, handle.generation);
                    return;
                }
                Err(err) => Err(err),
            };
            if !ui.post(move |host: &mut S| deliver(host, handle, result)) {
                log::debug!("UI queue gone; dropping render {}#{}", handle.target, handle.generation);
            }
        });

        if let Err(err) = scheduled {
            log::warn!("Render {}#{} not scheduled: {}", handle.target, handle.generation, err);
            if !self.ui.post(move |host: &mut S| deliver(host, handle, Err(err))) {
                log::debug!("UI queue gone; dropping render {}#{}", handle.target, handle.generation);
            }
        }

        host.on_render_event(&RenderEvent::Started(handle));
        Ok(handle)
    }

    /// Stop the worker pool. Queued passes still finish and post their results.
    pub fn shutdown(&mut self) {
        self.pool.shutdown();
    }
}

/// Apply a finished pass to its target. Runs on the UI context.
fn deliver<S: RenderHost>(
    host: &mut S,
    handle: RenderHandle,
    result: Result<RenderedImage, RenderError>,
) {
    let Some(target) = host.render_target(handle.target) else {
        log::debug!("Render target {} no longer exists", handle.target);
        return;
    };
    let event = target.complete(handle, result);
    match &event {
        RenderEvent::Finished(h) => {
            log::debug!("Render {}#{} displayed", h.target, h.generation)
        }
        RenderEvent::Failed(h, err) => {
            log::warn!("Render {}#{} failed: {}", h.target, h.generation, err)
        }
        RenderEvent::Superseded(h) => {
            log::debug!("Dropping stale render {}#{}", h.target, h.generation)
        }
        RenderEvent::Started(_) => {}
    }
    host.on_render_event(&event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use nightshade_core::{system, Rgba, SharedAppearance, UserInterfaceStyle};

    use crate::target::RenderState;
    use crate::ui::UiQueue;

    const WAIT: Duration = Duration::from_secs(10);

    fn dispatcher(queue: &UiQueue<RenderTarget>, source: &SharedAppearance) -> Dispatcher<RenderTarget> {
        let config = RendererConfig::default().with_fill_count(200).with_seed(3);
        Dispatcher::new(config, Arc::new(source.clone()), queue.sender()).unwrap()
    }

    #[test]
    fn test_invalid_request_schedules_nothing() {
        let queue = UiQueue::new();
        let source = SharedAppearance::new(AppearanceContext::light());
        let dispatcher = dispatcher(&queue, &source);
        let mut target = RenderTarget::new();
        let id = target.id();

        let err = dispatcher
            .request_render(&mut target, id, CanvasSize::new(0.0, 10.0), vec![system::white()])
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidRequest(_)));
        let err = dispatcher
            .request_render(&mut target, id, CanvasSize::new(10.0, 10.0), Vec::new())
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidRequest(_)));

        assert_eq!(target.current_generation(), 0);
        assert_eq!(target.state(), RenderState::Idle);
        assert!(!target.activity().is_animating());
        assert!(!queue.run_next_timeout(&mut target, Duration::from_millis(50)));
    }

    #[test]
    fn test_unknown_target_is_invalid() {
        let queue = UiQueue::new();
        let source = SharedAppearance::new(AppearanceContext::light());
        let dispatcher = dispatcher(&queue, &source);
        let mut target = RenderTarget::new();
        let stranger = RenderTarget::new().id();
        let err = dispatcher
            .request_render(&mut target, stranger, CanvasSize::new(5.0, 5.0), vec![system::white()])
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidRequest(_)));
    }

    #[test]
    fn test_white_render_is_delivered_on_ui_queue() {
        let queue = UiQueue::new();
        let source = SharedAppearance::new(AppearanceContext::light());
        let dispatcher = dispatcher(&queue, &source);
        let mut target = RenderTarget::new();
        let id = target.id();

        dispatcher
            .request_render(&mut target, id, CanvasSize::new(100.0, 100.0), vec![system::white()])
            .unwrap();
        assert!(target.activity().is_animating());
        assert!(queue.run_until(&mut target, WAIT, |t| t.state() == RenderState::Displayed));

        let image = target.image().unwrap();
        assert_eq!(image.dimensions(), (100, 100));
        assert!(image.is_uniform(Rgba::WHITE));
        assert!(!target.activity().is_animating());
    }

    #[test]
    fn test_collapsed_canvas_reports_failure() {
        let queue = UiQueue::new();
        let source = SharedAppearance::new(AppearanceContext::light());
        let dispatcher = dispatcher(&queue, &source);
        let mut target = RenderTarget::new();
        let id = target.id();

        dispatcher
            .request_render(&mut target, id, CanvasSize::new(0.2, 40.0), vec![system::white()])
            .unwrap();
        assert!(queue.run_until(&mut target, WAIT, |t| t.last_error().is_some()));
        assert!(matches!(target.last_error(), Some(RenderError::RenderFailed(_))));
        assert_eq!(target.state(), RenderState::Idle);
        assert!(!target.activity().is_animating());
    }

    #[test]
    fn test_style_override_is_captured() {
        let queue = UiQueue::new();
        let source = SharedAppearance::new(AppearanceContext::light());
        let dispatcher = dispatcher(&queue, &source);
        let mut target = RenderTarget::new().with_style_override(UserInterfaceStyle::Dark);
        let id = target.id();

        dispatcher
            .request_render(&mut target, id, CanvasSize::new(6.0, 6.0), vec![system::system_background()])
            .unwrap();
        assert!(queue.run_until(&mut target, WAIT, |t| t.image().is_some()));
        let image = target.image().unwrap();
        assert!(image.is_uniform(Rgba::BLACK));
        assert_eq!(image.appearance().style, UserInterfaceStyle::Dark);
    }

    #[test]
    fn test_effective_appearance_applies_override() {
        let queue = UiQueue::new();
        let source = SharedAppearance::new(AppearanceContext::light());
        let dispatcher = dispatcher(&queue, &source);
        let plain = RenderTarget::new();
        let forced = RenderTarget::new().with_style_override(UserInterfaceStyle::Dark);

        assert_eq!(dispatcher.effective_appearance(&plain).style, UserInterfaceStyle::Light);
        assert_eq!(dispatcher.effective_appearance(&forced).style, UserInterfaceStyle::Dark);
        source.set(AppearanceContext::dark());
        assert_eq!(dispatcher.effective_appearance(&plain).style, UserInterfaceStyle::Dark);
    }

    #[test]
    fn test_shut_down_pool_reports_failure() {
        let queue = UiQueue::new();
        let source = SharedAppearance::new(AppearanceContext::light());
        let mut dispatcher = dispatcher(&queue, &source);
        dispatcher.shutdown();
        let mut target = RenderTarget::new();
        let id = target.id();

        dispatcher
            .request_render(&mut target, id, CanvasSize::new(4.0, 4.0), vec![system::white()])
            .unwrap();
        assert!(queue.run_until(&mut target, WAIT, |t| t.last_error().is_some()));
        assert!(matches!(target.last_error(), Some(RenderError::RenderFailed(_))));
        assert_eq!(target.state(), RenderState::Idle);
    }
}
