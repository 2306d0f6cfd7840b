use nightshade_core::{system, AppearanceContext, ColorToken, RenderError};
use nightshade_renderer::{Dispatcher, RenderHandle, RenderHost, RenderState, TargetId};

/// What [`AppearanceMonitor::handle_change`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Resolved colors are the same; nothing to do.
    Unchanged,
    /// Colors changed but the target has nothing displayed and nothing in
    /// flight, so its first request will capture the new appearance.
    Deferred,
    /// A new render was issued. Any displayed image was cleared and any pass
    /// still in flight was superseded.
    Rerendered(RenderHandle),
}

/// Decides whether an appearance transition warrants a re-render.
#[derive(Debug, Clone)]
pub struct AppearanceMonitor {
    /// Tokens whose resolution is compared between contexts.
    probe: Vec<ColorToken>,
}

impl AppearanceMonitor {
    pub fn new() -> Self {
        Self {
            probe: system::representative(),
        }
    }

    pub fn with_probe(probe: Vec<ColorToken>) -> Self {
        Self { probe }
    }

    pub fn probe(&self) -> &[ColorToken] {
        &self.probe
    }

    /// True only when the resolved color appearance differs.
    ///
    /// Trait churn that cannot affect color resolution (scale, size class,
    /// text size) is ignored, as is a style flip that leaves every probe
    /// token resolving to the same value. No previous context counts as a
    /// change.
    pub fn on_appearance_changed(
        &self,
        previous: Option<&AppearanceContext>,
        current: &AppearanceContext,
    ) -> bool {
        if !current.has_different_color_appearance(previous) {
            return false;
        }
        let Some(previous) = previous else {
            return true;
        };
        self.probe
            .iter()
            .any(|token| token.resolve(previous) != token.resolve(current))
    }

    /// React to a system appearance transition for one target.
    ///
    /// Both contexts are taken through the target's style override first,
    /// so a target forced to one style never re-renders on a system flip.
    /// When a re-render is warranted and an image is on screen or a pass is
    /// in flight, the image is cleared and a new request is issued with the
    /// previous canvas size and colors. The in-flight pass captured the old
    /// appearance, so it is superseded rather than allowed to land.
    pub fn handle_change<S: RenderHost>(
        &self,
        dispatcher: &Dispatcher<S>,
        host: &mut S,
        target_id: TargetId,
        previous: Option<&AppearanceContext>,
        current: &AppearanceContext,
    ) -> Result<ChangeOutcome, RenderError> {
        let target = host
            .render_target(target_id)
            .ok_or_else(|| RenderError::invalid(format!("unknown render target {target_id}")))?;

        let style_override = target.style_override();
        let previous = previous.map(|ctx| ctx.overridden(style_override));
        let current = current.overridden(style_override);
        if !self.on_appearance_changed(previous.as_ref(), &current) {
            log::debug!("Appearance change on {target_id} does not affect colors");
            return Ok(ChangeOutcome::Unchanged);
        }

        let in_flight = target.state() == RenderState::Rendering;
        let spec = match target.last_spec() {
            Some(spec) if in_flight || target.image().is_some() => spec.clone(),
            _ => {
                log::debug!("Appearance changed on {target_id} before anything was displayed");
                return Ok(ChangeOutcome::Deferred);
            }
        };

        target.clear_image();
        log::debug!("Re-rendering {target_id} for {:?}", current.style);
        let handle = dispatcher.request_render(host, target_id, spec.canvas, spec.tokens)?;
        Ok(ChangeOutcome::Rerendered(handle))
    }
}

impl Default for AppearanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Remembers the last observed appearance so each new observation can be
/// paired with the one before it.
#[derive(Debug, Clone, Default)]
pub struct AppearanceTracker {
    last: Option<AppearanceContext>,
}

impl AppearanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `current` and return the previously observed context.
    pub fn observe(&mut self, current: AppearanceContext) -> Option<AppearanceContext> {
        self.last.replace(current)
    }

    pub fn last(&self) -> Option<&AppearanceContext> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nightshade_core::{Contrast, ContentSize, InterfaceLevel, Rgba, SizeClass};

    #[test]
    fn test_light_to_dark_is_a_change() {
        let monitor = AppearanceMonitor::new();
        let light = AppearanceContext::light();
        let dark = AppearanceContext::dark();
        assert!(monitor.on_appearance_changed(Some(&light), &dark));
        assert!(monitor.on_appearance_changed(Some(&dark), &light));
    }

    #[test]
    fn test_unrelated_traits_are_not_a_change() {
        let monitor = AppearanceMonitor::new();
        let before = AppearanceContext::dark();
        let mut after = before
            .with_display_scale(3.0)
            .with_content_size(ContentSize::ExtraLarge);
        after.horizontal_size_class = SizeClass::Regular;
        assert!(!monitor.on_appearance_changed(Some(&before), &after));
    }

    #[test]
    fn test_static_probe_ignores_style_flip() {
        let monitor = AppearanceMonitor::with_probe(vec![Rgba::WHITE.into(), system::gray()]);
        assert!(!monitor.on_appearance_changed(
            Some(&AppearanceContext::light()),
            &AppearanceContext::dark()
        ));
    }

    #[test]
    fn test_contrast_change_detected_through_probe() {
        let monitor = AppearanceMonitor::new();
        let dark = AppearanceContext::dark();
        assert!(monitor.on_appearance_changed(Some(&dark), &dark.with_contrast(Contrast::High)));
        // Only dark variants differ when elevated, and the probe covers them.
        assert!(monitor.on_appearance_changed(Some(&dark), &dark.with_level(InterfaceLevel::Elevated)));
        let light = AppearanceContext::light();
        assert!(!monitor.on_appearance_changed(Some(&light), &light.with_level(InterfaceLevel::Elevated)));
    }

    #[test]
    fn test_no_previous_is_a_change() {
        assert!(AppearanceMonitor::new().on_appearance_changed(None, &AppearanceContext::light()));
    }

    #[test]
    fn test_tracker_returns_previous() {
        let mut tracker = AppearanceTracker::new();
        assert_eq!(tracker.observe(AppearanceContext::light()), None);
        let previous = tracker.observe(AppearanceContext::dark());
        assert_eq!(previous, Some(AppearanceContext::light()));
        assert_eq!(tracker.last(), Some(&AppearanceContext::dark()));
    }
}
