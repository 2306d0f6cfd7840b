use std::sync::Arc;
use std::time::Duration;

use nightshade_core::{
    system, AppearanceContext, CanvasSize, ColorToken, RendererConfig, Rgba, SharedAppearance,
    UserInterfaceStyle,
};
use nightshade_renderer::{
    Dispatcher, RenderEvent, RenderHandle, RenderHost, RenderState, RenderTarget, TargetId,
    UiQueue,
};

const WAIT: Duration = Duration::from_secs(10);

/// One image view that remembers every image it was ever handed.
struct View {
    target: RenderTarget,
    events: Vec<RenderEvent>,
    shown: Vec<Rgba>,
}

impl View {
    fn new() -> Self {
        Self {
            target: RenderTarget::new(),
            events: Vec::new(),
            shown: Vec::new(),
        }
    }

    fn finished(&self, handle: RenderHandle) -> bool {
        self.events.contains(&RenderEvent::Finished(handle))
    }
}

impl RenderHost for View {
    fn render_target(&mut self, id: TargetId) -> Option<&mut RenderTarget> {
        (self.target.id() == id).then_some(&mut self.target)
    }

    fn on_render_event(&mut self, event: &RenderEvent) {
        if let RenderEvent::Finished(_) = event {
            if let Some(color) = self.target.image().and_then(|img| img.pixel(0, 0)) {
                self.shown.push(color);
            }
        }
        self.events.push(event.clone());
    }
}

fn dispatcher(queue: &UiQueue<View>, threads: usize) -> Dispatcher<View> {
    let config = RendererConfig::default()
        .with_fill_count(2_000)
        .with_worker_threads(threads)
        .with_seed(5);
    let source = SharedAppearance::new(AppearanceContext::light());
    Dispatcher::new(config, Arc::new(source), queue.sender()).unwrap()
}

fn request(d: &Dispatcher<View>, view: &mut View, size: f64, token: ColorToken) -> RenderHandle {
    let id = view.target.id();
    d.request_render(view, id, CanvasSize::new(size, size), vec![token])
        .unwrap()
}

#[test]
fn second_request_supersedes_first() {
    for threads in [1, 4] {
        let queue = UiQueue::new();
        let d = dispatcher(&queue, threads);
        let mut view = View::new();

        // The first pass is much larger, so on a multi-threaded pool it tends
        // to finish after the second.
        let a = request(&d, &mut view, 400.0, Rgba::WHITE.into());
        let b = request(&d, &mut view, 20.0, Rgba::BLACK.into());
        assert_eq!(b.generation, a.generation + 1);

        assert!(queue.run_until(&mut view, WAIT, |v| v.finished(b)));
        // Give the older pass every chance to land late.
        std::thread::sleep(Duration::from_millis(200));
        queue.run_pending(&mut view);

        assert!(!view.finished(a));
        assert_eq!(view.shown, vec![Rgba::BLACK]);
        let image = view.target.image().unwrap();
        assert_eq!(image.dimensions(), (20, 20));
        assert!(image.is_uniform(Rgba::BLACK));
        assert_eq!(view.target.state(), RenderState::Displayed);
        assert!(!view.target.activity().is_animating());
        // One spinner session covers both requests.
        assert_eq!(view.target.activity().start_count(), 1);
    }
}

#[test]
fn appearance_is_captured_at_dispatch() {
    let queue = UiQueue::new();
    let source = SharedAppearance::new(AppearanceContext::light());
    let config = RendererConfig::default().with_fill_count(1_000).with_seed(2);
    let d: Dispatcher<View> =
        Dispatcher::new(config, Arc::new(source.clone()), queue.sender()).unwrap();
    let mut view = View::new();

    let handle = request(&d, &mut view, 64.0, system::system_background());
    // Flip the system appearance while the pass is in flight.
    source.set(AppearanceContext::dark());

    assert!(queue.run_until(&mut view, WAIT, |v| v.finished(handle)));
    let image = view.target.image().unwrap();
    assert_eq!(image.appearance().style, UserInterfaceStyle::Light);
    assert!(image.is_uniform(Rgba::WHITE));
}

#[test]
fn requested_dimensions_are_preserved() {
    let queue = UiQueue::new();
    let d = dispatcher(&queue, 2);
    let mut view = View::new();
    for (w, h) in [(1.0, 1.0), (3.0, 17.0), (120.0, 45.0)] {
        let id = view.target.id();
        let handle = d
            .request_render(&mut view, id, CanvasSize::new(w, h), vec![system::gray(), system::label()])
            .unwrap();
        assert!(queue.run_until(&mut view, WAIT, |v| v.finished(handle)));
        assert_eq!(
            view.target.image().unwrap().dimensions(),
            (w as u32, h as u32)
        );
    }
}
