//! Headless walkthrough of the slow-drawing screen before and after dark mode
//! adoption, plus a screen forced to dark.
//!
//! Usage: `nightshade-demo [renderer-config.json] [color-catalog.json]`
//! Set `RUST_LOG=debug` to follow each render.

use std::collections::HashMap;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use nightshade_core::{
    system, AppearanceContext, AppearanceSource, CanvasSize, ColorCatalog, ColorToken,
    RendererConfig, SharedAppearance, UserInterfaceStyle,
};
use nightshade_monitor::{AppearanceMonitor, AppearanceTracker, ChangeOutcome};
use nightshade_renderer::{
    Dispatcher, RenderEvent, RenderHost, RenderState, RenderTarget, TargetId, UiQueue,
};

const RENDER_TIMEOUT: Duration = Duration::from_secs(60);

struct Screen {
    name: &'static str,
    target: TargetId,
    tokens: Vec<ColorToken>,
}

#[derive(Default)]
struct App {
    targets: HashMap<TargetId, RenderTarget>,
}

impl RenderHost for App {
    fn render_target(&mut self, id: TargetId) -> Option<&mut RenderTarget> {
        self.targets.get_mut(&id)
    }

    fn on_render_event(&mut self, event: &RenderEvent) {
        match event {
            RenderEvent::Started(h) => log::info!("spinner on for {}", h.target),
            RenderEvent::Finished(h) => log::info!("image shown for {}", h.target),
            RenderEvent::Failed(h, err) => log::error!("render for {} failed: {}", h.target, err),
            RenderEvent::Superseded(_) => {}
        }
    }
}

impl App {
    fn add(&mut self, target: RenderTarget) -> TargetId {
        let id = target.id();
        self.targets.insert(id, target);
        id
    }

    fn all_settled(&self) -> bool {
        self.targets
            .values()
            .all(|t| t.state() != RenderState::Rendering)
    }
}

fn named(catalog: &ColorCatalog, name: &str) -> Result<ColorToken, String> {
    catalog
        .named(name)
        .ok_or_else(|| format!("color '{name}' is missing from the catalog"))
}

fn report(app: &App, screens: &[Screen], phase: &str) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = screens
        .iter()
        .map(|screen| {
            let target = &app.targets[&screen.target];
            let image = target.image();
            serde_json::json!({
                "screen": screen.name,
                "state": format!("{:?}", target.state()),
                "size": image.map(|img| [img.width(), img.height()]),
                "style": image.map(|img| format!("{:?}", img.appearance().style)),
                "corner": image.and_then(|img| img.pixel(0, 0)).map(|p| [p.r, p.g, p.b, p.a]),
                "error": target.last_error().map(|e| e.to_string()),
            })
        })
        .collect();
    serde_json::json!({ "phase": phase, "screens": rows })
}

fn run() -> Result<(), String> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => RendererConfig::load(Path::new(&path)).map_err(|e| e.to_string())?,
        None => RendererConfig::default(),
    };
    let catalog = match args.next() {
        Some(path) => ColorCatalog::load(Path::new(&path)).map_err(|e| e.to_string())?,
        None => ColorCatalog::builtin(),
    };

    let source = SharedAppearance::new(AppearanceContext::light());
    let queue: UiQueue<App> = UiQueue::new();
    let dispatcher = Dispatcher::new(config, Arc::new(source.clone()), queue.sender())
        .map_err(|e| e.to_string())?;
    let mut tracker = AppearanceTracker::new();
    tracker.observe(source.current());

    let mut app = App::default();
    let screens = vec![
        Screen {
            name: "before",
            target: app.add(RenderTarget::new()),
            tokens: vec![
                system::white(),
                system::light_gray(),
                system::gray(),
                named(&catalog, "HeaderColor")?,
            ],
        },
        Screen {
            name: "after",
            target: app.add(RenderTarget::new()),
            tokens: vec![
                system::system_background(),
                system::secondary_system_background(),
                system::gray(),
                named(&catalog, "LightAndDarkHeaderColor")?,
            ],
        },
        Screen {
            name: "always-dark",
            target: app.add(RenderTarget::new().with_style_override(UserInterfaceStyle::Dark)),
            tokens: vec![
                system::system_background(),
                system::secondary_system_background(),
                named(&catalog, "LightAndDarkHeaderColor")?,
            ],
        },
    ];

    let canvas = CanvasSize::new(320.0, 240.0);
    for screen in &screens {
        dispatcher
            .request_render(&mut app, screen.target, canvas, screen.tokens.clone())
            .map_err(|e| e.to_string())?;
    }
    if !queue.run_until(&mut app, RENDER_TIMEOUT, App::all_settled) {
        return Err("timed out waiting for the initial renders".to_string());
    }
    println!("{}", report(&app, &screens, "light"));

    source.set(AppearanceContext::dark());
    let current = source.current();
    let previous = tracker.observe(current);
    for screen in &screens {
        // Probing each screen's own colors keeps the static palette from
        // re-rendering on a style flip.
        let monitor = AppearanceMonitor::with_probe(screen.tokens.clone());
        let outcome = monitor
            .handle_change(&dispatcher, &mut app, screen.target, previous.as_ref(), &current)
            .map_err(|e| e.to_string())?;
        if let ChangeOutcome::Rerendered(handle) = outcome {
            log::info!("{} re-rendering as generation {}", screen.name, handle.generation);
        }
    }
    if !queue.run_until(&mut app, RENDER_TIMEOUT, App::all_settled) {
        return Err("timed out waiting for the dark mode re-renders".to_string());
    }
    println!("{}", report(&app, &screens, "dark"));
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            log::error!("{message}");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}
