use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use nightshade_core::geometry::{BBox, Point};
use nightshade_core::{AppearanceContext, RenderError, RenderedImage, Rgba};

use crate::request::RenderRequest;

/// How many fills run between checks for a superseding request.
const SUPERSEDE_CHECK_INTERVAL: u32 = 1024;

/// A mutable RGBA pixel buffer private to one render pass.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Paint the ellipse inscribed in `bounds`, sampling at pixel centers.
    pub fn fill_ellipse(&mut self, bounds: &BBox, color: Rgba) {
        if color.a == 0 || bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return;
        }
        let x0 = bounds.min.x.floor().max(0.0) as u32;
        let y0 = bounds.min.y.floor().max(0.0) as u32;
        let x1 = (bounds.max.x.ceil().max(0.0) as u32).min(self.width);
        let y1 = (bounds.max.y.ceil().max(0.0) as u32).min(self.height);

        for y in y0..y1 {
            let row = y as usize * self.width as usize;
            for x in x0..x1 {
                let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if bounds.inscribed_ellipse_contains(&center) {
                    let dst = &mut self.pixels[row + x as usize];
                    *dst = color.over(*dst);
                }
            }
        }
    }

    pub fn into_image(self, appearance: AppearanceContext) -> Result<RenderedImage, RenderError> {
        RenderedImage::from_pixels(self.width, self.height, self.pixels, appearance)
            .ok_or_else(|| RenderError::failed("pixel buffer does not match canvas dimensions"))
    }
}

/// Result of a pass that did not fail.
#[derive(Debug)]
pub enum PassOutcome {
    Completed(RenderedImage),
    /// A newer request took over; nothing was produced.
    Abandoned,
}

/// Run the slow drawing routine for `request`.
///
/// The canvas is primed with the first token, then `fill_count` circles of
/// random position, diameter and token are painted. All tokens are resolved
/// against the request's captured appearance and nothing else.
/// `superseded` is polled periodically and ends the pass early when it
/// returns true.
pub fn render_pass(
    request: &RenderRequest,
    superseded: impl Fn() -> bool,
) -> Result<PassOutcome, RenderError> {
    let canvas_size = request.canvas();
    // Checked on the rounded float size so dimensions past u32 land here too.
    let (rounded_w, rounded_h) = (canvas_size.width.round(), canvas_size.height.round());
    if rounded_w * rounded_h > request.max_pixels() as f64
        || rounded_w > u32::MAX as f64
        || rounded_h > u32::MAX as f64
    {
        return Err(RenderError::failed(format!(
            "canvas {}x{} exceeds the {} pixel budget",
            rounded_w,
            rounded_h,
            request.max_pixels()
        )));
    }
    let (width, height) = canvas_size.pixel_dimensions().ok_or_else(|| {
        RenderError::failed(format!(
            "canvas {}x{} collapses to zero pixels",
            canvas_size.width, canvas_size.height
        ))
    })?;

    let appearance = *request.appearance();
    let palette: Vec<Rgba> = request
        .tokens()
        .iter()
        .map(|token| token.resolve(&appearance))
        .collect();
    let Some(&ground) = palette.first() else {
        return Err(RenderError::failed("no colors to draw with"));
    };

    let mut rng = match request.seed() {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    let mut canvas = Canvas::new(width, height, ground);
    let max_diameter = request.max_fill_diameter();

    for i in 0..request.fill_count() {
        if i % SUPERSEDE_CHECK_INTERVAL == 0 && superseded() {
            return Ok(PassOutcome::Abandoned);
        }
        let color = palette[rng.random_range(0..palette.len())];
        let x = rng.random_range(0.0..canvas_size.width);
        let y = rng.random_range(0.0..canvas_size.height);
        let diameter = if max_diameter > 0.0 {
            rng.random_range(0.0..max_diameter)
        } else {
            0.0
        };
        canvas.fill_ellipse(&BBox::square(Point::new(x, y), diameter), color);
    }

    canvas.into_image(appearance).map(PassOutcome::Completed)
}
