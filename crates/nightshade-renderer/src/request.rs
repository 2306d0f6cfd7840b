use nightshade_core::{AppearanceContext, CanvasSize, ColorToken, RenderError, RendererConfig};

/// Everything a worker needs for one render pass.
///
/// Built on the UI context, moved to a worker, and dropped once the pass
/// finishes. The appearance is fixed at construction.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    canvas: CanvasSize,
    tokens: Vec<ColorToken>,
    appearance: AppearanceContext,
    fill_count: u32,
    max_fill_diameter: f64,
    max_pixels: u64,
    seed: Option<u64>,
}

impl RenderRequest {
    /// Reject non-positive or non-finite canvases and empty palettes.
    pub fn validate(canvas: &CanvasSize, tokens: &[ColorToken]) -> Result<(), RenderError> {
        if !canvas.is_valid() {
            return Err(RenderError::invalid(format!(
                "canvas must have positive width and height, got {}x{}",
                canvas.width, canvas.height
            )));
        }
        if tokens.is_empty() {
            return Err(RenderError::invalid("at least one color token is required"));
        }
        Ok(())
    }

    pub fn new(
        canvas: CanvasSize,
        tokens: Vec<ColorToken>,
        appearance: AppearanceContext,
        config: &RendererConfig,
    ) -> Result<Self, RenderError> {
        Self::validate(&canvas, &tokens)?;
        Ok(Self {
            canvas,
            tokens,
            appearance,
            fill_count: config.fill_count,
            max_fill_diameter: config.max_fill_diameter,
            max_pixels: config.max_pixels,
            seed: config.seed,
        })
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn tokens(&self) -> &[ColorToken] {
        &self.tokens
    }

    pub fn appearance(&self) -> &AppearanceContext {
        &self.appearance
    }

    pub fn fill_count(&self) -> u32 {
        self.fill_count
    }

    pub fn max_fill_diameter(&self) -> f64 {
        self.max_fill_diameter
    }

    pub fn max_pixels(&self) -> u64 {
        self.max_pixels
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}
