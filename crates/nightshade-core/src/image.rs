use std::sync::Arc;

use crate::appearance::AppearanceContext;
use crate::color::Rgba;

/// The output of a completed render pass.
///
/// Pixels are shared and never mutated; a re-render replaces the whole image.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedImage {
    width: u32,
    height: u32,
    pixels: Arc<[Rgba]>,
    /// The appearance every dynamic color in this image was resolved against.
    appearance: AppearanceContext,
}

impl RenderedImage {
    /// Returns `None` if `pixels` does not hold exactly `width * height` entries.
    pub fn from_pixels(
        width: u32,
        height: u32,
        pixels: Vec<Rgba>,
        appearance: AppearanceContext,
    ) -> Option<Self> {
        if pixels.len() as u64 != width as u64 * height as u64 {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels: pixels.into(),
            appearance,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn appearance(&self) -> &AppearanceContext {
        &self.appearance
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Whether every pixel equals `color`.
    pub fn is_uniform(&self, color: Rgba) -> bool {
        self.pixels.iter().all(|p| *p == color)
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| [p.r, p.g, p.b, p.a])
            .collect()
    }
}
