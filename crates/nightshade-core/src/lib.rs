//! # Nightshade Core
//!
//! Data model shared by the Nightshade renderer and appearance monitor:
//! appearance snapshots, static and dynamic color tokens, canvas geometry,
//! rendered images, renderer configuration, and errors.
//!
//! Dynamic colors are never resolved against ambient state. Every resolution
//! takes an explicit [`AppearanceContext`].

pub mod appearance;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod image;

pub use appearance::{
    AppearanceContext, AppearanceSource, Contrast, ContentSize, InterfaceLevel,
    SharedAppearance, SizeClass, UserInterfaceStyle,
};
pub use color::{system, CatalogEntry, ColorCatalog, ColorToken, DynamicColor, Rgba};
pub use config::RendererConfig;
pub use error::{ConfigError, RenderError};
pub use geometry::{BBox, CanvasSize, Point};
pub use image::RenderedImage;
