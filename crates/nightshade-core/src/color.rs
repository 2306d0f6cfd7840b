use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::appearance::{AppearanceContext, Contrast, InterfaceLevel};
use crate::error::ConfigError;

/// A concrete 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Gray level with full opacity; `white` is in `[0, 1]`.
    pub fn gray(white: f32) -> Self {
        let v = (white.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgb(v, v, v)
    }

    /// Composite `self` over `dst` (non-premultiplied source-over).
    pub fn over(&self, dst: Rgba) -> Rgba {
        match self.a {
            255 => return *self,
            0 => return dst,
            _ => {}
        }
        let sa = self.a as u32;
        let da = dst.a as u32;
        // Alpha scaled by 255 to stay in integer math.
        let out_a = sa * 255 + da * (255 - sa);
        if out_a == 0 {
            return Rgba::TRANSPARENT;
        }
        let channel = |s: u8, d: u8| -> u8 {
            let num = s as u32 * sa * 255 + d as u32 * da * (255 - sa);
            ((num + out_a / 2) / out_a) as u8
        };
        Rgba {
            r: channel(self.r, dst.r),
            g: channel(self.g, dst.g),
            b: channel(self.b, dst.b),
            a: ((out_a + 127) / 255) as u8,
        }
    }
}

/// A named color with per-appearance variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicColor {
    pub name: String,
    pub light: Rgba,
    pub dark: Rgba,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_high_contrast: Option<Rgba>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_high_contrast: Option<Rgba>,
    /// Dark variant used for elevated content (sheets, popovers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_elevated: Option<Rgba>,
}

impl DynamicColor {
    pub fn new(name: &str, light: Rgba, dark: Rgba) -> Self {
        Self {
            name: name.to_string(),
            light,
            dark,
            light_high_contrast: None,
            dark_high_contrast: None,
            dark_elevated: None,
        }
    }

    pub fn with_high_contrast(mut self, light: Rgba, dark: Rgba) -> Self {
        self.light_high_contrast = Some(light);
        self.dark_high_contrast = Some(dark);
        self
    }

    pub fn with_dark_elevated(mut self, color: Rgba) -> Self {
        self.dark_elevated = Some(color);
        self
    }

    pub fn resolve(&self, context: &AppearanceContext) -> Rgba {
        let high_contrast = context.contrast == Contrast::High;
        if context.style.is_dark() {
            if high_contrast {
                if let Some(c) = self.dark_high_contrast {
                    return c;
                }
            }
            if context.level == InterfaceLevel::Elevated {
                if let Some(c) = self.dark_elevated {
                    return c;
                }
            }
            self.dark
        } else if high_contrast {
            self.light_high_contrast.unwrap_or(self.light)
        } else {
            self.light
        }
    }
}

/// A color reference, either fixed or resolved against an appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColorToken {
    Static(Rgba),
    Dynamic(DynamicColor),
}

impl ColorToken {
    pub fn resolve(&self, context: &AppearanceContext) -> Rgba {
        match self {
            ColorToken::Static(c) => *c,
            ColorToken::Dynamic(d) => d.resolve(context),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, ColorToken::Dynamic(_))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            ColorToken::Static(_) => None,
            ColorToken::Dynamic(d) => Some(&d.name),
        }
    }
}

impl From<Rgba> for ColorToken {
    fn from(c: Rgba) -> Self {
        ColorToken::Static(c)
    }
}

impl From<DynamicColor> for ColorToken {
    fn from(d: DynamicColor) -> Self {
        ColorToken::Dynamic(d)
    }
}

/// Built-in semantic and fixed colors.
pub mod system {
    use super::{ColorToken, DynamicColor, Rgba};

    pub fn system_background() -> ColorToken {
        DynamicColor::new("systemBackground", Rgba::WHITE, Rgba::BLACK)
            .with_dark_elevated(Rgba::rgb(28, 28, 30))
            .into()
    }

    pub fn secondary_system_background() -> ColorToken {
        DynamicColor::new(
            "secondarySystemBackground",
            Rgba::rgb(242, 242, 247),
            Rgba::rgb(28, 28, 30),
        )
        .with_high_contrast(Rgba::rgb(235, 235, 240), Rgba::rgb(36, 36, 38))
        .with_dark_elevated(Rgba::rgb(44, 44, 46))
        .into()
    }

    pub fn label() -> ColorToken {
        DynamicColor::new("label", Rgba::BLACK, Rgba::WHITE).into()
    }

    pub fn secondary_label() -> ColorToken {
        DynamicColor::new(
            "secondaryLabel",
            Rgba::new(60, 60, 67, 153),
            Rgba::new(235, 235, 245, 153),
        )
        .with_high_contrast(Rgba::new(60, 60, 67, 204), Rgba::new(235, 235, 245, 204))
        .into()
    }

    pub fn white() -> ColorToken {
        Rgba::WHITE.into()
    }

    pub fn light_gray() -> ColorToken {
        Rgba::gray(2.0 / 3.0).into()
    }

    pub fn gray() -> ColorToken {
        Rgba::gray(0.5).into()
    }

    /// Tokens whose resolution tells light, dark, contrast and elevation apart.
    pub fn representative() -> Vec<ColorToken> {
        vec![
            system_background(),
            secondary_system_background(),
            label(),
            secondary_label(),
        ]
    }
}

// ── Named colors ─────────────────────────────────────────────────────

/// One catalog entry; a missing `dark` variant makes the color static.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub light: Rgba,
    #[serde(default)]
    pub dark: Option<Rgba>,
    #[serde(default)]
    pub light_high_contrast: Option<Rgba>,
    #[serde(default)]
    pub dark_high_contrast: Option<Rgba>,
    #[serde(default)]
    pub dark_elevated: Option<Rgba>,
}

impl CatalogEntry {
    fn to_token(&self, name: &str) -> ColorToken {
        let has_variants = self.dark.is_some()
            || self.light_high_contrast.is_some()
            || self.dark_high_contrast.is_some()
            || self.dark_elevated.is_some();
        if !has_variants {
            return ColorToken::Static(self.light);
        }
        ColorToken::Dynamic(DynamicColor {
            name: name.to_string(),
            light: self.light,
            dark: self.dark.unwrap_or(self.light),
            light_high_contrast: self.light_high_contrast,
            dark_high_contrast: self.dark_high_contrast,
            dark_elevated: self.dark_elevated,
        })
    }
}

/// Name → color lookup, the in-process stand-in for an asset catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl ColorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The header colors shipped with the demo screens.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.insert(
            "HeaderColor",
            CatalogEntry {
                light: Rgba::rgb(27, 94, 160),
                dark: None,
                light_high_contrast: None,
                dark_high_contrast: None,
                dark_elevated: None,
            },
        );
        catalog.insert(
            "LightAndDarkHeaderColor",
            CatalogEntry {
                light: Rgba::rgb(27, 94, 160),
                dark: Some(Rgba::rgb(100, 170, 255)),
                light_high_contrast: None,
                dark_high_contrast: None,
                dark_elevated: None,
            },
        );
        catalog
    }

    pub fn insert(&mut self, name: &str, entry: CatalogEntry) {
        self.entries.insert(name.to_string(), entry);
    }

    pub fn named(&self, name: &str) -> Option<ColorToken> {
        self.entries.get(name).map(|e| e.to_token(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        log::info!("Loaded {} named colors from {}", catalog.len(), path.display());
        Ok(catalog)
    }
}
