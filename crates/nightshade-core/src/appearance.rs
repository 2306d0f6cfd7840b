use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// Light/dark interface style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserInterfaceStyle {
    /// No preference recorded; colors resolve as light.
    #[default]
    Unspecified,
    Light,
    Dark,
}

impl UserInterfaceStyle {
    pub fn is_dark(&self) -> bool {
        matches!(self, UserInterfaceStyle::Dark)
    }
}

/// Accessibility contrast setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Contrast {
    #[default]
    Normal,
    High,
}

/// Visual level of the content (base window vs. presented sheet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceLevel {
    #[default]
    Base,
    Elevated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    #[default]
    Compact,
    Regular,
}

/// Preferred text size category (dynamic type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSize {
    Small,
    #[default]
    Medium,
    Large,
    ExtraLarge,
    Accessibility,
}

/// An immutable snapshot of the display traits active at one point in time.
///
/// Only `style`, `contrast` and `level` participate in color resolution; the
/// remaining traits are carried along so that trait churn which does not affect
/// colors can be told apart from a real appearance change.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AppearanceContext {
    pub style: UserInterfaceStyle,
    pub contrast: Contrast,
    pub level: InterfaceLevel,
    pub display_scale: f32,
    pub horizontal_size_class: SizeClass,
    pub content_size: ContentSize,
}

impl AppearanceContext {
    pub fn light() -> Self {
        Self {
            style: UserInterfaceStyle::Light,
            display_scale: 2.0,
            ..Default::default()
        }
    }

    pub fn dark() -> Self {
        Self {
            style: UserInterfaceStyle::Dark,
            display_scale: 2.0,
            ..Default::default()
        }
    }

    pub fn with_style(mut self, style: UserInterfaceStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_contrast(mut self, contrast: Contrast) -> Self {
        self.contrast = contrast;
        self
    }

    pub fn with_level(mut self, level: InterfaceLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_display_scale(mut self, scale: f32) -> Self {
        self.display_scale = scale;
        self
    }

    pub fn with_content_size(mut self, size: ContentSize) -> Self {
        self.content_size = size;
        self
    }

    /// Apply a forced style, leaving every other trait untouched.
    pub fn overridden(self, style_override: Option<UserInterfaceStyle>) -> Self {
        match style_override {
            Some(style) => self.with_style(style),
            None => self,
        }
    }

    /// Whether dynamic colors may resolve differently under `other`.
    ///
    /// `Unspecified` and `Light` resolve identically, so switching between the
    /// two is not a color change. A missing `other` always counts as different.
    pub fn has_different_color_appearance(&self, other: Option<&AppearanceContext>) -> bool {
        let Some(other) = other else {
            return true;
        };
        self.style.is_dark() != other.style.is_dark()
            || self.contrast != other.contrast
            || self.level != other.level
    }
}

/// Supplies the appearance in effect right now.
pub trait AppearanceSource: Send + Sync {
    fn current(&self) -> AppearanceContext;
}

/// A settable appearance source shared between the UI layer and the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct SharedAppearance {
    inner: Arc<RwLock<AppearanceContext>>,
}

impl SharedAppearance {
    pub fn new(context: AppearanceContext) -> Self {
        Self {
            inner: Arc::new(RwLock::new(context)),
        }
    }

    /// Replace the current context, returning the one it replaced.
    pub fn set(&self, context: AppearanceContext) -> AppearanceContext {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, context)
    }
}

impl AppearanceSource for SharedAppearance {
    fn current(&self) -> AppearanceContext {
        *self.inner.read().unwrap_or_else(|e| e.into_inner())
    }
}
