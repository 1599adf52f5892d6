//! Text label sprites.
//!
//! A label is rasterized by the host onto an offscreen canvas that is sized
//! to fit the text, then shown as a billboard whose world size follows the
//! canvas size (`px / px_per_unit`).

use foundation::math::{Vec2, Vec3};

/// Measures rendered text width in CSS pixels.
pub trait TextMeasure {
    fn text_width_px(&self, text: &str, font_px: f64) -> f64;
}

/// Width estimate used when no canvas is available (tests, failed context).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ApproxTextMeasure {
    /// Average glyph advance as a fraction of the font size.
    pub advance_ratio: f64,
}

impl Default for ApproxTextMeasure {
    fn default() -> Self {
        Self {
            advance_ratio: 0.55,
        }
    }
}

impl TextMeasure for ApproxTextMeasure {
    fn text_width_px(&self, text: &str, font_px: f64) -> f64 {
        text.chars().count() as f64 * font_px * self.advance_ratio
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub font_px: f64,
    pub font_family: String,
    pub padding_px: f64,
    pub px_per_unit: f64,
    /// Offset from the marker position in the parent's local frame.
    pub offset: Vec3,
    pub color: String,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_px: 32.0,
            font_family: "Arial".to_string(),
            padding_px: 20.0,
            px_per_unit: 100.0,
            offset: Vec3::new(1.0, 0.0, 0.0),
            color: "white".to_string(),
        }
    }
}

impl LabelStyle {
    /// CSS font shorthand, e.g. `32px Arial`.
    pub fn css_font(&self) -> String {
        format!("{}px {}", self.font_px, self.font_family)
    }
}

/// Canvas description for one rasterized label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelImage {
    pub text: String,
    pub font: String,
    pub color: String,
    pub width_px: u32,
    pub height_px: u32,
}

impl LabelImage {
    pub fn layout(text: &str, style: &LabelStyle, measure: &dyn TextMeasure) -> Self {
        let text_width = measure.text_width_px(text, style.font_px).max(0.0);
        // Canvas dimensions are integers; the browser truncates fractional sizes.
        let width_px = (text_width + style.padding_px).max(1.0) as u32;
        let height_px = (style.font_px + style.padding_px).max(1.0) as u32;
        Self {
            text: text.to_string(),
            font: style.css_font(),
            color: style.color.clone(),
            width_px,
            height_px,
        }
    }

    /// World-space sprite size for this canvas.
    pub fn sprite_size(&self, px_per_unit: f64) -> Vec2 {
        let k = if px_per_unit > 0.0 { px_per_unit } else { 100.0 };
        Vec2::new(self.width_px as f64 / k, self.height_px as f64 / k)
    }
}

/// Short label for a marker: the last whitespace-separated word of its
/// description ("United States of America" -> "America").
pub fn label_text(description: &str) -> &str {
    description.split_whitespace().last().unwrap_or("")
}
