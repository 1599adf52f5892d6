use std::io::Cursor;

use gloo_net::http::Request;
use scene::labels::{LabelImage, TextMeasure};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

/// Decoded texture pixels, tightly packed RGBA8.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, String> {
    let img = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| format!("failed to guess format: {e}"))?
        .decode()
        .map_err(|e| format!("failed to decode image: {e}"))?
        .to_rgba8();
    Ok(RgbaImage {
        width: img.width(),
        height: img.height(),
        pixels: img.into_raw(),
    })
}

pub async fn fetch_image(url: &str) -> Result<RgbaImage, String> {
    let resp = Request::get(url).send().await.map_err(|e| e.to_string())?;
    if !resp.ok() {
        return Err(format!("HTTP {} for {url}", resp.status()));
    }
    let bytes = resp.binary().await.map_err(|e| e.to_string())?;
    decode_image(&bytes)
}

fn create_canvas_2d(
    document: &Document,
) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    Ok((canvas, ctx))
}

/// Text measurement through an offscreen 2D canvas.
pub struct CanvasTextMeasure {
    ctx: CanvasRenderingContext2d,
    font_family: String,
}

impl CanvasTextMeasure {
    pub fn new(document: &Document, font_family: &str) -> Result<Self, JsValue> {
        let (_, ctx) = create_canvas_2d(document)?;
        Ok(Self {
            ctx,
            font_family: font_family.to_string(),
        })
    }
}

impl TextMeasure for CanvasTextMeasure {
    fn text_width_px(&self, text: &str, font_px: f64) -> f64 {
        self.ctx.set_font(&format!("{font_px}px {}", self.font_family));
        self.ctx
            .measure_text(text)
            .map(|m| m.width())
            .unwrap_or(text.chars().count() as f64 * font_px * 0.55)
    }
}

/// Draw a label centered on a transparent canvas of the laid-out size and
/// read the pixels back.
pub fn rasterize_label(document: &Document, label: &LabelImage) -> Result<RgbaImage, JsValue> {
    let (canvas, ctx) = create_canvas_2d(document)?;
    canvas.set_width(label.width_px);
    canvas.set_height(label.height_px);

    // Resizing the canvas resets the context state.
    ctx.set_font(&label.font);
    ctx.set_fill_style_str(&label.color);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.fill_text(
        &label.text,
        label.width_px as f64 / 2.0,
        label.height_px as f64 / 2.0,
    )?;

    let data = ctx.get_image_data(0.0, 0.0, label.width_px as f64, label.height_px as f64)?;
    Ok(RgbaImage {
        width: data.width(),
        height: data.height(),
        pixels: data.data().0,
    })
}
