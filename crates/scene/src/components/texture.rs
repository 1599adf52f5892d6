use crate::labels::LabelImage;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// Where a texture's pixels come from. Resolution is left to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureSource {
    /// Remote image (equirectangular map, flag icon).
    Url(String),
    /// Text rasterized onto an offscreen canvas.
    Label(LabelImage),
}
