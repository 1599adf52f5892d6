use foundation::math::Vec2;

use super::TextureId;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape3D {
    /// UV sphere centered on the entity origin.
    Sphere { radius: f64, segments: u32 },
    /// Camera-facing quad centered on the entity origin.
    Sprite { size: Vec2 },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Drawable3D {
    pub shape: Shape3D,
    /// `None` renders the shape untextured.
    pub texture: Option<TextureId>,
}

impl Drawable3D {
    pub fn sphere(radius: f64, segments: u32) -> Self {
        Self {
            shape: Shape3D::Sphere { radius, segments },
            texture: None,
        }
    }

    pub fn sprite(size: Vec2) -> Self {
        Self {
            shape: Shape3D::Sprite { size },
            texture: None,
        }
    }

    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Drawable3D, Shape3D};
    use crate::components::TextureId;
    use foundation::math::Vec2;

    #[test]
    fn create_sphere_drawable() {
        let drawable = Drawable3D::sphere(1.5, 32);
        assert!(matches!(drawable.shape, Shape3D::Sphere { .. }));
        assert!(drawable.texture.is_none());
    }

    #[test]
    fn sprite_with_texture() {
        let drawable = Drawable3D::sprite(Vec2::new(0.5, 0.5)).with_texture(TextureId(3));
        assert_eq!(drawable.texture, Some(TextureId(3)));
    }
}
