use foundation::math::{Mat4, Vec3};

/// Euler rotation applied in X-then-Y order (`R = Rx * Ry`).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct EulerXY {
    pub x: f64,
    pub y: f64,
}

impl EulerXY {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::rotation_x(self.x).mul(&Mat4::rotation_y(self.y))
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: EulerXY,
    pub scale: Vec3,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: EulerXY::default(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn translate(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Local-to-parent matrix: `T * R * S`.
    pub fn matrix(&self) -> Mat4 {
        Mat4::translation(self.position)
            .mul(&self.rotation.matrix())
            .mul(&Mat4::scale(self.scale))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
