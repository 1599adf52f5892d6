use foundation::math::{Mat4, Vec2, Vec3};
use scene::picking::Ray;

/// Perspective camera orbiting a target on the +Z side.
///
/// The camera sits at `target + (0, 0, distance)` looking at `target` with +Y up;
/// zoom changes `distance` only.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera3D {
    pub target: Vec3,
    pub distance: f64,
    pub fov_y_rad: f64,
    pub near: f64,
    pub far: f64,
    pub viewport: Vec2,
}

/// Orthonormal camera frame in world space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraBasis {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl Camera3D {
    pub fn new(distance: f64, fov_y_deg: f64, near: f64, far: f64, viewport: Vec2) -> Self {
        Self {
            target: Vec3::ZERO,
            distance,
            fov_y_rad: fov_y_deg.to_radians(),
            near,
            far,
            viewport,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.target + Vec3::new(0.0, 0.0, self.distance)
    }

    pub fn aspect(&self) -> f64 {
        if self.viewport.y <= 0.0 {
            1.0
        } else {
            (self.viewport.x / self.viewport.y).max(1e-6)
        }
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
    }

    pub fn basis(&self) -> CameraBasis {
        let forward = (self.target - self.position())
            .normalized()
            .unwrap_or(Vec3::new(0.0, 0.0, -1.0));
        let right = forward.cross(Vec3::Y).normalized().unwrap_or(Vec3::X);
        let up = right.cross(forward);
        CameraBasis { forward, right, up }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_z0(self.fov_y_rad, self.aspect(), self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection().mul(&self.view())
    }

    /// Pixel position to normalized device coordinates (+Y up).
    pub fn screen_to_ndc(&self, x_px: f64, y_px: f64) -> Vec2 {
        Vec2::new(
            (x_px / self.viewport.x) * 2.0 - 1.0,
            -(y_px / self.viewport.y) * 2.0 + 1.0,
        )
    }

    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let b = self.basis();
        let tan_half = (0.5 * self.fov_y_rad).tan();
        let dir = b.forward + b.right * (ndc.x * tan_half * self.aspect()) + b.up * (ndc.y * tan_half);
        Ray::new(self.position(), dir)
    }

    /// Ray from the eye through pixel `(x_px, y_px)`; `None` for a degenerate viewport.
    pub fn screen_ray(&self, x_px: f64, y_px: f64) -> Option<Ray> {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return None;
        }
        Some(self.ray_from_ndc(self.screen_to_ndc(x_px, y_px)))
    }

    /// World point to pixel position; `None` when behind the camera.
    pub fn world_to_screen(&self, p: Vec3) -> Option<Vec2> {
        let ndc = self.view_proj().project_point(p)?;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::Camera3D;
    use foundation::math::{Vec2, Vec3};

    fn camera() -> Camera3D {
        Camera3D::new(15.0, 75.0, 0.1, 1000.0, Vec2::new(1280.0, 720.0))
    }

    #[test]
    fn center_pixel_looks_at_target() {
        let cam = camera();
        let ray = cam.screen_ray(640.0, 360.0).expect("ray");
        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 15.0));
        let dir = ray.dir.normalized().expect("dir");
        assert!((dir - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn ndc_flips_y() {
        let cam = camera();
        assert_eq!(cam.screen_to_ndc(0.0, 0.0), Vec2::new(-1.0, 1.0));
        assert_eq!(cam.screen_to_ndc(1280.0, 720.0), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn screen_ray_passes_through_projected_point() {
        let cam = camera();
        let p = Vec3::new(3.0, -1.25, 4.0);
        let px = cam.world_to_screen(p).expect("in front");
        let ray = cam.screen_ray(px.x, px.y).expect("ray");

        // Distance from p to the ray line.
        let dir = ray.dir.normalized().expect("dir");
        let v = p - ray.origin;
        let along = dir * v.dot(dir);
        assert!((v - along).length() < 1e-9);
    }

    #[test]
    fn behind_camera_does_not_project() {
        let cam = camera();
        assert!(cam.world_to_screen(Vec3::new(0.0, 0.0, 20.0)).is_none());
    }
}
