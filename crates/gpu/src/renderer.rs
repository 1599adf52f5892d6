use foundation::math::{Mat4, Vec2, Vec3};
use scene::components::{Shape3D, TextureId};
use scene::starfield::Starfield;
use scene::world::World;

use crate::camera::Camera3D;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RenderCommand {
    /// Textured UV sphere; `model` includes the entity's rotation.
    Sphere {
        model: Mat4,
        radius: f64,
        segments: u32,
        texture: Option<TextureId>,
    },
    /// Camera-facing quad centered on `center` (world space).
    Sprite {
        center: Vec3,
        size: Vec2,
        texture: Option<TextureId>,
    },
}

/// One star as uploaded to the point pipeline: world position + alpha.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StarPoint {
    pub position: [f32; 3],
    pub alpha: f32,
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Default)]
pub struct RenderFrame {
    pub view_proj: Mat4,
    pub camera_right: Vec3,
    pub camera_up: Vec3,
    pub commands: Vec<RenderCommand>,
    pub stars: Vec<StarPoint>,
}

impl RenderFrame {
    /// Six world-space corners (two triangles) for a sprite, with UVs.
    pub fn sprite_corners(&self, center: Vec3, size: Vec2) -> [([f32; 3], [f32; 2]); 6] {
        let r = self.camera_right * (size.x * 0.5);
        let u = self.camera_up * (size.y * 0.5);
        let bl = (center - r - u).to_f32();
        let br = (center + r - u).to_f32();
        let tl = (center - r + u).to_f32();
        let tr = (center + r + u).to_f32();
        [
            (bl, [0.0, 1.0]),
            (br, [1.0, 1.0]),
            (tr, [1.0, 0.0]),
            (bl, [0.0, 1.0]),
            (tr, [1.0, 0.0]),
            (tl, [0.0, 0.0]),
        ]
    }
}

pub struct Renderer;

impl Renderer {
    /// Translate the world into draw commands. Spheres are emitted before
    /// sprites so blended billboards draw over the opaque globe.
    pub fn collect(world: &World, camera: &Camera3D) -> RenderFrame {
        let basis = camera.basis();
        let mut frame = RenderFrame {
            view_proj: camera.view_proj(),
            camera_right: basis.right,
            camera_up: basis.up,
            ..Default::default()
        };

        let mut sprites = Vec::new();
        for (_, matrix, drawable) in world.drawables_3d() {
            match drawable.shape {
                Shape3D::Sphere { radius, segments } => {
                    frame.commands.push(RenderCommand::Sphere {
                        model: matrix,
                        radius,
                        segments,
                        texture: drawable.texture,
                    });
                }
                Shape3D::Sprite { size } => sprites.push(RenderCommand::Sprite {
                    center: matrix.transform_point(Vec3::ZERO),
                    size,
                    texture: drawable.texture,
                }),
            }
        }
        frame.commands.extend(sprites);
        frame
    }

    /// Star points with the per-star opacity scaled by the global pulse.
    pub fn collect_stars(frame: &mut RenderFrame, starfield: &Starfield) {
        let global = starfield.global_opacity() as f32;
        frame.stars.clear();
        frame.stars.extend(
            starfield
                .stars()
                .iter()
                .zip(starfield.opacities())
                .map(|(star, opacity)| StarPoint {
                    position: star.position.to_f32(),
                    alpha: (opacity * global).clamp(0.0, 1.0),
                }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{RenderCommand, RenderFrame, Renderer};
    use crate::camera::Camera3D;
    use foundation::math::{Vec2, Vec3};
    use scene::components::{Drawable3D, Transform};
    use scene::starfield::{Star, Starfield};
    use scene::world::World;

    fn camera() -> Camera3D {
        Camera3D::new(15.0, 75.0, 0.1, 1000.0, Vec2::new(800.0, 600.0))
    }

    #[test]
    fn spheres_are_drawn_before_sprites() {
        let mut world = World::new();
        let sprite = world.spawn();
        world.set_transform(sprite, Transform::translate(Vec3::new(0.0, 0.0, 5.1)));
        world.set_drawable_3d(sprite, Drawable3D::sprite(Vec2::new(0.5, 0.5)));
        let globe = world.spawn();
        world.set_transform(globe, Transform::identity());
        world.set_drawable_3d(globe, Drawable3D::sphere(5.0, 32));

        let frame = Renderer::collect(&world, &camera());
        assert!(matches!(
            frame.commands.as_slice(),
            [RenderCommand::Sphere { .. }, RenderCommand::Sprite { .. }]
        ));
    }

    #[test]
    fn sprite_corners_span_the_requested_size() {
        let frame = RenderFrame {
            camera_right: Vec3::X,
            camera_up: Vec3::Y,
            ..Default::default()
        };
        let corners = frame.sprite_corners(Vec3::new(1.0, 1.0, 0.0), Vec2::new(2.0, 1.0));
        assert_eq!(corners[0].0, [0.0, 0.5, 0.0]);
        assert_eq!(corners[2].0, [2.0, 1.5, 0.0]);
    }

    #[test]
    fn star_alpha_combines_global_and_per_star_opacity() {
        let stars = vec![Star {
            position: Vec3::new(1.0, 2.0, 3.0),
            velocity: Vec3::ZERO,
            phase: 0.0,
        }];
        let mut field = Starfield::from_stars(stars, 1000.0, true);
        field.step(1.0, 0.3);

        let mut frame = RenderFrame::default();
        Renderer::collect_stars(&mut frame, &field);
        assert_eq!(frame.stars.len(), 1);
        let expected = field.opacities()[0] * field.global_opacity() as f32;
        assert_eq!(frame.stars[0].alpha, expected.clamp(0.0, 1.0));
        assert_eq!(frame.stars[0].position, [1.0, 2.0, 3.0]);
    }
}
