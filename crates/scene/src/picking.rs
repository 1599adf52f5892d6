use foundation::math::Vec3;
use foundation::math::precision::stable_total_cmp_f64;

use crate::World;
use crate::components::Shape3D;
use crate::entity::EntityId;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    pub entity: EntityId,
    pub distance: f64,
    pub point: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    pub max_distance: f64,
    /// Camera right axis; sprites are billboards spanned by `right`/`up`.
    pub billboard_right: Vec3,
    /// Camera up axis.
    pub billboard_up: Vec3,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            max_distance: 1.0e30,
            billboard_right: Vec3::X,
            billboard_up: Vec3::Y,
        }
    }
}

/// Deterministic ray picking over visible drawables.
///
/// Ordering contract:
/// - The closest hit along the (normalized) ray wins.
/// - If multiple entities are hit at the same distance, the lower `EntityId::index()` wins.
///
/// Spheres are intersected analytically; sprites as camera-facing quads.
/// Hidden entities (or entities under a hidden parent) are ignored.
pub fn pick_ray(world: &World, ray: Ray, opts: PickOptions) -> Option<PickHit> {
    let dir = ray.dir.normalized()?;
    let ray = Ray::new(ray.origin, dir);

    let mut best: Option<(f64, EntityId)> = None;

    for (entity, matrix, drawable) in world.drawables_3d() {
        let center = matrix.transform_point(Vec3::ZERO);
        let scale = axis_scale(&matrix);

        let t = match drawable.shape {
            Shape3D::Sphere { radius, .. } => ray_sphere_hit_t(&ray, center, radius * scale.x),
            Shape3D::Sprite { size } => ray_billboard_hit_t(
                &ray,
                center,
                size.x * scale.x * 0.5,
                size.y * scale.y * 0.5,
                opts.billboard_right,
                opts.billboard_up,
            ),
        };
        let Some(t) = t else { continue };
        if t > opts.max_distance {
            continue;
        }

        best = match best {
            None => Some((t, entity)),
            Some((bt, be)) => {
                let ord = stable_total_cmp_f64(t, bt).then_with(|| entity.index().cmp(&be.index()));
                if ord.is_lt() {
                    Some((t, entity))
                } else {
                    Some((bt, be))
                }
            }
        };
    }

    let (t, entity) = best?;
    Some(PickHit {
        entity,
        distance: t,
        point: ray.at(t),
    })
}

/// Screen picking wrapper.
///
/// The caller supplies the screen->ray mapping via `make_ray` (usually the
/// camera's unprojection).
pub fn pick_screen<F>(
    world: &World,
    x_px: f64,
    y_px: f64,
    mut make_ray: F,
    opts: PickOptions,
) -> Option<PickHit>
where
    F: FnMut(f64, f64) -> Option<Ray>,
{
    let ray = make_ray(x_px, y_px)?;
    pick_ray(world, ray, opts)
}

fn axis_scale(m: &foundation::math::Mat4) -> Vec3 {
    let c = &m.cols;
    Vec3::new(
        Vec3::new(c[0][0], c[0][1], c[0][2]).length(),
        Vec3::new(c[1][0], c[1][1], c[1][2]).length(),
        Vec3::new(c[2][0], c[2][1], c[2][2]).length(),
    )
}

/// Nearest non-negative hit distance; a ray starting inside returns the exit.
fn ray_sphere_hit_t(ray: &Ray, center: Vec3, radius: f64) -> Option<f64> {
    if radius <= 0.0 {
        return None;
    }
    let oc = ray.origin - center;
    let b = oc.dot(ray.dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let t0 = -b - sq;
    let t1 = -b + sq;
    if t0 >= 0.0 {
        Some(t0)
    } else if t1 >= 0.0 {
        Some(t1)
    } else {
        None
    }
}

fn ray_billboard_hit_t(
    ray: &Ray,
    center: Vec3,
    half_w: f64,
    half_h: f64,
    right: Vec3,
    up: Vec3,
) -> Option<f64> {
    let normal = right.cross(up).normalized()?;
    let denom = ray.dir.dot(normal);
    if denom.abs() < 1e-12 {
        return None;
    }
    let t = (center - ray.origin).dot(normal) / denom;
    if t < 0.0 {
        return None;
    }
    let local = ray.at(t) - center;
    if local.dot(right).abs() <= half_w && local.dot(up).abs() <= half_h {
        Some(t)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{PickOptions, Ray, pick_ray, pick_screen};
    use crate::World;
    use crate::components::{Drawable3D, Transform, Visibility};
    use foundation::math::{Vec2, Vec3};

    fn sprite_at(world: &mut World, position: Vec3) -> crate::entity::EntityId {
        let e = world.spawn();
        world.set_transform(e, Transform::translate(position));
        world.set_drawable_3d(e, Drawable3D::sprite(Vec2::new(1.0, 1.0)));
        e
    }

    #[test]
    fn ray_picks_nearest_hit() {
        let mut world = World::new();
        let globe = world.spawn();
        world.set_transform(globe, Transform::identity());
        world.set_drawable_3d(globe, Drawable3D::sphere(5.0, 16));
        let flag = sprite_at(&mut world, Vec3::new(0.0, 0.0, 5.1));

        let ray = Ray::new(Vec3::new(0.0, 0.0, 15.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = pick_ray(&world, ray, PickOptions::default()).expect("hit");
        assert_eq!(hit.entity, flag);
        assert!((hit.distance - 9.9).abs() < 1e-9);
    }

    #[test]
    fn sphere_hit_reports_surface_point() {
        let mut world = World::new();
        let globe = world.spawn();
        world.set_transform(globe, Transform::identity());
        world.set_drawable_3d(globe, Drawable3D::sphere(5.0, 16));

        let ray = Ray::new(Vec3::new(0.0, 0.0, 15.0), Vec3::new(0.0, 0.0, -2.0));
        let hit = pick_ray(&world, ray, PickOptions::default()).expect("hit");
        assert_eq!(hit.entity, globe);
        assert!((hit.point - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-9);
    }

    #[test]
    fn misses_outside_sprite_extent() {
        let mut world = World::new();
        sprite_at(&mut world, Vec3::ZERO);
        let ray = Ray::new(Vec3::new(0.6, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(pick_ray(&world, ray, PickOptions::default()).is_none());
    }

    #[test]
    fn tie_breaks_by_entity_index() {
        let mut world = World::new();
        let first = sprite_at(&mut world, Vec3::ZERO);
        let _second = sprite_at(&mut world, Vec3::ZERO);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = pick_ray(&world, ray, PickOptions::default()).expect("hit");
        assert_eq!(hit.entity, first);
    }

    #[test]
    fn hidden_entities_are_not_pickable() {
        let mut world = World::new();
        let e = sprite_at(&mut world, Vec3::ZERO);
        world.set_visibility(e, Visibility::hidden());
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(pick_ray(&world, ray, PickOptions::default()).is_none());
    }

    #[test]
    fn screen_pick_without_ray_is_none() {
        let mut world = World::new();
        sprite_at(&mut world, Vec3::ZERO);
        let hit = pick_screen(&world, 10.0, 10.0, |_, _| None, PickOptions::default());
        assert!(hit.is_none());
    }
}
