use crate::World;
use crate::components::{Drawable3D, TextureSource, Transform};
use crate::entity::EntityId;

/// Spawn the Earth sphere at the origin, textured from `texture_url` when given.
pub fn spawn_globe(
    world: &mut World,
    radius: f64,
    segments: u32,
    texture_url: Option<&str>,
) -> EntityId {
    let entity = world.spawn();
    world.set_transform(entity, Transform::identity());

    let mut drawable = Drawable3D::sphere(radius, segments.max(3));
    if let Some(url) = texture_url {
        let tex = world.add_texture(TextureSource::Url(url.to_string()));
        drawable = drawable.with_texture(tex);
    }
    world.set_drawable_3d(entity, drawable);
    entity
}

#[cfg(test)]
mod tests {
    use super::spawn_globe;
    use crate::World;
    use crate::components::{Shape3D, TextureSource};

    #[test]
    fn spawns_textured_globe_drawable() {
        let mut world = World::new();
        let entity = spawn_globe(&mut world, 5.0, 32, Some("earth.jpg"));

        let drawables = world.drawables_3d();
        assert_eq!(drawables.len(), 1);
        assert_eq!(drawables[0].0, entity);

        let drawable = drawables[0].2;
        assert!(matches!(
            drawable.shape,
            Shape3D::Sphere {
                radius: 5.0,
                segments: 32
            }
        ));
        let tex = drawable.texture.expect("texture");
        assert_eq!(
            world.texture(tex),
            Some(&TextureSource::Url("earth.jpg".to_string()))
        );
    }

    #[test]
    fn untextured_globe_has_no_texture() {
        let mut world = World::new();
        spawn_globe(&mut world, 5.0, 1, None);
        let drawable = world.drawables_3d()[0].2;
        assert!(drawable.texture.is_none());
        assert!(matches!(drawable.shape, Shape3D::Sphere { segments: 3, .. }));
    }
}
