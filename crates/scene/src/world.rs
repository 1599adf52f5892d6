use crate::components::{Drawable3D, MarkerInfo, TextureId, TextureSource, Transform, Visibility};
use crate::entity::EntityId;
use foundation::handles::Handle;
use foundation::math::{Mat4, Vec3};

/// Scene graph: per-entity component columns plus a texture table.
///
/// Entities are never despawned; the scene is assembled once at startup.
#[derive(Debug, Default)]
pub struct World {
    next_index: u32,
    transforms: Vec<Option<Transform>>,
    parents: Vec<Option<EntityId>>,
    visibility: Vec<Option<Visibility>>,
    drawables_3d: Vec<Option<Drawable3D>>,
    markers: Vec<Option<MarkerInfo>>,
    textures: Vec<TextureSource>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self) -> EntityId {
        let id = EntityId(Handle::new(self.next_index));
        self.next_index += 1;
        self.ensure_capacity(id.index() as usize);
        id
    }

    pub fn len(&self) -> usize {
        self.next_index as usize
    }

    pub fn is_empty(&self) -> bool {
        self.next_index == 0
    }

    pub fn set_transform(&mut self, entity: EntityId, transform: Transform) {
        self.ensure_capacity(entity.index() as usize);
        self.transforms[entity.index() as usize] = Some(transform);
    }

    pub fn transform(&self, entity: EntityId) -> Option<Transform> {
        self.transforms
            .get(entity.index() as usize)
            .and_then(|t| *t)
    }

    pub fn transform_mut(&mut self, entity: EntityId) -> Option<&mut Transform> {
        self.transforms
            .get_mut(entity.index() as usize)
            .and_then(|t| t.as_mut())
    }

    /// Attach `entity` to `parent`; the child's transform becomes parent-relative.
    pub fn set_parent(&mut self, entity: EntityId, parent: EntityId) {
        self.ensure_capacity(entity.index() as usize);
        self.parents[entity.index() as usize] = Some(parent);
    }

    pub fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.parents.get(entity.index() as usize).and_then(|p| *p)
    }

    pub fn set_visibility(&mut self, entity: EntityId, visibility: Visibility) {
        self.ensure_capacity(entity.index() as usize);
        self.visibility[entity.index() as usize] = Some(visibility);
    }

    pub fn is_visible(&self, entity: EntityId) -> bool {
        self.visibility
            .get(entity.index() as usize)
            .and_then(|v| *v)
            .map(|v| v.visible)
            .unwrap_or(true)
    }

    pub fn set_drawable_3d(&mut self, entity: EntityId, drawable: Drawable3D) {
        self.ensure_capacity(entity.index() as usize);
        self.drawables_3d[entity.index() as usize] = Some(drawable);
    }

    pub fn drawable_3d(&self, entity: EntityId) -> Option<Drawable3D> {
        self.drawables_3d
            .get(entity.index() as usize)
            .and_then(|d| *d)
    }

    pub fn set_marker(&mut self, entity: EntityId, marker: MarkerInfo) {
        self.ensure_capacity(entity.index() as usize);
        self.markers[entity.index() as usize] = Some(marker);
    }

    pub fn marker(&self, entity: EntityId) -> Option<&MarkerInfo> {
        self.markers
            .get(entity.index() as usize)
            .and_then(|m| m.as_ref())
    }

    pub fn markers(&self) -> impl Iterator<Item = (EntityId, &MarkerInfo)> {
        self.markers.iter().enumerate().filter_map(|(idx, m)| {
            m.as_ref()
                .map(|m| (EntityId(Handle::new(idx as u32)), m))
        })
    }

    pub fn add_texture(&mut self, source: TextureSource) -> TextureId {
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(source);
        id
    }

    pub fn texture(&self, id: TextureId) -> Option<&TextureSource> {
        self.textures.get(id.0 as usize)
    }

    pub fn textures(&self) -> impl Iterator<Item = (TextureId, &TextureSource)> {
        self.textures
            .iter()
            .enumerate()
            .map(|(idx, t)| (TextureId(idx as u32), t))
    }

    /// Local-to-world matrix, composing parent transforms.
    ///
    /// Entities without a transform contribute identity. Parent chains are
    /// bounded by the entity count so an accidental cycle cannot hang.
    pub fn world_matrix(&self, entity: EntityId) -> Mat4 {
        let mut m = self
            .transform(entity)
            .map(|t| t.matrix())
            .unwrap_or(Mat4::IDENTITY);
        let mut current = self.parent(entity);
        let mut hops = 0usize;
        while let Some(parent) = current {
            if hops > self.len() {
                break;
            }
            let pm = self
                .transform(parent)
                .map(|t| t.matrix())
                .unwrap_or(Mat4::IDENTITY);
            m = pm.mul(&m);
            current = self.parent(parent);
            hops += 1;
        }
        m
    }

    pub fn world_position(&self, entity: EntityId) -> Vec3 {
        self.world_matrix(entity).transform_point(Vec3::ZERO)
    }

    /// Visible drawables with their world matrices, in entity index order.
    pub fn drawables_3d(&self) -> Vec<(EntityId, Mat4, Drawable3D)> {
        let mut out = Vec::new();
        for (idx, drawable) in self.drawables_3d.iter().enumerate() {
            let Some(drawable) = drawable else { continue };
            let entity = EntityId(Handle::new(idx as u32));
            if self.transform(entity).is_none() || !self.visible_in_hierarchy(entity) {
                continue;
            }
            out.push((entity, self.world_matrix(entity), *drawable));
        }
        out
    }

    fn visible_in_hierarchy(&self, entity: EntityId) -> bool {
        let mut current = Some(entity);
        let mut hops = 0usize;
        while let Some(e) = current {
            if !self.is_visible(e) {
                return false;
            }
            if hops > self.len() {
                break;
            }
            current = self.parent(e);
            hops += 1;
        }
        true
    }

    fn ensure_capacity(&mut self, idx: usize) {
        if self.transforms.len() <= idx {
            let new_len = idx + 1;
            self.transforms.resize(new_len, None);
            self.parents.resize(new_len, None);
            self.visibility.resize(new_len, None);
            self.drawables_3d.resize(new_len, None);
            self.markers.resize(new_len, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::World;
    use crate::components::{
        Drawable3D, EulerXY, MarkerInfo, TextureSource, Transform, Visibility,
    };
    use foundation::math::{Vec2, Vec3};

    #[test]
    fn spawn_and_collect_drawables() {
        let mut world = World::new();
        let entity = world.spawn();
        world.set_transform(entity, Transform::identity());
        world.set_drawable_3d(entity, Drawable3D::sphere(5.0, 32));

        let drawables = world.drawables_3d();
        assert_eq!(drawables.len(), 1);
        assert_eq!(drawables[0].0, entity);
    }

    #[test]
    fn hidden_parent_hides_children() {
        let mut world = World::new();
        let parent = world.spawn();
        world.set_transform(parent, Transform::identity());
        world.set_drawable_3d(parent, Drawable3D::sphere(1.0, 8));
        let child = world.spawn();
        world.set_transform(child, Transform::translate(Vec3::X));
        world.set_drawable_3d(child, Drawable3D::sprite(Vec2::new(1.0, 1.0)));
        world.set_parent(child, parent);

        world.set_visibility(parent, Visibility::hidden());
        assert!(world.drawables_3d().is_empty());
    }

    #[test]
    fn children_follow_parent_rotation() {
        let mut world = World::new();
        let parent = world.spawn();
        world.set_transform(parent, Transform::identity());
        let child = world.spawn();
        world.set_transform(child, Transform::translate(Vec3::new(1.0, 0.0, 0.0)));
        world.set_parent(child, parent);

        if let Some(t) = world.transform_mut(parent) {
            t.rotation = EulerXY::new(0.0, std::f64::consts::FRAC_PI_2);
        }
        let p = world.world_position(child);
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn markers_and_textures_are_indexed() {
        let mut world = World::new();
        let plain = world.spawn();
        let flagged = world.spawn();
        world.set_marker(flagged, MarkerInfo::new("Brazil", "https://example.org/br"));
        let tex = world.add_texture(TextureSource::Url("flag.png".into()));

        assert!(world.marker(plain).is_none());
        assert_eq!(world.marker(flagged).map(|m| m.description.as_str()), Some("Brazil"));
        assert_eq!(world.markers().count(), 1);
        assert_eq!(world.texture(tex), Some(&TextureSource::Url("flag.png".into())));
    }
}
