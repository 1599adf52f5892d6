use foundation::math::{Vec2, Vec3, lat_lon_to_vec3};

use crate::World;
use crate::components::{Drawable3D, MarkerInfo, TextureSource, Transform};
use crate::entity::EntityId;
use crate::labels::{LabelImage, LabelStyle, TextMeasure, label_text};

/// A location to pin on the globe.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub image_url: String,
    pub description: String,
    pub url: String,
}

/// Placement of flag sprites relative to the globe surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FlagStyle {
    /// Height above the globe radius.
    pub lift: f64,
    pub size: Vec2,
}

impl Default for FlagStyle {
    fn default() -> Self {
        Self {
            lift: 0.1,
            size: Vec2::new(0.5, 0.5),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MarkerEntities {
    pub flag: EntityId,
    pub label: EntityId,
}

/// Pin `spec` to `globe`: a clickable flag billboard carrying the marker
/// metadata, plus a text label beside it. Both are children of the globe so
/// they rotate with it.
pub fn spawn_marker(
    world: &mut World,
    globe: EntityId,
    globe_radius: f64,
    spec: &MarkerSpec,
    flag_style: FlagStyle,
    label_style: &LabelStyle,
    measure: &dyn TextMeasure,
) -> MarkerEntities {
    let position = lat_lon_to_vec3(spec.lat_deg, spec.lon_deg, globe_radius + flag_style.lift);

    let flag_tex = world.add_texture(TextureSource::Url(spec.image_url.clone()));
    let flag = world.spawn();
    world.set_transform(flag, Transform::translate(position));
    world.set_parent(flag, globe);
    world.set_drawable_3d(flag, Drawable3D::sprite(flag_style.size).with_texture(flag_tex));
    world.set_marker(flag, MarkerInfo::new(spec.description.clone(), spec.url.clone()));

    let image = LabelImage::layout(label_text(&spec.description), label_style, measure);
    let size = image.sprite_size(label_style.px_per_unit);
    let label_tex = world.add_texture(TextureSource::Label(image));
    let label = world.spawn();
    world.set_transform(label, Transform::translate(label_position(position, label_style)));
    world.set_parent(label, globe);
    world.set_drawable_3d(label, Drawable3D::sprite(size).with_texture(label_tex));

    MarkerEntities { flag, label }
}

/// Label anchor for a flag at `position` (parent-local).
pub fn label_position(position: Vec3, style: &LabelStyle) -> Vec3 {
    position + style.offset
}
