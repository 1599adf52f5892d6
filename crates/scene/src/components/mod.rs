pub mod drawable3d;
pub mod marker;
pub mod texture;
pub mod transform;
pub mod visibility;

pub use drawable3d::*;
pub use marker::*;
pub use texture::*;
pub use transform::*;
pub use visibility::*;
