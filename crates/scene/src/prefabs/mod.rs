pub mod globe;
pub mod markers;

pub use globe::*;
pub use markers::*;
