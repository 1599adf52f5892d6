//! Application state for the globe viewer.
//!
//! Everything here is host-agnostic: the wasm shell turns DOM events into
//! [`InputEvent`]s, calls [`GlobeApp::dispatch`] and [`GlobeApp::tick`], and
//! applies the returned [`Effect`]s.

pub mod app;
pub mod config;
pub mod error;
pub mod event;
pub mod input;
pub mod popup;
pub mod zoom;

pub use app::*;
pub use config::{ConfigError, ViewerConfig};
pub use error::*;
pub use event::*;
