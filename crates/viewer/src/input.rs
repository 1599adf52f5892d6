//! Pointer, touch and wheel handling.
//!
//! The controller only interprets raw positions; it returns [`Gesture`]s that
//! the app applies to the globe rotation and the zoom target.

use foundation::math::Vec2;

use crate::config::ControlsConfig;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerState {
    Idle,
    Dragging { last: Vec2 },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Gesture {
    /// `yaw` is added to the Y rotation, `pitch` to the X rotation.
    Rotate { yaw: f64, pitch: f64 },
    /// Change of the zoom target distance (positive zooms out).
    Zoom { delta: f64 },
}

#[derive(Debug, Clone)]
pub struct InputController {
    pointer: PointerState,
    pinch_distance: Option<f64>,
    /// Accumulated travel of the current press, in pixels.
    travelled_px: f64,
    /// The current (or last) press turned into a drag or pinch.
    dragged: bool,
    drag_speed: f64,
    wheel_speed: f64,
    pinch_speed: f64,
    drag_slop_px: f64,
}

impl InputController {
    pub fn new(controls: &ControlsConfig) -> Self {
        Self {
            pointer: PointerState::Idle,
            pinch_distance: None,
            travelled_px: 0.0,
            dragged: false,
            drag_speed: controls.drag_speed,
            wheel_speed: controls.wheel_speed,
            pinch_speed: controls.pinch_speed,
            drag_slop_px: controls.drag_slop_px.max(0.0),
        }
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.pointer, PointerState::Dragging { .. })
    }

    /// Whether a click/tap ending the current press should pick.
    pub fn allows_pick(&self) -> bool {
        !self.dragged
    }

    pub fn pointer_down(&mut self, pos: Vec2) {
        self.pointer = PointerState::Dragging { last: pos };
        self.travelled_px = 0.0;
        self.dragged = false;
    }

    pub fn pointer_move(&mut self, pos: Vec2) -> Option<Gesture> {
        let PointerState::Dragging { last } = self.pointer else {
            return None;
        };
        let delta = pos - last;
        self.pointer = PointerState::Dragging { last: pos };
        self.travelled_px += delta.length();
        if self.travelled_px > self.drag_slop_px {
            self.dragged = true;
        }
        Some(Gesture::Rotate {
            yaw: delta.x * self.drag_speed,
            pitch: delta.y * self.drag_speed,
        })
    }

    pub fn pointer_up(&mut self) {
        self.pointer = PointerState::Idle;
    }

    /// `touches` is the full list of active touches after the start.
    pub fn touch_start(&mut self, touches: &[Vec2]) {
        match touches {
            [one] => self.pointer_down(*one),
            [a, b, ..] => {
                self.pinch_distance = Some(a.distance(*b));
                self.dragged = true;
            }
            [] => {}
        }
    }

    pub fn touch_move(&mut self, touches: &[Vec2]) -> Option<Gesture> {
        match touches {
            [one] => self.pointer_move(*one),
            [a, b, ..] => {
                let distance = a.distance(*b);
                let previous = self.pinch_distance.replace(distance)?;
                self.dragged = true;
                // Spreading the fingers apart moves the camera closer.
                Some(Gesture::Zoom {
                    delta: -(distance - previous) * self.pinch_speed,
                })
            }
            [] => None,
        }
    }

    pub fn touch_end(&mut self, remaining: usize) {
        self.pointer = PointerState::Idle;
        if remaining < 2 {
            self.pinch_distance = None;
        }
    }

    pub fn wheel(&self, delta_y: f64) -> Gesture {
        Gesture::Zoom {
            delta: delta_y * self.wheel_speed,
        }
    }
}
