use foundation::math::Vec2;

/// Where a click landed, as classified by the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventTarget {
    /// The globe canvas.
    Scene,
    /// Inside the popup, outside its link.
    Popup,
    /// The popup's "Visit" link.
    PopupLink,
    /// Anywhere else in the document.
    Other,
}

/// Host input, in CSS pixels relative to the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { pos: Vec2 },
    PointerMove { pos: Vec2 },
    PointerUp,
    /// `touches` lists every active touch; `target` is where the new one landed.
    TouchStart {
        touches: Vec<Vec2>,
        target: EventTarget,
    },
    TouchMove { touches: Vec<Vec2> },
    /// `changed` is the lifted touch; `remaining` the touches still down.
    TouchEnd {
        changed: Option<Vec2>,
        remaining: usize,
        target: EventTarget,
    },
    Wheel { delta_y: f64 },
    Click { pos: Vec2, target: EventTarget },
    Resize { width: f64, height: f64 },
    /// The host reached the end of the current event-loop task.
    TickBoundary,
}

/// Popup contents and its page position (CSS pixels).
#[derive(Debug, Clone, PartialEq)]
pub struct PopupView {
    pub description: String,
    pub url: String,
    pub left_px: f64,
    pub top_px: f64,
}

/// Side effects the host applies after a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ShowPopup(PopupView),
    HidePopup,
    OpenLink(String),
    ResizeSurface { width: u32, height: u32 },
}
