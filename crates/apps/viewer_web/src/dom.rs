use foundation::math::Vec2;
use viewer::{EventTarget, PopupView};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Document, Element, Event, HtmlCanvasElement, Node, TouchList};

pub fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("window missing"))
}

pub fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("document missing"))
}

/// Inner size of the browser viewport in CSS pixels.
pub fn viewport_size() -> Result<Vec2, JsValue> {
    let window = window()?;
    let w = window.inner_width()?.as_f64().unwrap_or(1.0);
    let h = window.inner_height()?.as_f64().unwrap_or(1.0);
    Ok(Vec2::new(w.max(1.0), h.max(1.0)))
}

/// A registered DOM event listener; removed again on drop.
pub struct Listener {
    target: web_sys::EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    /// `passive: Some(false)` is required for handlers that call
    /// `preventDefault` on touch and wheel events.
    pub fn new<F>(
        target: &web_sys::EventTarget,
        kind: &'static str,
        passive: Option<bool>,
        handler: F,
    ) -> Result<Self, JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        match passive {
            Some(passive) => {
                let opts = AddEventListenerOptions::new();
                opts.set_passive(passive);
                target.add_event_listener_with_callback_and_add_event_listener_options(
                    kind,
                    closure.as_ref().unchecked_ref(),
                    &opts,
                )?;
            }
            None => {
                target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
            }
        }
        Ok(Self {
            target: target.clone(),
            kind,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

/// Full-viewport canvas appended to `container`.
pub fn create_canvas(
    document: &Document,
    container: &Element,
    size: Vec2,
) -> Result<HtmlCanvasElement, JsValue> {
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()?;
    canvas.set_attribute("style", "display: block;")?;
    resize_canvas(&canvas, size.x as u32, size.y as u32);
    container.append_child(&canvas)?;
    Ok(canvas)
}

pub fn resize_canvas(canvas: &HtmlCanvasElement, width: u32, height: u32) {
    canvas.set_width(width.max(1));
    canvas.set_height(height.max(1));
}

/// Pointer position relative to the canvas' top-left corner.
pub fn canvas_point(canvas: &HtmlCanvasElement, client_x: f64, client_y: f64) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    Vec2::new(client_x - rect.left(), client_y - rect.top())
}

pub fn touch_points(canvas: &HtmlCanvasElement, list: &TouchList) -> Vec<Vec2> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| canvas_point(canvas, t.client_x() as f64, t.client_y() as f64))
        .collect()
}

/// The `div.popup` element currently attached to `document.body`.
pub struct PopupDom {
    element: Element,
    link: Element,
}

impl PopupDom {
    /// Build and attach a popup. `origin` is the canvas' page offset so the
    /// canvas-relative view position can be placed on the page.
    pub fn show(document: &Document, view: &PopupView, origin: Vec2) -> Result<Self, JsValue> {
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("document.body missing"))?;

        let element = document.create_element("div")?;
        element.set_class_name("popup");
        element.set_attribute(
            "style",
            &format!(
                "position: absolute; left: {}px; top: {}px;",
                origin.x + view.left_px,
                origin.y + view.top_px
            ),
        )?;

        let text = document.create_element("span")?;
        text.set_text_content(Some(&view.description));
        element.append_child(&text)?;
        let br = document.create_element("br")?;
        element.append_child(&br)?;

        let link = document.create_element("a")?;
        link.set_class_name("visit-link");
        link.set_attribute("href", &view.url)?;
        link.set_attribute("target", "_blank")?;
        link.set_attribute("rel", "noopener")?;
        link.set_text_content(Some("Visit"));
        element.append_child(&link)?;

        body.append_child(&element)?;
        Ok(Self { element, link })
    }

    pub fn remove(self) {
        self.element.remove();
    }

    fn contains(&self, node: &Node) -> bool {
        self.element.contains(Some(node))
    }

    fn link_contains(&self, node: &Node) -> bool {
        self.link.contains(Some(node))
    }
}

/// Classify where an event landed relative to the canvas and the popup.
pub fn classify_target(
    event: &Event,
    canvas: &HtmlCanvasElement,
    popup: Option<&PopupDom>,
) -> EventTarget {
    let Some(node) = event.target().and_then(|t| t.dyn_into::<Node>().ok()) else {
        return EventTarget::Other;
    };
    if let Some(popup) = popup {
        if popup.link_contains(&node) {
            return EventTarget::PopupLink;
        }
        if popup.contains(&node) {
            return EventTarget::Popup;
        }
    }
    let canvas_node: &Node = canvas.as_ref();
    if canvas_node.is_same_node(Some(&node)) {
        EventTarget::Scene
    } else {
        EventTarget::Other
    }
}
