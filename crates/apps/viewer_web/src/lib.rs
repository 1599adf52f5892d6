use console_error_panic_hook::set_once;
use gloo_net::http::Request;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, error, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Event, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent};

use foundation::math::Vec2;
use runtime::FrameClock;
use scene::components::TextureSource;
use viewer::{Effect, EventTarget, GlobeApp, InputEvent, ViewerConfig, ViewerError};

mod dom;
mod logging;
mod textures;
mod wgpu;

use dom::{Listener, PopupDom};
use textures::CanvasTextMeasure;
use wgpu::GpuContext;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// A running `requestAnimationFrame` loop; cancelled on drop.
struct Animation {
    callback: FrameCallback,
    request_id: Rc<Cell<i32>>,
}

impl Drop for Animation {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(self.request_id.get());
        }
        // Breaks the closure's reference to its own cell.
        self.callback.borrow_mut().take();
    }
}

/// Everything that belongs to one mounted globe. Dropping it removes the
/// canvas, the popup and every listener.
struct Mount {
    id: u64,
    app: GlobeApp,
    canvas: HtmlCanvasElement,
    gpu: Option<GpuContext>,
    popup: Option<PopupDom>,
    clock: FrameClock,
    listeners: Vec<Listener>,
    animation: Option<Animation>,
}

impl Drop for Mount {
    fn drop(&mut self) {
        self.animation.take();
        self.listeners.clear();
        if let Some(popup) = self.popup.take() {
            popup.remove();
        }
        self.canvas.remove();
        info!(mount = self.id, "globe unmounted");
    }
}

impl Mount {
    fn dispatch(&mut self, event: InputEvent) {
        let effects = self.app.dispatch(event);
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        let mut shown = false;
        for effect in effects {
            match effect {
                Effect::ShowPopup(view) => {
                    let shown_popup =
                        dom::document().and_then(|doc| PopupDom::show(&doc, &view, self.page_origin()));
                    match shown_popup {
                        Ok(popup) => {
                            if let Some(old) = self.popup.replace(popup) {
                                old.remove();
                            }
                            shown = true;
                        }
                        Err(err) => warn!("popup could not be shown: {err:?}"),
                    }
                }
                Effect::HidePopup => {
                    if let Some(popup) = self.popup.take() {
                        popup.remove();
                    }
                }
                Effect::OpenLink(url) => {
                    let opened =
                        dom::window().and_then(|w| w.open_with_url_and_target(&url, "_blank"));
                    if let Err(err) = opened {
                        warn!("failed to open {url}: {err:?}");
                    }
                }
                Effect::ResizeSurface { width, height } => {
                    dom::resize_canvas(&self.canvas, width, height);
                    if let Some(gpu) = self.gpu.as_mut() {
                        gpu.resize(width, height);
                    }
                }
            }
        }

        // A freshly opened popup survives the rest of the current event;
        // outside clicks dismiss it from the next task on.
        if shown {
            let id = self.id;
            spawn_local(async move {
                with_mount(id, |m| m.dispatch(InputEvent::TickBoundary));
            });
        }
    }

    /// Page position of the canvas' top-left corner.
    fn page_origin(&self) -> Vec2 {
        let rect = self.canvas.get_bounding_client_rect();
        let (sx, sy) = dom::window()
            .map(|w| (w.scroll_x().unwrap_or(0.0), w.scroll_y().unwrap_or(0.0)))
            .unwrap_or((0.0, 0.0));
        Vec2::new(rect.left() + sx, rect.top() + sy)
    }

    fn classify(&self, event: &Event) -> EventTarget {
        dom::classify_target(event, &self.canvas, self.popup.as_ref())
    }

    fn render(&mut self, timestamp_ms: f64) {
        let frame = self.clock.advance(timestamp_ms);
        self.app.tick(frame);
        if let Some(gpu) = self.gpu.as_mut() {
            if let Err(err) = gpu.render(&self.app.render_frame()) {
                debug!("frame {} skipped: {err:?}", frame.index);
            }
        }
    }
}

#[derive(Default)]
struct ShellState {
    next_id: u64,
    /// Mount waiting on an async config fetch.
    pending: Option<u64>,
    mount: Option<Mount>,
}

thread_local! {
    static STATE: RefCell<ShellState> = RefCell::new(ShellState::default());
}

fn with_mount<R>(id: u64, f: impl FnOnce(&mut Mount) -> R) -> Option<R> {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        state.mount.as_mut().filter(|m| m.id == id).map(f)
    })
}

fn allocate_id() -> u64 {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        state.next_id += 1;
        state.next_id
    })
}

fn to_js(err: ViewerError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    logging::init("info");
    Ok(())
}

/// Handle to a mounted globe, returned to JavaScript.
#[wasm_bindgen]
pub struct GlobeHandle {
    id: u64,
}

#[wasm_bindgen]
impl GlobeHandle {
    /// Stop the render loop and remove the globe from the page. Safe to call
    /// more than once.
    pub fn stop(&self) {
        let old = STATE.with(|state| {
            let mut state = state.borrow_mut();
            if state.pending == Some(self.id) {
                state.pending = None;
            }
            if state.mount.as_ref().is_some_and(|m| m.id == self.id) {
                state.mount.take()
            } else {
                None
            }
        });
        drop(old);
    }
}

/// Mount the globe with the built-in configuration into the element with
/// `container_id` (default `globe`). Graphics start asynchronously.
#[wasm_bindgen]
pub fn mount_globe(container_id: Option<String>) -> Result<GlobeHandle, JsValue> {
    let mut config = ViewerConfig::default();
    if let Some(id) = container_id {
        config.container_id = id;
    }
    let id = allocate_id();
    mount(config, id)?;
    Ok(GlobeHandle { id })
}

/// Fetch a JSON [`ViewerConfig`] from `url`, then mount. A later mount or
/// `stop()` on the returned handle cancels the pending one.
#[wasm_bindgen]
pub fn mount_globe_with_config(url: String) -> GlobeHandle {
    let id = allocate_id();
    STATE.with(|state| state.borrow_mut().pending = Some(id));

    spawn_local(async move {
        let config = match fetch_config(&url).await {
            Ok(config) => config,
            Err(err) => {
                error!("failed to load viewer config from {url}: {err:?}");
                return;
            }
        };
        let current = STATE.with(|state| state.borrow().pending == Some(id));
        if !current {
            debug!(mount = id, "config arrived for a cancelled mount");
            return;
        }
        if let Err(err) = mount(config, id) {
            error!("mount failed: {err:?}");
        }
    });

    GlobeHandle { id }
}

async fn fetch_config(url: &str) -> Result<ViewerConfig, JsValue> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let text = resp
        .text()
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    ViewerConfig::from_json(&text).map_err(|e| to_js(e.into()))
}

fn mount(config: ViewerConfig, id: u64) -> Result<(), JsValue> {
    let document = dom::document()?;
    let size = dom::viewport_size()?;

    let measure = CanvasTextMeasure::new(&document, &config.labels.font_family)?;
    let seed = (js_sys::Math::random() * 9_007_199_254_740_992.0) as u64;
    let (container, app) = GlobeApp::mount(
        config,
        |container_id| document.get_element_by_id(container_id),
        &measure,
        seed,
        size,
    )
    .map_err(to_js)?;

    let canvas = dom::create_canvas(&document, &container, size)?;
    let mut mount = Mount {
        id,
        app,
        canvas: canvas.clone(),
        gpu: None,
        popup: None,
        clock: FrameClock::new(),
        listeners: Vec::new(),
        animation: None,
    };
    // On error `mount` drops here, taking the canvas and listeners with it.
    mount.listeners = install_listeners(id, &document)?;
    mount.animation = Some(start_animation(id)?);

    let previous = STATE.with(|state| {
        let mut state = state.borrow_mut();
        state.pending = None;
        state.mount.replace(mount)
    });
    drop(previous);

    info!(mount = id, width = size.x, height = size.y, "globe mounted");
    spawn_local(init_graphics(id, canvas));
    Ok(())
}

fn start_animation(id: u64) -> Result<Animation, JsValue> {
    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let request_id = Rc::new(Cell::new(0));

    let next = callback.clone();
    let next_id = request_id.clone();
    *callback.borrow_mut() = Some(Closure::new(move |timestamp_ms: f64| {
        if with_mount(id, |m| m.render(timestamp_ms)).is_none() {
            return;
        }
        if let Some(cb) = next.borrow().as_ref() {
            match request_frame(cb) {
                Ok(handle) => next_id.set(handle),
                Err(err) => error!("requestAnimationFrame failed: {err:?}"),
            }
        }
    }));

    if let Some(cb) = callback.borrow().as_ref() {
        request_id.set(request_frame(cb)?);
    }
    Ok(Animation {
        callback,
        request_id,
    })
}

fn request_frame(cb: &Closure<dyn FnMut(f64)>) -> Result<i32, JsValue> {
    dom::window()?.request_animation_frame(cb.as_ref().unchecked_ref())
}

async fn init_graphics(id: u64, canvas: HtmlCanvasElement) {
    let gpu = match GpuContext::new(canvas).await {
        Ok(gpu) => gpu,
        Err(err) => {
            error!("{}", ViewerError::Graphics(format!("{err:?}")));
            return;
        }
    };

    let remote = with_mount(id, |m| {
        let mut gpu = gpu;
        let mut remote = Vec::new();
        let document = dom::document().ok();
        for (tex, source) in m.app.world().textures() {
            match source {
                TextureSource::Url(url) => remote.push((tex, url.clone())),
                TextureSource::Label(label) => {
                    let Some(document) = document.as_ref() else {
                        continue;
                    };
                    match textures::rasterize_label(document, label) {
                        Ok(image) => gpu.upload_texture(tex, &image),
                        Err(err) => warn!("label '{}' not rasterized: {err:?}", label.text),
                    }
                }
            }
        }
        m.gpu = Some(gpu);
        remote
    });
    let Some(remote) = remote else {
        debug!(mount = id, "graphics ready after unmount");
        return;
    };

    for (tex, url) in remote {
        spawn_local(async move {
            match textures::fetch_image(&url).await {
                Ok(image) => {
                    let uploaded = with_mount(id, |m| {
                        if let Some(gpu) = m.gpu.as_mut() {
                            gpu.upload_texture(tex, &image);
                        }
                    });
                    if uploaded.is_some() {
                        debug!(url = %url, width = image.width, height = image.height, "texture loaded");
                    }
                }
                // The object keeps its untextured look.
                Err(err) => warn!("texture {url} failed to load: {err}"),
            }
        });
    }
}

fn mouse_pos(m: &Mount, event: &Event) -> Option<Vec2> {
    let event = event.dyn_ref::<MouseEvent>()?;
    Some(dom::canvas_point(
        &m.canvas,
        event.client_x() as f64,
        event.client_y() as f64,
    ))
}

fn install_listeners(id: u64, document: &web_sys::Document) -> Result<Vec<Listener>, JsValue> {
    let doc: &web_sys::EventTarget = document.as_ref();
    let window = dom::window()?;
    let win: &web_sys::EventTarget = window.as_ref();

    let mut listeners = Vec::new();

    listeners.push(Listener::new(doc, "mousedown", None, move |event| {
        with_mount(id, |m| {
            if m.classify(&event) != EventTarget::Scene {
                return;
            }
            if let Some(pos) = mouse_pos(m, &event) {
                m.dispatch(InputEvent::PointerDown { pos });
            }
        });
    })?);

    listeners.push(Listener::new(doc, "mousemove", None, move |event| {
        with_mount(id, |m| {
            if let Some(pos) = mouse_pos(m, &event) {
                m.dispatch(InputEvent::PointerMove { pos });
            }
        });
    })?);

    listeners.push(Listener::new(doc, "mouseup", None, move |_event| {
        with_mount(id, |m| m.dispatch(InputEvent::PointerUp));
    })?);

    listeners.push(Listener::new(doc, "click", None, move |event| {
        with_mount(id, |m| {
            let target = m.classify(&event);
            if target == EventTarget::PopupLink {
                // Opened through `window.open` instead.
                event.prevent_default();
            }
            let pos = mouse_pos(m, &event).unwrap_or_default();
            m.dispatch(InputEvent::Click { pos, target });
        });
    })?);

    listeners.push(Listener::new(doc, "touchstart", Some(false), move |event| {
        event.prevent_default();
        with_mount(id, |m| {
            if let Some(touch) = event.dyn_ref::<TouchEvent>() {
                let target = m.classify(&event);
                let touches = dom::touch_points(&m.canvas, &touch.touches());
                m.dispatch(InputEvent::TouchStart { touches, target });
            }
        });
    })?);

    listeners.push(Listener::new(doc, "touchmove", Some(false), move |event| {
        event.prevent_default();
        with_mount(id, |m| {
            if let Some(touch) = event.dyn_ref::<TouchEvent>() {
                let touches = dom::touch_points(&m.canvas, &touch.touches());
                m.dispatch(InputEvent::TouchMove { touches });
            }
        });
    })?);

    listeners.push(Listener::new(doc, "touchend", Some(false), move |event| {
        event.prevent_default();
        with_mount(id, |m| {
            let Some(touch) = event.dyn_ref::<TouchEvent>() else {
                return;
            };
            let target = m.classify(&event);
            let changed = dom::touch_points(&m.canvas, &touch.changed_touches())
                .first()
                .copied();
            let remaining = touch.touches().length() as usize;
            m.dispatch(InputEvent::TouchEnd {
                changed,
                remaining,
                target,
            });
        });
    })?);

    listeners.push(Listener::new(doc, "wheel", Some(false), move |event| {
        event.prevent_default();
        with_mount(id, |m| {
            if let Some(wheel) = event.dyn_ref::<WheelEvent>() {
                m.dispatch(InputEvent::Wheel {
                    delta_y: wheel.delta_y(),
                });
            }
        });
    })?);

    listeners.push(Listener::new(win, "resize", None, move |_event| {
        let size = match dom::viewport_size() {
            Ok(size) => size,
            Err(err) => {
                warn!("viewport size unavailable: {err:?}");
                return;
            }
        };
        with_mount(id, |m| {
            m.dispatch(InputEvent::Resize {
                width: size.x,
                height: size.y,
            })
        });
    })?);

    Ok(listeners)
}
