use foundation::math::Vec2;
use gpu::{Camera3D, RenderFrame, Renderer};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use runtime::Frame;
use scene::World;
use scene::components::{EulerXY, Visibility};
use scene::entity::EntityId;
use scene::labels::TextMeasure;
use scene::picking::{PickHit, PickOptions, pick_screen};
use scene::prefabs::{MarkerEntities, spawn_globe, spawn_marker};
use scene::starfield::Starfield;
use tracing::{debug, info};

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::event::{Effect, EventTarget, InputEvent, PopupView};
use crate::input::{Gesture, InputController};
use crate::popup::PopupController;
use crate::zoom::Zoom;

/// Popup offset from the click position, in CSS pixels.
pub const POPUP_OFFSET_PX: f64 = 10.0;

/// The whole viewer: scene, camera, controllers and the star backdrop.
#[derive(Debug)]
pub struct GlobeApp {
    config: ViewerConfig,
    world: World,
    globe: EntityId,
    markers: Vec<MarkerEntities>,
    starfield: Starfield,
    camera: Camera3D,
    zoom: Zoom,
    input: InputController,
    popup: PopupController,
}

impl GlobeApp {
    /// Assemble the scene. `seed` drives the starfield unless the config
    /// pins one.
    pub fn new(
        config: ViewerConfig,
        measure: &dyn TextMeasure,
        seed: u64,
        viewport: Vec2,
    ) -> Result<Self, ViewerError> {
        config.validate()?;

        let mut world = World::new();
        let earth = &config.earth;
        let globe = spawn_globe(
            &mut world,
            earth.radius,
            earth.segments,
            earth.texture_url.as_deref(),
        );

        let flag_style = earth.flag_style();
        let label_style = config.labels.style();
        let mut markers = Vec::with_capacity(config.markers.len());
        for marker in &config.markers {
            let entities = spawn_marker(
                &mut world,
                globe,
                earth.radius,
                &marker.to_spec(),
                flag_style,
                &label_style,
                measure,
            );
            if !config.labels.visible {
                world.set_visibility(entities.label, Visibility::hidden());
            }
            markers.push(entities);
        }

        let mut rng = SmallRng::seed_from_u64(config.stars.seed.unwrap_or(seed));
        let starfield = Starfield::generate(config.stars.params(), &mut rng);

        let cam = &config.camera;
        let mut camera = Camera3D::new(cam.initial_distance, cam.fov_deg, cam.near, cam.far, viewport);
        camera.set_viewport(viewport.x, viewport.y);
        let zoom = Zoom::new(
            cam.initial_distance,
            config.controls.min_distance,
            config.controls.max_distance,
        );
        let input = InputController::new(&config.controls);

        info!(
            markers = markers.len(),
            stars = starfield.len(),
            "globe scene assembled"
        );

        Ok(Self {
            config,
            world,
            globe,
            markers,
            starfield,
            camera,
            zoom,
            input,
            popup: PopupController::new(),
        })
    }

    /// Look up the host element for `config.container_id`, then assemble the
    /// scene. A missing container fails before anything is built.
    pub fn mount<C>(
        config: ViewerConfig,
        find_container: impl FnOnce(&str) -> Option<C>,
        measure: &dyn TextMeasure,
        seed: u64,
        viewport: Vec2,
    ) -> Result<(C, Self), ViewerError> {
        let container = find_container(&config.container_id)
            .ok_or_else(|| ViewerError::MissingContainer(config.container_id.clone()))?;
        let app = Self::new(config, measure, seed, viewport)?;
        Ok((container, app))
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn globe(&self) -> EntityId {
        self.globe
    }

    pub fn markers(&self) -> &[MarkerEntities] {
        &self.markers
    }

    pub fn starfield(&self) -> &Starfield {
        &self.starfield
    }

    pub fn camera(&self) -> &Camera3D {
        &self.camera
    }

    pub fn zoom(&self) -> &Zoom {
        &self.zoom
    }

    pub fn popup(&self) -> &PopupController {
        &self.popup
    }

    pub fn input(&self) -> &InputController {
        &self.input
    }

    pub fn rotation(&self) -> EulerXY {
        self.world
            .transform(self.globe)
            .map(|t| t.rotation)
            .unwrap_or_default()
    }

    /// Apply one host event and report what the host must do in response.
    pub fn dispatch(&mut self, event: InputEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            InputEvent::PointerDown { pos } => self.input.pointer_down(pos),
            InputEvent::PointerMove { pos } => {
                if let Some(g) = self.input.pointer_move(pos) {
                    self.apply_gesture(g);
                }
            }
            InputEvent::PointerUp => self.input.pointer_up(),
            // Only touches that land on the globe start a rotate or pinch.
            InputEvent::TouchStart { touches, target } => {
                if target == EventTarget::Scene {
                    self.input.touch_start(&touches);
                }
            }
            InputEvent::TouchMove { touches } => {
                if let Some(g) = self.input.touch_move(&touches) {
                    self.apply_gesture(g);
                }
            }
            InputEvent::TouchEnd {
                changed,
                remaining,
                target,
            } => {
                let tap = remaining == 0 && self.input.allows_pick();
                self.input.touch_end(remaining);
                match (target, changed) {
                    (EventTarget::Scene, Some(pos)) if tap => {
                        self.show_marker_at(pos, &mut effects);
                        self.popup.dismiss_outside(&mut effects);
                    }
                    _ => self.activate(target, &mut effects),
                }
            }
            InputEvent::Wheel { delta_y } => {
                let g = self.input.wheel(delta_y);
                self.apply_gesture(g);
            }
            InputEvent::Click { pos, target } => {
                if target == EventTarget::Scene && self.input.allows_pick() {
                    self.show_marker_at(pos, &mut effects);
                }
                self.activate(target, &mut effects);
            }
            InputEvent::Resize { width, height } => {
                self.camera.set_viewport(width, height);
                effects.push(Effect::ResizeSurface {
                    width: self.camera.viewport.x as u32,
                    height: self.camera.viewport.y as u32,
                });
            }
            InputEvent::TickBoundary => self.popup.end_tick(),
        }
        effects
    }

    /// Advance one animation frame: ease the zoom, spin the globe and move
    /// the stars.
    pub fn tick(&mut self, frame: Frame) {
        let steps = frame.reference_steps();
        let controls = &self.config.controls;

        self.zoom.ease(controls.smoothing, steps);
        self.camera.distance = self.zoom.current();

        if let Some(t) = self.world.transform_mut(self.globe) {
            t.rotation.y += controls.auto_rotate * steps;
        }

        self.starfield.step(steps, frame.time.seconds());
    }

    /// Draw commands for the current state.
    pub fn render_frame(&self) -> RenderFrame {
        let mut frame = Renderer::collect(&self.world, &self.camera);
        Renderer::collect_stars(&mut frame, &self.starfield);
        frame
    }

    /// Nearest pickable object under the pixel, if any.
    pub fn pick_at(&self, pos: Vec2) -> Option<PickHit> {
        let basis = self.camera.basis();
        let opts = PickOptions {
            billboard_right: basis.right,
            billboard_up: basis.up,
            ..Default::default()
        };
        let camera = self.camera;
        pick_screen(
            &self.world,
            pos.x,
            pos.y,
            |x, y| camera.screen_ray(x, y),
            opts,
        )
    }

    /// Shared tail of click and touch-end: follow the popup link, or close
    /// the popup when the event landed outside it.
    fn activate(&mut self, target: EventTarget, effects: &mut Vec<Effect>) {
        match target {
            EventTarget::Scene | EventTarget::Other => self.popup.dismiss_outside(effects),
            EventTarget::Popup => {}
            EventTarget::PopupLink => {
                if let Some(view) = self.popup.view() {
                    effects.push(Effect::OpenLink(view.url.clone()));
                }
            }
        }
    }

    fn show_marker_at(&mut self, pos: Vec2, effects: &mut Vec<Effect>) {
        let Some(hit) = self.pick_at(pos) else {
            return;
        };
        let Some(info) = self.world.marker(hit.entity) else {
            debug!(entity = hit.entity.index(), "hit without marker metadata");
            return;
        };
        let view = PopupView {
            description: info.description.clone(),
            url: info.url.clone(),
            left_px: pos.x + POPUP_OFFSET_PX,
            top_px: pos.y + POPUP_OFFSET_PX,
        };
        self.popup.show(view, effects);
    }

    fn apply_gesture(&mut self, gesture: Gesture) {
        match gesture {
            Gesture::Rotate { yaw, pitch } => {
                if let Some(t) = self.world.transform_mut(self.globe) {
                    t.rotation.y += yaw;
                    t.rotation.x += pitch;
                }
            }
            Gesture::Zoom { delta } => {
                self.zoom.adjust_target(delta);
                debug!(target = self.zoom.target(), "zoom target");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GlobeApp;
    use crate::config::ViewerConfig;
    use crate::error::ViewerError;
    use crate::event::{Effect, EventTarget, InputEvent, PopupView};
    use foundation::math::Vec2;
    use pretty_assertions::assert_eq;
    use runtime::Frame;
    use scene::labels::{ApproxTextMeasure, TextMeasure};

    const VIEWPORT: Vec2 = Vec2 { x: 1280.0, y: 720.0 };

    fn app() -> GlobeApp {
        GlobeApp::new(
            ViewerConfig::default(),
            &ApproxTextMeasure::default(),
            7,
            VIEWPORT,
        )
        .expect("app")
    }

    fn flag_screen_pos(app: &GlobeApp, marker: usize) -> Vec2 {
        let flag = app.markers()[marker].flag;
        app.camera()
            .world_to_screen(app.world().world_position(flag))
            .expect("flag in front of camera")
    }

    fn click(pos: Vec2) -> InputEvent {
        InputEvent::Click {
            pos,
            target: EventTarget::Scene,
        }
    }

    /// Stand-in for `document.body`: tracks the popup elements the effects
    /// would leave behind.
    #[derive(Default)]
    struct FakeBody {
        popups: Vec<PopupView>,
    }

    impl FakeBody {
        fn apply(&mut self, effects: Vec<Effect>) {
            for effect in effects {
                match effect {
                    Effect::ShowPopup(view) => self.popups.push(view),
                    Effect::HidePopup => {
                        self.popups.pop();
                    }
                    Effect::OpenLink(_) | Effect::ResizeSurface { .. } => {}
                }
            }
        }
    }

    #[test]
    fn assembles_globe_markers_and_labels() {
        let app = app();
        assert_eq!(app.markers().len(), 2);
        assert_eq!(app.world().markers().count(), 2);
        // Globe, two flags, two labels.
        assert_eq!(app.world().drawables_3d().len(), 5);
        assert_eq!(app.starfield().len(), 1000);
        for m in app.markers() {
            assert_eq!(app.world().parent(m.flag), Some(app.globe()));
        }
    }

    #[test]
    fn pick_at_each_marker_resolves_to_it() {
        let app = app();
        for (i, m) in app.markers().iter().enumerate() {
            let pos = flag_screen_pos(&app, i);
            let hit = app.pick_at(pos).expect("hit");
            assert_eq!(hit.entity, m.flag);
        }
    }

    #[test]
    fn clicking_a_marker_opens_its_popup() {
        let mut app = app();
        let pos = flag_screen_pos(&app, 1);
        let effects = app.dispatch(click(pos));
        assert_eq!(
            effects,
            vec![Effect::ShowPopup(PopupView {
                description: "Brazil".to_string(),
                url: "https://en.wikipedia.org/wiki/Brazil".to_string(),
                left_px: pos.x + 10.0,
                top_px: pos.y + 10.0,
            })]
        );
    }

    #[test]
    fn opening_a_second_popup_leaves_exactly_one() {
        let mut app = app();
        let mut body = FakeBody::default();
        let usa = flag_screen_pos(&app, 0);
        let brazil = flag_screen_pos(&app, 1);

        body.apply(app.dispatch(click(usa)));
        body.apply(app.dispatch(InputEvent::TickBoundary));
        body.apply(app.dispatch(click(brazil)));
        assert_eq!(body.popups.len(), 1);
        assert_eq!(body.popups[0].description, "Brazil");

        // Same task, no boundary in between.
        body.apply(app.dispatch(click(usa)));
        assert_eq!(body.popups.len(), 1);
        assert_eq!(body.popups[0].description, "United States of America");
    }

    #[test]
    fn outside_click_closes_only_after_the_open_tick() {
        let mut app = app();
        let usa = flag_screen_pos(&app, 0);
        app.dispatch(click(usa));

        let during = app.dispatch(InputEvent::Click {
            pos: Vec2::new(5.0, 5.0),
            target: EventTarget::Other,
        });
        assert!(during.is_empty());
        assert!(app.popup().is_open());

        app.dispatch(InputEvent::TickBoundary);
        let after = app.dispatch(InputEvent::Click {
            pos: Vec2::new(5.0, 5.0),
            target: EventTarget::Other,
        });
        assert_eq!(after, vec![Effect::HidePopup]);
        assert!(!app.popup().is_open());
    }

    #[test]
    fn miss_opens_nothing() {
        let mut app = app();
        let effects = app.dispatch(click(Vec2::new(2.0, 2.0)));
        assert!(effects.is_empty());
        assert!(!app.popup().is_open());
    }

    #[test]
    fn globe_hit_without_metadata_opens_nothing() {
        let mut app = app();
        let center = Vec2::new(VIEWPORT.x * 0.5, VIEWPORT.y * 0.5);
        let hit = app.pick_at(center).expect("globe under center");
        assert_eq!(hit.entity, app.globe());
        assert!(app.dispatch(click(center)).is_empty());
    }

    #[test]
    fn link_opens_url_and_keeps_popup() {
        let mut app = app();
        let usa = flag_screen_pos(&app, 0);
        app.dispatch(click(usa));
        app.dispatch(InputEvent::TickBoundary);

        let effects = app.dispatch(InputEvent::Click {
            pos: Vec2::new(0.0, 0.0),
            target: EventTarget::PopupLink,
        });
        assert_eq!(
            effects,
            vec![Effect::OpenLink(
                "https://en.wikipedia.org/wiki/United_States".to_string()
            )]
        );
        assert!(app.popup().is_open());

        let inside = app.dispatch(InputEvent::Click {
            pos: Vec2::new(0.0, 0.0),
            target: EventTarget::Popup,
        });
        assert!(inside.is_empty());
    }

    #[test]
    fn drag_does_not_pick() {
        let mut app = app();
        let usa = flag_screen_pos(&app, 0);
        app.dispatch(InputEvent::PointerDown { pos: usa });
        app.dispatch(InputEvent::PointerMove {
            pos: Vec2::new(usa.x + 40.0, usa.y),
        });
        app.dispatch(InputEvent::PointerMove { pos: usa });
        app.dispatch(InputEvent::PointerUp);
        assert!(app.dispatch(click(usa)).is_empty());
    }

    #[test]
    fn drag_rotates_the_globe() {
        let mut app = app();
        app.dispatch(InputEvent::PointerDown {
            pos: Vec2::new(100.0, 100.0),
        });
        app.dispatch(InputEvent::PointerMove {
            pos: Vec2::new(140.0, 80.0),
        });
        let r = app.rotation();
        assert!((r.y - 0.2).abs() < 1e-12);
        assert!((r.x + 0.1).abs() < 1e-12);
    }

    #[test]
    fn single_finger_tap_picks() {
        let mut app = app();
        let pos = flag_screen_pos(&app, 0);
        app.dispatch(InputEvent::TouchStart {
            touches: vec![pos],
            target: EventTarget::Scene,
        });
        let effects = app.dispatch(InputEvent::TouchEnd {
            changed: Some(pos),
            remaining: 0,
            target: EventTarget::Scene,
        });
        assert_eq!(effects.len(), 1);
        assert!(matches!(&effects[0], Effect::ShowPopup(v) if v.description == "United States of America"));

        app.dispatch(InputEvent::TickBoundary);
        let link = app.dispatch(InputEvent::TouchEnd {
            changed: Some(pos),
            remaining: 0,
            target: EventTarget::PopupLink,
        });
        assert_eq!(
            link,
            vec![Effect::OpenLink(
                "https://en.wikipedia.org/wiki/United_States".to_string()
            )]
        );
    }

    #[test]
    fn touch_drag_closes_popup_without_picking() {
        let mut app = app();
        let usa = flag_screen_pos(&app, 0);
        app.dispatch(click(usa));
        app.dispatch(InputEvent::TickBoundary);

        app.dispatch(InputEvent::TouchStart {
            touches: vec![usa],
            target: EventTarget::Scene,
        });
        app.dispatch(InputEvent::TouchMove {
            touches: vec![Vec2::new(usa.x + 50.0, usa.y)],
        });
        let effects = app.dispatch(InputEvent::TouchEnd {
            changed: Some(usa),
            remaining: 0,
            target: EventTarget::Scene,
        });
        assert_eq!(effects, vec![Effect::HidePopup]);
    }

    #[test]
    fn touch_on_popup_does_not_rotate_globe() {
        let mut app = app();
        let usa = flag_screen_pos(&app, 0);
        app.dispatch(click(usa));
        app.dispatch(InputEvent::TickBoundary);
        let before = app.rotation();

        app.dispatch(InputEvent::TouchStart {
            touches: vec![Vec2::new(usa.x + 20.0, usa.y + 20.0)],
            target: EventTarget::Popup,
        });
        app.dispatch(InputEvent::TouchMove {
            touches: vec![Vec2::new(usa.x + 120.0, usa.y + 60.0)],
        });
        assert!(!app.input().is_dragging());
        assert_eq!(app.rotation(), before);

        let effects = app.dispatch(InputEvent::TouchEnd {
            changed: Some(Vec2::new(usa.x + 120.0, usa.y + 60.0)),
            remaining: 0,
            target: EventTarget::Popup,
        });
        assert!(effects.is_empty());
        assert!(app.popup().is_open());
    }

    #[test]
    fn zoom_target_is_clamped() {
        let mut app = app();
        app.dispatch(InputEvent::Wheel { delta_y: 1.0e9 });
        assert_eq!(app.zoom().target(), 30.0);
        app.dispatch(InputEvent::Wheel { delta_y: -1.0e9 });
        assert_eq!(app.zoom().target(), 6.0);

        app.dispatch(InputEvent::TouchStart {
            touches: vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)],
            target: EventTarget::Scene,
        });
        app.dispatch(InputEvent::TouchMove {
            touches: vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)],
        });
        app.dispatch(InputEvent::TouchMove {
            touches: vec![Vec2::new(0.0, 0.0), Vec2::new(-1.0e9, 0.0)],
        });
        assert_eq!(app.zoom().target(), 6.0);
    }

    #[test]
    fn tick_eases_zoom_and_spins_globe() {
        let mut app = app();
        app.dispatch(InputEvent::Wheel { delta_y: 1000.0 });
        assert_eq!(app.zoom().target(), 20.0);

        let frame = Frame::new(0, runtime::REFERENCE_DT_S);
        app.tick(frame);
        assert!((app.camera().distance - 15.5).abs() < 1e-9);
        assert!((app.rotation().y - 0.001).abs() < 1e-12);
    }

    #[test]
    fn stars_stay_in_bounds_over_many_ticks() {
        let mut app = app();
        let mut frame = Frame::new(0, 0.25);
        for _ in 0..2000 {
            app.tick(frame);
            frame = frame.next();
        }
        for s in app.starfield().stars() {
            for c in s.position.as_array() {
                assert!(c.abs() <= 1000.0);
            }
        }
        assert_eq!(app.render_frame().stars.len(), 1000);
    }

    #[test]
    fn resize_updates_camera_and_surface() {
        let mut app = app();
        let effects = app.dispatch(InputEvent::Resize {
            width: 800.0,
            height: 600.0,
        });
        assert_eq!(
            effects,
            vec![Effect::ResizeSurface {
                width: 800,
                height: 600
            }]
        );
        assert!((app.camera().aspect() - 800.0 / 600.0).abs() < 1e-12);
    }

    #[test]
    fn hidden_labels_are_not_drawn() {
        let mut config = ViewerConfig::default();
        config.labels.visible = false;
        let hidden = GlobeApp::new(config, &ApproxTextMeasure::default(), 7, VIEWPORT).expect("app");
        // Globe plus one flag per marker.
        assert_eq!(hidden.render_frame().commands.len(), 3);
        assert_eq!(app().render_frame().commands.len(), 5);
    }

    /// Counts measure calls to show whether the scene was assembled.
    #[derive(Default)]
    struct CountingMeasure {
        calls: std::cell::Cell<usize>,
    }

    impl TextMeasure for CountingMeasure {
        fn text_width_px(&self, text: &str, font_px: f64) -> f64 {
            self.calls.set(self.calls.get() + 1);
            ApproxTextMeasure::default().text_width_px(text, font_px)
        }
    }

    #[test]
    fn missing_container_fails_before_building_the_scene() {
        let measure = CountingMeasure::default();
        let mut asked = None;
        let err = GlobeApp::mount(
            ViewerConfig::default(),
            |id: &str| -> Option<()> {
                asked = Some(id.to_string());
                None
            },
            &measure,
            7,
            VIEWPORT,
        )
        .unwrap_err();
        assert_eq!(err, ViewerError::MissingContainer("globe".to_string()));
        assert_eq!(err.to_string(), "container element `#globe` not found");
        assert_eq!(asked.as_deref(), Some("globe"));
        assert_eq!(measure.calls.get(), 0);
    }

    #[test]
    fn mount_uses_configured_container() {
        let mut config = ViewerConfig::default();
        config.container_id = "earth-host".to_string();
        let measure = CountingMeasure::default();
        let (container, app) = GlobeApp::mount(
            config,
            |id: &str| Some(id.to_uppercase()),
            &measure,
            7,
            VIEWPORT,
        )
        .expect("mount");
        assert_eq!(container, "EARTH-HOST");
        assert_eq!(app.markers().len(), 2);
        assert!(measure.calls.get() > 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = ViewerConfig::default();
        config.controls.min_distance = 50.0;
        let err = GlobeApp::new(config, &ApproxTextMeasure::default(), 1, VIEWPORT).unwrap_err();
        assert!(matches!(err, ViewerError::Config(_)));
    }
}
