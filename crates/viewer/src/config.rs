use serde::{Deserialize, Serialize};

use foundation::math::{Vec2, Vec3};
use scene::labels::LabelStyle;
use scene::prefabs::{FlagStyle, MarkerSpec};
use scene::starfield::StarfieldParams;

/// Viewer settings. Every field has a default so a partial JSON document is
/// a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// DOM id of the element that hosts the canvas.
    pub container_id: String,
    pub earth: EarthConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub stars: StarsConfig,
    pub labels: LabelConfig,
    pub markers: Vec<MarkerConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarthConfig {
    pub radius: f64,
    pub segments: u32,
    /// Equirectangular surface image; `None` renders the fallback color.
    pub texture_url: Option<String>,
    /// Height of flag sprites above the surface.
    pub flag_lift: f64,
    pub flag_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
    pub initial_distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub min_distance: f64,
    pub max_distance: f64,
    /// Distance change per wheel `deltaY` unit.
    pub wheel_speed: f64,
    /// Distance change per pixel of pinch spread.
    pub pinch_speed: f64,
    /// Radians per dragged pixel.
    pub drag_speed: f64,
    /// Fraction of the zoom gap closed per reference frame.
    pub smoothing: f64,
    /// Radians added to the Y rotation per reference frame.
    pub auto_rotate: f64,
    /// Pointer travel (px) after which a press counts as a drag, not a click.
    pub drag_slop_px: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarsConfig {
    pub count: usize,
    pub extent: f64,
    pub max_speed: f64,
    pub twinkle: bool,
    /// Fixed RNG seed; the host picks one when absent.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Draw the text label beside each flag.
    pub visible: bool,
    pub font_px: f64,
    pub font_family: String,
    pub padding_px: f64,
    pub color: String,
    pub px_per_unit: f64,
    /// Offset along the globe-local X axis.
    pub offset_x: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerConfig {
    pub lat: f64,
    pub lon: f64,
    pub image: String,
    pub description: String,
    pub url: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            container_id: "globe".to_string(),
            earth: EarthConfig::default(),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            stars: StarsConfig::default(),
            labels: LabelConfig::default(),
            markers: default_markers(),
        }
    }
}

impl Default for EarthConfig {
    fn default() -> Self {
        Self {
            radius: 5.0,
            segments: 32,
            texture_url: Some(
                "https://threejs.org/examples/textures/planets/earth_atmos_2048.jpg".to_string(),
            ),
            flag_lift: 0.1,
            flag_size: 0.5,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 75.0,
            near: 0.1,
            far: 1000.0,
            initial_distance: 15.0,
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            min_distance: 6.0,
            max_distance: 30.0,
            wheel_speed: 0.005,
            pinch_speed: 0.05,
            drag_speed: 0.005,
            smoothing: 0.1,
            auto_rotate: 0.001,
            drag_slop_px: 4.0,
        }
    }
}

impl Default for StarsConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            extent: 1000.0,
            max_speed: 0.05,
            twinkle: true,
            seed: None,
        }
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            visible: true,
            font_px: 32.0,
            font_family: "Arial".to_string(),
            padding_px: 20.0,
            color: "white".to_string(),
            px_per_unit: 100.0,
            offset_x: 1.0,
        }
    }
}

impl EarthConfig {
    pub fn flag_style(&self) -> FlagStyle {
        FlagStyle {
            lift: self.flag_lift,
            size: Vec2::new(self.flag_size, self.flag_size),
        }
    }
}

impl StarsConfig {
    pub fn params(&self) -> StarfieldParams {
        StarfieldParams {
            count: self.count,
            extent: self.extent,
            max_speed: self.max_speed,
            twinkle: self.twinkle,
        }
    }
}

impl LabelConfig {
    pub fn style(&self) -> LabelStyle {
        LabelStyle {
            font_px: self.font_px,
            font_family: self.font_family.clone(),
            padding_px: self.padding_px,
            px_per_unit: self.px_per_unit,
            offset: Vec3::new(self.offset_x, 0.0, 0.0),
            color: self.color.clone(),
        }
    }
}

impl MarkerConfig {
    pub fn to_spec(&self) -> MarkerSpec {
        MarkerSpec {
            lat_deg: self.lat,
            lon_deg: self.lon,
            image_url: self.image.clone(),
            description: self.description.clone(),
            url: self.url.clone(),
        }
    }
}

pub fn default_markers() -> Vec<MarkerConfig> {
    vec![
        MarkerConfig {
            lat: 37.0902,
            lon: -95.7129,
            image: "https://flagcdn.com/32x24/us.png".to_string(),
            description: "United States of America".to_string(),
            url: "https://en.wikipedia.org/wiki/United_States".to_string(),
        },
        MarkerConfig {
            lat: -14.2350,
            lon: -51.9253,
            image: "https://flagcdn.com/32x24/br.png".to_string(),
            description: "Brazil".to_string(),
            url: "https://en.wikipedia.org/wiki/Brazil".to_string(),
        },
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    Invalid { field: &'static str, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "config parse error: {msg}"),
            ConfigError::Invalid { field, reason } => write!(f, "invalid config `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ViewerConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }
        fn positive(field: &'static str, v: f64) -> Result<(), ConfigError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(invalid(field, format!("must be a positive number, got {v}")))
            }
        }

        if self.container_id.trim().is_empty() {
            return Err(invalid("container_id", "must not be empty"));
        }

        positive("earth.radius", self.earth.radius)?;
        if self.earth.segments < 3 {
            return Err(invalid("earth.segments", "must be at least 3"));
        }
        positive("earth.flag_size", self.earth.flag_size)?;
        if !self.earth.flag_lift.is_finite() {
            return Err(invalid("earth.flag_lift", "must be finite"));
        }

        let cam = &self.camera;
        if !(cam.fov_deg > 0.0 && cam.fov_deg < 180.0) {
            return Err(invalid("camera.fov_deg", "must be within (0, 180)"));
        }
        positive("camera.near", cam.near)?;
        if !(cam.far > cam.near) {
            return Err(invalid("camera.far", "must be greater than camera.near"));
        }

        let c = &self.controls;
        positive("controls.min_distance", c.min_distance)?;
        if !(c.min_distance <= c.max_distance) {
            return Err(invalid(
                "controls.max_distance",
                "must be greater than or equal to controls.min_distance",
            ));
        }
        if !(c.smoothing > 0.0 && c.smoothing <= 1.0) {
            return Err(invalid("controls.smoothing", "must be within (0, 1]"));
        }
        for (field, v) in [
            ("controls.wheel_speed", c.wheel_speed),
            ("controls.pinch_speed", c.pinch_speed),
            ("controls.drag_speed", c.drag_speed),
            ("controls.auto_rotate", c.auto_rotate),
            ("controls.drag_slop_px", c.drag_slop_px),
        ] {
            if !v.is_finite() {
                return Err(invalid(field, "must be finite"));
            }
        }

        positive("stars.extent", self.stars.extent)?;
        if !(self.stars.max_speed.is_finite() && self.stars.max_speed >= 0.0) {
            return Err(invalid("stars.max_speed", "must be a non-negative number"));
        }

        positive("labels.font_px", self.labels.font_px)?;
        positive("labels.px_per_unit", self.labels.px_per_unit)?;

        for m in &self.markers {
            if !(-90.0..=90.0).contains(&m.lat) {
                return Err(invalid("markers.lat", format!("{} is outside [-90, 90]", m.lat)));
            }
            if !(-180.0..=180.0).contains(&m.lon) {
                return Err(invalid("markers.lon", format!("{} is outside [-180, 180]", m.lon)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ViewerConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        let config = ViewerConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.container_id, "globe");
        assert_eq!(config.markers.len(), 2);
        assert_eq!(config.markers[1].description, "Brazil");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = ViewerConfig::from_json(
            r#"{ "container_id": "earth", "controls": { "min_distance": 8.0 }, "stars": { "seed": 42 } }"#,
        )
        .expect("config");
        assert_eq!(config.container_id, "earth");
        assert_eq!(config.controls.min_distance, 8.0);
        assert_eq!(config.controls.max_distance, 30.0);
        assert_eq!(config.stars.seed, Some(42));
        assert_eq!(config.stars.count, 1000);
        assert_eq!(config.markers, ViewerConfig::default().markers);
    }

    #[test]
    fn inverted_zoom_bounds_are_rejected() {
        let err = ViewerConfig::from_json(
            r#"{ "controls": { "min_distance": 40.0, "max_distance": 30.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "controls.max_distance",
                ..
            }
        ));
    }

    #[test]
    fn bad_values_are_rejected() {
        let mut config = ViewerConfig::default();
        config.earth.radius = 0.0;
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.earth.segments = 0;
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.markers[0].lat = 91.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn label_and_star_settings_convert() {
        let config = ViewerConfig::default();
        assert_eq!(config.labels.style(), scene::labels::LabelStyle::default());
        assert_eq!(
            config.stars.params(),
            scene::starfield::StarfieldParams::default()
        );
        assert_eq!(
            config.earth.flag_style(),
            scene::prefabs::FlagStyle::default()
        );
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            ViewerConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
