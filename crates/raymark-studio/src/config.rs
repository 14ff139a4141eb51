use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glam::Vec3;
use raymark_engine::color::{ColorParseError, PackedColor};
use serde::Deserialize;

/// Overlay shipped with the binary, used when no path is given.
pub const DEFAULT_OVERLAY: &str = include_str!("../overlay.toml");

/// Studio configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudioConfig {
    #[serde(default)]
    pub window: WindowSection,
    #[serde(default = "default_clear")]
    pub clear: HexColor,
    #[serde(default)]
    pub camera: CameraSection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub markers: Vec<MarkerConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowSection {
    pub title: String,
    pub width: f64,
    pub height: f64,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            title: "raymark studio".to_string(),
            width: 1280.0,
            height: 720.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraSection {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    /// Orbit around +Y in radians per second.
    pub orbit_speed: f32,
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            eye: [0.0, 2.0, 8.0],
            target: [0.0, 0.0, 0.0],
            fov_y_deg: 60.0,
            near: 0.1,
            far: 100.0,
            orbit_speed: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub filter: Option<String>,
    pub file: Option<PathBuf>,
    pub crash_log: Option<PathBuf>,
}

/// One marker ray: `count` points starting at `origin`, `spacing` apart along `direction`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkerConfig {
    pub origin: [f32; 3],
    pub direction: [f32; 3],
    #[serde(default = "default_spacing")]
    pub spacing: f32,
    pub color: HexColor,
    pub count: u32,
}

/// `#RRGGBB[AA]` string deserialized into a packed color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct HexColor(pub PackedColor);

impl TryFrom<String> for HexColor {
    type Error = ColorParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        PackedColor::from_hex(&s).map(HexColor)
    }
}

fn default_clear() -> HexColor {
    HexColor(PackedColor::BLACK)
}

fn default_spacing() -> f32 {
    1.0
}

impl StudioConfig {
    /// Reads and validates a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parses and validates TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(text).context("failed to parse TOML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Built-in overlay.
    pub fn builtin() -> Result<Self> {
        Self::parse(DEFAULT_OVERLAY).context("built-in overlay is invalid")
    }

    fn validate(&self) -> Result<()> {
        let cam = &self.camera;
        anyhow::ensure!(
            cam.near > 0.0 && cam.far > cam.near,
            "camera needs 0 < near < far (near = {}, far = {})",
            cam.near,
            cam.far
        );
        anyhow::ensure!(
            cam.fov_y_deg > 0.0 && cam.fov_y_deg < 180.0,
            "camera fov_y_deg must be in (0, 180), got {}",
            cam.fov_y_deg
        );
        anyhow::ensure!(
            Vec3::from(cam.eye) != Vec3::from(cam.target),
            "camera eye and target coincide"
        );

        for (i, m) in self.markers.iter().enumerate() {
            let dir = Vec3::from(m.direction);
            anyhow::ensure!(
                dir.is_finite() && dir.length_squared() > 0.0,
                "marker {i}: direction must be a finite non-zero vector"
            );
            anyhow::ensure!(
                m.spacing.is_finite() && m.spacing > 0.0,
                "marker {i}: spacing must be positive, got {}",
                m.spacing
            );
            anyhow::ensure!(
                Vec3::from(m.origin).is_finite(),
                "marker {i}: origin must be finite"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_overlay_parses() {
        let cfg = StudioConfig::builtin().unwrap();
        assert_eq!(cfg.markers.len(), 3);
        assert_eq!(cfg.markers[0].color.0, PackedColor::from_rgba8(0xff, 0x40, 0x40, 0xff));
        assert_eq!(cfg.markers[2].color.0.to_rgba8()[3], 0xcc);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = StudioConfig::parse("").unwrap();
        assert_eq!(cfg.window.title, "raymark studio");
        assert_eq!(cfg.clear.0, PackedColor::BLACK);
        assert!(cfg.markers.is_empty());
        assert!(cfg.logging.file.is_none());
        assert!(cfg.logging.crash_log.is_none());
    }

    #[test]
    fn logging_section_accepts_crash_log() {
        let cfg = StudioConfig::parse(
            r#"
            [logging]
            filter = "warn"
            crash_log = "studio-crash.log"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.logging.filter.as_deref(), Some("warn"));
        assert!(cfg.logging.file.is_none());
        assert_eq!(cfg.logging.crash_log, Some(PathBuf::from("studio-crash.log")));
    }

    #[test]
    fn marker_spacing_defaults_to_one() {
        let cfg = StudioConfig::parse(
            r##"
            [[markers]]
            origin = [0.0, 0.0, 0.0]
            direction = [0.0, 0.0, -1.0]
            color = "#ffffff"
            count = 3
            "##,
        )
        .unwrap();
        assert_eq!(cfg.markers[0].spacing, 1.0);
    }

    #[test]
    fn bad_hex_color_is_rejected() {
        let err = StudioConfig::parse(r##"clear = "#12345""##).unwrap_err();
        assert!(format!("{err:#}").contains("6 or 8 digits"));
    }

    #[test]
    fn zero_direction_is_rejected() {
        let err = StudioConfig::parse(
            r##"
            [[markers]]
            origin = [0.0, 0.0, 0.0]
            direction = [0.0, 0.0, 0.0]
            color = "#ffffff"
            count = 3
            "##,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("marker 0"));
    }

    #[test]
    fn inverted_clip_planes_are_rejected() {
        let err = StudioConfig::parse(
            r#"
            [camera]
            near = 10.0
            far = 1.0
            "#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("near < far"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(StudioConfig::parse("colour = \"#ffffff\"").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = StudioConfig::load(Path::new("/nonexistent/overlay.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/overlay.toml"));
    }
}
