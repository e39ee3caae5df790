//! Game configuration (cameras, HUD, particles, demo run). Loaded from config.ron at startup.

use crate::particles::ParticleSetup;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Persistent game settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub follow_camera: FollowCameraConfig,
    #[serde(default)]
    pub hud: HudConfig,
    #[serde(default)]
    pub particles: ParticleSetup,
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Chase camera tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowCameraConfig {
    /// Camera position relative to the aircraft, in the aircraft's frame.
    #[serde(default = "default_follow_offset")]
    pub offset: Vec3,
    /// Per-tick position blend (0..=1].
    #[serde(default = "default_position_smoothness")]
    pub position_smoothness: f32,
    /// Per-tick rotation blend (0..=1].
    #[serde(default = "default_rotation_smoothness")]
    pub rotation_smoothness: f32,
    /// Rotation blend while crashing; never above `rotation_smoothness`.
    #[serde(default = "default_crash_rotation_smoothness")]
    pub crash_rotation_smoothness: f32,
    /// Freeze pitch and yaw while the aircraft is crashing.
    #[serde(default = "default_true")]
    pub crash_limit: bool,
}

/// Flight HUD placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HudConfig {
    /// Distance of the HUD plane in front of its anchor.
    #[serde(default = "default_hud_distance")]
    pub hud_distance: f32,
    /// World units per screen unit, horizontally.
    #[serde(default = "default_hud_size_x")]
    pub size_x: f32,
    /// World units per screen unit, vertically.
    #[serde(default = "default_hud_size_y")]
    pub size_y: f32,
    /// Vertical lift of the aircraft-anchored plane.
    #[serde(default = "default_entity_lift")]
    pub entity_lift: f32,
    /// Seconds for the deploy/retract animation.
    #[serde(default = "default_deploy_duration")]
    pub deploy_duration: f32,
}

/// Headless demo run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Simulated seconds before the demo exits.
    #[serde(default = "default_demo_seconds")]
    pub seconds: f32,
    /// Seconds the title camera loops before the flight scene starts.
    #[serde(default = "default_title_auto_start")]
    pub title_auto_start: f32,
}

fn default_true() -> bool {
    true
}
fn default_follow_offset() -> Vec3 {
    Vec3::new(0.0, 1.0, -16.0)
}
fn default_position_smoothness() -> f32 {
    0.1
}
fn default_rotation_smoothness() -> f32 {
    0.1
}
fn default_crash_rotation_smoothness() -> f32 {
    0.03
}
fn default_hud_distance() -> f32 {
    10.0
}
fn default_hud_size_x() -> f32 {
    4.0
}
fn default_hud_size_y() -> f32 {
    2.5
}
fn default_entity_lift() -> f32 {
    0.5
}
fn default_deploy_duration() -> f32 {
    1.2
}
fn default_demo_seconds() -> f32 {
    40.0
}
fn default_title_auto_start() -> f32 {
    3.0
}

impl Default for FollowCameraConfig {
    fn default() -> Self {
        Self {
            offset: default_follow_offset(),
            position_smoothness: default_position_smoothness(),
            rotation_smoothness: default_rotation_smoothness(),
            crash_rotation_smoothness: default_crash_rotation_smoothness(),
            crash_limit: default_true(),
        }
    }
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            hud_distance: default_hud_distance(),
            size_x: default_hud_size_x(),
            size_y: default_hud_size_y(),
            entity_lift: default_entity_lift(),
            deploy_duration: default_deploy_duration(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seconds: default_demo_seconds(),
            title_auto_start: default_title_auto_start(),
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            match Self::from_ron(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    pub fn from_ron(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        if let Ok(s) = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            if let Err(e) = std::fs::write(&path, s) {
                log::warn!("Could not write config to {:?}: {}", path, e);
            }
        }
    }
}

/// Location of `config.ron` in the working directory.
pub fn config_path() -> std::path::PathBuf {
    std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from(".")).join("config.ron")
}
