//! Preview configuration.
//!
//! Selects the asset, the animation (and optional mix) to play, and how
//! playback is clocked. Configuration can be loaded from and saved to a
//! TOML file; every field has a default.

use cutout_anim::{TimeStep, DEFAULT_FIXED_STEP_MS};
use cutout_common::{BoxClass, Rect};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
const CONFIG_FILE: &str = "cutout.toml";

/// How playback time advances per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeStepMode {
    /// Constant step of `fixed_step_ms` per tick
    #[default]
    Fixed,
    /// Real frame time per tick
    Elapsed,
}

/// Preview parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    // === Asset ===
    /// Text asset to load
    pub asset_path: PathBuf,
    /// Multiplier for every authored length
    pub rescale: Vec2,
    /// Sheet section the animations live in ("" for single-sheet assets)
    pub section: String,

    // === Playback ===
    /// Animation to play
    pub animation: String,
    /// Start on the last two keys and play in reverse
    pub backward: bool,
    /// Mirror horizontally
    pub flip: bool,
    /// Playback speed multiplier
    pub play_speed: f32,
    /// Character origin in world space
    pub position: Vec2,

    // === Mixing ===
    /// Second animation driving `mix_parts`
    pub mix_animation: Option<String>,
    /// Part names taken from the mix animation
    pub mix_parts: Vec<String>,

    // === Timing ===
    /// Number of simulated display frames to run
    pub frames: u32,
    /// Simulated display rate
    pub target_fps: u32,
    /// Time-step mode
    pub time_step: TimeStepMode,
    /// Tick length in milliseconds for the fixed mode
    pub fixed_step_ms: f32,

    // === Hit probe ===
    /// World-space rectangle tested against the character's boxes each frame
    pub probe_rect: Option<[i32; 4]>,
    /// Box class the probe tests against
    pub probe_class: i32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            // Asset
            asset_path: PathBuf::from("assets/character.txt"),
            rescale: Vec2::ONE,
            section: String::new(),

            // Playback
            animation: "idle".to_string(),
            backward: false,
            flip: false,
            play_speed: 1.0,
            position: Vec2::ZERO,

            // Mixing
            mix_animation: None,
            mix_parts: Vec::new(),

            // Timing
            frames: 240,
            target_fps: 60,
            time_step: TimeStepMode::Fixed,
            fixed_step_ms: DEFAULT_FIXED_STEP_MS,

            // Hit probe
            probe_rect: None,
            probe_class: BoxClass::ATTACK.raw(),
        }
    }
}

impl PreviewConfig {
    /// Load configuration from the default file location.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read config file: {e}");
                return Self::default();
            },
        };

        match toml::from_str(&contents) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to parse config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to the default file location.
    pub fn save(&self) -> io::Result<()> {
        self.save_to(CONFIG_FILE)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        // Asset
        self.rescale = self.rescale.max(Vec2::splat(0.01));

        // Playback
        self.play_speed = self.play_speed.clamp(0.0, 16.0);

        // Timing
        self.frames = self.frames.clamp(1, 1_000_000);
        self.target_fps = self.target_fps.clamp(1, 240);
        self.fixed_step_ms = self.fixed_step_ms.clamp(1.0, 1000.0);
    }

    /// Tick time step for the player.
    #[must_use]
    pub fn player_time_step(&self) -> TimeStep {
        match self.time_step {
            TimeStepMode::Fixed => TimeStep::Fixed(self.fixed_step_ms),
            TimeStepMode::Elapsed => TimeStep::Elapsed,
        }
    }

    /// Length of one simulated display frame in milliseconds.
    #[must_use]
    pub fn frame_ms(&self) -> f32 {
        1000.0 / self.target_fps.max(1) as f32
    }

    /// Probe rectangle, if configured.
    #[must_use]
    pub fn probe(&self) -> Option<(Rect, BoxClass)> {
        self.probe_rect
            .map(|[x, y, w, h]| (Rect::new(x, y, w, h), BoxClass::new(self.probe_class)))
    }
}
