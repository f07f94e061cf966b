//! Headless preview loop.
//!
//! Loads the configured asset, starts the configured animation (optionally
//! mixed with a second one) and steps it for a fixed number of simulated
//! display frames, logging playback events and probe hits.

use anyhow::{Context, Result};
use cutout_anim::{load_file, AnimationLibrary, MixParts, PlaybackEvent, Player, QuadInstance};
use glam::Vec4;
use tracing::{debug, info};

use crate::config::{PreviewConfig, TimeStepMode};
use crate::timing::FrameClock;

/// What happened during a preview run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Display frames simulated
    pub frames: u32,
    /// Player ticks run
    pub ticks: u64,
    /// Loop wraps reported
    pub loops: u32,
    /// Frame on which a one-shot animation finished
    pub finished_at: Option<u32>,
    /// Frames on which the probe overlapped a box
    pub hit_frames: u32,
    /// Parts drawn on the final frame
    pub draw_items: usize,
    /// Size of the final frame's instance buffer
    pub upload_bytes: usize,
}

/// Runs the preview described by `config`.
pub fn run(config: &PreviewConfig) -> Result<()> {
    info!("Configuration loaded:");
    info!("  Asset: {}", config.asset_path.display());
    info!("  Animation: {} (section '{}')", config.animation, config.section);
    if let Some(mix) = &config.mix_animation {
        info!("  Mix: {} on {:?}", mix, config.mix_parts);
    }
    info!("  Frames: {} at {} fps", config.frames, config.target_fps);

    let summary = preview(config)?;

    info!(
        "Ran {} frames ({} ticks): {} loops, {} probe hits",
        summary.frames, summary.ticks, summary.loops, summary.hit_frames
    );
    if let Some(frame) = summary.finished_at {
        info!("Animation finished on frame {}", frame);
    }
    info!(
        "Final frame: {} parts, {} instance bytes",
        summary.draw_items, summary.upload_bytes
    );
    Ok(())
}

/// Plays the configured animation headless and reports what happened.
pub fn preview(config: &PreviewConfig) -> Result<RunSummary> {
    let library = load_file(&config.asset_path, config.rescale)
        .with_context(|| format!("Failed to load {}", config.asset_path.display()))?;

    let mut player = Player::new(&library, config.section.as_str(), config.position);
    player.set_time_step(config.player_time_step());
    player.set_play_speed(config.play_speed);
    start(&mut player, &library, config)?;

    let frame_ms = config.frame_ms();
    let mut clock = FrameClock::new(config.fixed_step_ms);
    let probe = config.probe();
    let mut was_hit = false;
    let mut summary = RunSummary::default();

    for frame in 0..config.frames {
        let ticks = match config.time_step {
            TimeStepMode::Fixed => clock.accumulate(frame_ms),
            TimeStepMode::Elapsed => 1,
        };
        for _ in 0..ticks {
            summary.ticks += 1;
            match player.tick(&library, frame_ms) {
                Some(PlaybackEvent::Looped) => {
                    summary.loops += 1;
                    debug!(frame, "Animation looped");
                },
                Some(PlaybackEvent::Finished) => {
                    summary.finished_at.get_or_insert(frame);
                    info!(frame, "Animation finished");
                },
                None => {},
            }
        }

        if let Some((rect, class)) = probe {
            let hit = player.hits_class(&rect, class);
            if hit {
                summary.hit_frames += 1;
                if !was_hit {
                    info!(frame, class = class.raw(), "Probe hit");
                }
            }
            was_hit = hit;
        }
        summary.frames += 1;
    }

    if config.time_step == TimeStepMode::Fixed {
        debug!(
            "Clock ran {} ticks of {}ms",
            clock.total_ticks(),
            clock.step_ms()
        );
    }
    for (rect, color) in player.debug_boxes() {
        debug!(?rect, ?color, "Debug box");
    }

    let instances: Vec<QuadInstance> = player
        .draw_items(&library, Vec4::ONE, true)
        .map(|item| item.to_instance())
        .collect();
    summary.draw_items = instances.len();
    summary.upload_bytes = bytemuck::cast_slice::<QuadInstance, u8>(&instances).len();
    Ok(summary)
}

/// Starts the configured animation, or the configured mix.
fn start(player: &mut Player, library: &AnimationLibrary, config: &PreviewConfig) -> Result<()> {
    let section = config.section.as_str();
    let primary = library
        .resolve(section, &config.animation)
        .with_context(|| {
            format!(
                "Animation '{}' not found in section '{section}'",
                config.animation
            )
        })?;

    match &config.mix_animation {
        Some(mix) => {
            let secondary = library.resolve(section, mix).with_context(|| {
                format!("Mix animation '{mix}' not found in section '{section}'")
            })?;
            let names: Vec<&str> = config.mix_parts.iter().map(String::as_str).collect();
            player.flag_mix_parts(library, secondary, &names);
            player.mix_animation(
                library,
                primary,
                secondary,
                MixParts::Keep,
                config.flip,
                config.backward,
                false,
            );
        },
        None => player.set_animation(library, primary, config.flip, config.backward),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const ASSET: &str = "\
SPRITESHEET_FILENAME,fighter.png
TOTAL_NUM_PARTS,2
ROOT_INDEX,0
TOTAL_ANIMATIONS,2
PART_INDEX,0
PART_NAME,body
PART_RECTANGLE,0,0,8,8
PART_INDEX,1
PART_NAME,fist
PART_RECTANGLE,8,0,4,4
ANIMATION_NAME,walk
ANIMATION_NUMBER,0
ANIMATION_KEY_COUNT,2
LOOPING
KEY,0
TIME,0
PART,0
PART,1
KEY,1
TIME,100
PART,0
K_POS,10,0
PART,1
K_POS,10,0
ANIMATION_NAME,punch
ANIMATION_NUMBER,1
ANIMATION_KEY_COUNT,2
KEY,0
TIME,0
PART,0
PART,1
KEY,1
TIME,100
PART,0
PART,1
K_POS,20,0
BOX_ANIM_INDEX,1
BOX_INDEX,0
BOX_NAME,fist
BOX_TYPE,1
BOX_FIRST_KEY,0
BOX_LAST_KEY,1000
BOX_KEY_COUNT,2
B_K_INDEX,0
B_K_FRAME,0
B_K_RECT,0,0,10,10
B_K_INDEX,1
B_K_FRAME,1000
B_K_RECT,0,0,10,10
";

    fn config(dir: &Path, animation: &str) -> PreviewConfig {
        let asset_path = dir.join("fighter.txt");
        fs::write(&asset_path, ASSET).expect("Failed to write asset");
        PreviewConfig {
            asset_path,
            animation: animation.to_string(),
            frames: 50,
            target_fps: 100,
            fixed_step_ms: 10.0,
            ..PreviewConfig::default()
        }
    }

    #[test]
    fn test_preview_counts_loops() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let summary = preview(&config(dir.path(), "walk")).expect("preview runs");
        assert_eq!(summary.frames, 50);
        assert_eq!(summary.ticks, 50);
        assert_eq!(summary.loops, 5);
        assert_eq!(summary.finished_at, None);
        assert_eq!(summary.draw_items, 2);
        assert_eq!(summary.upload_bytes, 2 * std::mem::size_of::<QuadInstance>());
    }

    #[test]
    fn test_preview_one_shot_and_probe() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = PreviewConfig {
            frames: 20,
            probe_rect: Some([5, 5, 10, 10]),
            ..config(dir.path(), "punch")
        };
        let summary = preview(&config).expect("preview runs");
        assert_eq!(summary.finished_at, Some(9));
        assert_eq!(summary.loops, 0);
        // the fist box keeps its last rectangle once the punch has stopped
        assert_eq!(summary.hit_frames, 20);
    }

    #[test]
    fn test_preview_elapsed_mode_ticks_once_per_frame() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = PreviewConfig {
            time_step: TimeStepMode::Elapsed,
            target_fps: 50,
            ..config(dir.path(), "walk")
        };
        let summary = preview(&config).expect("preview runs");
        assert_eq!(summary.ticks, 50);
        // 20ms per tick over a 100ms loop
        assert_eq!(summary.loops, 10);
    }

    #[test]
    fn test_preview_with_mix() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = PreviewConfig {
            mix_animation: Some("punch".to_string()),
            mix_parts: vec!["fist".to_string()],
            ..config(dir.path(), "walk")
        };
        let summary = preview(&config).expect("preview runs");
        assert_eq!(summary.loops, 5);
        assert_eq!(summary.draw_items, 2);
    }

    #[test]
    fn test_preview_unknown_animation() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let err = preview(&config(dir.path(), "dance")).expect_err("animation is missing");
        assert!(err.to_string().contains("dance"));
    }

    #[test]
    fn test_preview_missing_asset() {
        let config = PreviewConfig {
            asset_path: "/nonexistent/fighter.txt".into(),
            ..PreviewConfig::default()
        };
        assert!(preview(&config).is_err());
    }
}
