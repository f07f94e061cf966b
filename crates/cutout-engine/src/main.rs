//! # Cutout
//!
//! Headless preview for cut-out sprite animations.
//!
//! Loads a text asset, plays one animation (optionally mixed with a second)
//! for a number of simulated frames and logs what happened:
//! - Loop and completion events
//! - Bounding-box hits against a probe rectangle
//! - The final frame's draw list size
//!
//! The configuration file path may be passed as the first argument; it
//! defaults to `cutout.toml` in the working directory. `cutout --init [path]`
//! writes a default configuration instead of running.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod timing;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::PreviewConfig;

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("cutout=info".parse()?))
        .init();

    info!("Cutout preview starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args_os().skip(1);
    let mut config = match args.next() {
        Some(flag) if flag == "--init" => {
            let config = PreviewConfig::default();
            match args.next() {
                Some(path) => config.save_to(path)?,
                None => config.save()?,
            }
            return Ok(());
        },
        Some(path) => PreviewConfig::load_from(path),
        None => PreviewConfig::load(),
    };
    config.validate();

    app::run(&config)?;

    info!("Cutout preview finished");
    Ok(())
}
