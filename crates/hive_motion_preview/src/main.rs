// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless preview host for the honeycomb effects.
//!
//! Plays one effect on a simulated clock and prints every frame, either as
//! text or as JSON lines for downstream renderers.

mod cli;
mod error;
mod session;
mod settings;

use clap::Parser;
use cli::Args;
use error::PreviewError;
use session::PreviewSession;
use settings::PreviewSettings;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("hive_motion_preview=info,hive_motion_sequencer=info,hive_motion_effects=info")
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting hive-preview v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(Args::parse()) {
        tracing::error!("Preview failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), PreviewError> {
    let cwd = std::env::current_dir().map_err(|source| PreviewError::Io {
        path: ".".into(),
        source,
    })?;
    let mut settings = PreviewSettings::resolve(args.config.as_deref(), &cwd)?;
    args.apply(&mut settings);

    if let Some(path) = &args.write_config {
        settings.save(path)?;
        tracing::info!("Wrote settings to {:?}", path);
        return Ok(());
    }

    tracing::info!(
        "Playing {} at {} fps",
        settings.playback.effect.display_name(),
        settings.playback.fps
    );
    let stdout = std::io::stdout().lock();
    let mut session = PreviewSession::new(&settings, args.format.into(), stdout)?;
    session.run(&settings)?;
    Ok(())
}
