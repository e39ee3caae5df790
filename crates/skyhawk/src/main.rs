//! Skyhawk headless demo: runs the title sequence into autopilot flight on a fixed tick
//! and logs what would be drawn.

use anyhow::Result;
use engine_core::FixedStep;
use renderer::{DrawLog, LineBatch, TextureIndex};
use skyhawk::scene::PARTICLE_TEXTURES;
use skyhawk::{GameConfig, SceneId, SceneManager};
use std::time::Duration;

/// Simulated wall-clock frame, slower than the tick so the accumulator gets exercised.
const FRAME_TIME: Duration = Duration::from_micros(20_000);

/// Simulated seconds between status lines.
const REPORT_INTERVAL: f32 = 5.0;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("╔══════════════════════════════════════╗");
    println!("║               SKYHAWK                ║");
    println!("║   headless title + flight demo run   ║");
    println!("╚══════════════════════════════════════╝");

    let config = GameConfig::load();
    if !skyhawk::config::config_path().exists() {
        config.save();
        log::info!("Wrote default settings to {:?}", skyhawk::config::config_path());
    }
    log::info!(
        "Running {:.0}s demo, title hands over after {:.1}s of orbit",
        config.demo.seconds,
        config.demo.title_auto_start
    );

    let mut textures = TextureIndex::new();
    for name in PARTICLE_TEXTURES {
        textures.register(name, 64, 64);
    }

    let demo_seconds = config.demo.seconds;
    let mut scenes = SceneManager::new(config, SceneId::Title, &mut textures)?;
    let mut clock = FixedStep::default();
    let mut draws = DrawLog::new();
    let mut lines = LineBatch::new();
    let mut next_report = 0.0;
    let mut frames: u64 = 0;
    let mut peak_instances = 0;

    while clock.simulated_seconds() < demo_seconds {
        let ticks = clock.advance(FRAME_TIME);
        for _ in 0..ticks {
            scenes.update(clock.dt(), &mut textures)?;
        }

        draws.clear();
        lines.clear();
        scenes.draw(&mut draws, &mut lines);
        frames += 1;
        peak_instances = peak_instances.max(draws.instance_total());

        if clock.simulated_seconds() >= next_report {
            next_report += REPORT_INTERVAL;
            log::info!(
                "{} | {} draws, {} instances, {} HUD lines",
                scenes.scene().describe(),
                draws.draws.len(),
                draws.instance_total(),
                lines.line_count()
            );
        }
    }

    log::info!(
        "Demo finished: {} frames, {} ticks, peak {} particle instances per frame, ended in {:?}",
        frames,
        clock.tick_count(),
        peak_instances,
        scenes.current()
    );
    Ok(())
}
