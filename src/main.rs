//! Blast Runner headless driver
//!
//! Runs the simulation with a scripted input stream and synthetic frame
//! timestamps, logging host events and a HUD line once per simulated second.
//! Prints the final render snapshot as JSON.
//!
//! Usage: `blast-runner [SEED] [TICKS] [--tuning PATH]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use blast_runner::Tuning;
    use blast_runner::sim::{EventSink, FrameClock, GameEvent, GameState, SinkError, SoundKind, TickInput, tick};
    use clap::Parser;

    /// Stand-in for audio and particle hosts: just logs
    struct LogSink;

    impl EventSink for LogSink {
        fn handle(&mut self, event: &GameEvent) -> Result<(), SinkError> {
            match event {
                GameEvent::Sound { kind: SoundKind::Explosion, volume } => log::debug!("BOOM (volume {:.2})", volume),
                GameEvent::Sound { kind: SoundKind::Impact, volume } => log::trace!("thud (volume {:.2})", volume),
                GameEvent::ParticleBurst { pos, count, .. } => {
                    log::trace!("{} particles at ({:.0}, {:.0})", count, pos.x, pos.y)
                }
            }
            Ok(())
        }
    }

    /// Run the simulation without a window and dump the final frame
    #[derive(Parser, Debug)]
    #[command(name = "blast-runner", version, about, long_about = None)]
    struct Args {
        /// Run seed
        #[arg(value_name = "SEED", default_value_t = 0xB1A5)]
        seed: u64,
        /// Number of frames to simulate
        #[arg(
            value_name = "TICKS",
            default_value_t = 1800,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        ticks: u32,
        /// JSON tuning file; missing fields keep their defaults
        #[arg(long, value_name = "PATH")]
        tuning: Option<PathBuf>,
    }

    /// Run right, dash in bursts, hop every so often
    fn scripted_input(frame: u32) -> TickInput {
        TickInput {
            left: false,
            right: frame % 240 < 200,
            jump: frame % 50 < 3 || frame % 50 == 20,
            dash: frame % 300 > 150,
        }
    }

    pub fn run() {
        env_logger::init();
        let args = Args::parse();

        let tuning = match &args.tuning {
            Some(path) => match Tuning::load(path) {
                Ok(tuning) => tuning,
                Err(e) => {
                    log::error!("{}: {}", path.display(), e);
                    std::process::exit(1);
                }
            },
            None => Tuning::default(),
        };

        log::info!("Blast Runner (headless) starting with seed {}", args.seed);
        let mut state = GameState::with_tuning(args.seed, tuning);
        let mut clock = FrameClock::new(state.tuning.max_dt);
        let mut sink = LogSink;

        // 60 Hz with a hitch every ten seconds
        let mut now_ms = 0.0f64;
        clock.advance(now_ms);
        for frame in 0..args.ticks {
            now_ms += if frame % 600 == 599 { 250.0 } else { 1000.0 / 60.0 };
            let dt = clock.advance(now_ms);
            tick(&mut state, &scripted_input(frame), dt);

            let failed = state.flush_events(&mut sink);
            if failed > 0 {
                log::warn!("{} events dropped", failed);
            }

            if frame % 60 == 59 {
                let hud = state.hud();
                log::info!(
                    "t={:.1}s x={:.0} y={:.0} speed={:.0} camera={:.0} objects={} resets={}",
                    state.time,
                    hud.x,
                    hud.y,
                    hud.speed,
                    hud.camera_x,
                    hud.live_objects,
                    hud.resets
                );
            }
        }

        match serde_json::to_string_pretty(&state.snapshot()) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to serialize snapshot: {}", e),
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly on wasm
}
