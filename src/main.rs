//! Chain Reaction headless driver
//!
//! Runs a simulation on a manual clock at a fixed frame period. One seed
//! explosion starts the reaction; every touched ball is removed and explodes
//! in turn. Stops when the field is empty, the reaction dies out, or the
//! frame budget runs out.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::Cell;
    use std::path::PathBuf;
    use std::rc::Rc;

    use clap::Parser;

    use chain_reaction::{BallSpec, ManualClock, SimConfig, Simulation, persistence};

    /// Headless chain reaction run
    #[derive(Debug, Parser)]
    #[command(version, about)]
    struct Args {
        /// JSON config file (other options override it)
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        width: Option<f32>,
        #[arg(long)]
        height: Option<f32>,
        /// Number of balls to spawn
        #[arg(long, default_value_t = 50)]
        balls: usize,
        /// Frame budget
        #[arg(long, default_value_t = 3600)]
        frames: u64,
        /// Frame period (ms)
        #[arg(long, default_value_t = 1000.0 / 60.0)]
        frame_ms: f64,
        /// Max radius of every explosion
        #[arg(long, default_value_t = 30.0)]
        radius: f32,
        #[arg(long)]
        seed: Option<u64>,
    }

    pub fn run() -> anyhow::Result<()> {
        let args = Args::parse();

        let mut config = match &args.config {
            Some(path) => SimConfig::load(path)?,
            None => SimConfig::default(),
        };
        if let Some(width) = args.width {
            config.width = width;
        }
        if let Some(height) = args.height {
            config.height = height;
        }
        if args.seed.is_some() {
            config.seed = args.seed;
        }

        let clock = ManualClock::new(0.0);
        let mut sim = Simulation::with_clock(config, Box::new(clock.clone()))?;
        for _ in 0..args.balls {
            sim.add_ball(BallSpec::new());
        }

        let chained = Rc::new(Cell::new(0usize));
        let counter = chained.clone();
        let radius = args.radius;
        sim.on_touch_explosion(move |touch, commands| {
            commands.remove_ball(touch.ball_id.clone());
            commands.explode(touch.pos.x, touch.pos.y, radius);
            counter.set(counter.get() + 1);
            Ok(())
        });

        let (w, h) = (sim.config().width, sim.config().height);
        sim.explode(w / 2.0, h / 2.0, radius);
        log::info!("Seeded explosion at ({:.0}, {:.0}), {} balls", w / 2.0, h / 2.0, args.balls);

        sim.tick();
        let mut frames = 0;
        while frames < args.frames {
            clock.advance(args.frame_ms);
            let report = sim.tick();
            frames += 1;

            if !report.touched.is_empty() {
                log::info!(
                    "Frame {}: {} touched, {} balls left",
                    report.frame,
                    report.touched.len(),
                    sim.ball_count()
                );
            }
            if sim.is_empty() || sim.explosion_count() == 0 {
                break;
            }
        }

        let save = persistence::encode(&sim.serialize())?;
        println!(
            "{} of {} balls caught in {} frames ({:.1}s simulated), {} balls left, save {} bytes",
            chained.get(),
            args.balls,
            frames,
            clock_seconds(&sim),
            sim.ball_count(),
            save.len()
        );
        Ok(())
    }

    fn clock_seconds(sim: &Simulation) -> f64 {
        sim.now_ms() / 1000.0
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is the `ChainReaction` class, this is just to satisfy the compiler
}
