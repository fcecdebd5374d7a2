use std::cell::Cell;
use std::ops::ControlFlow;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use framestep::{IntervalFrames, Scheduler, SchedulerConfig, Step, Ticker};

/// Drive a framestep scheduler at a fixed cadence and report what ran.
#[derive(Parser, Debug)]
#[command(name = "framestep", version)]
struct Cli {
    /// Number of frames to run.
    #[arg(long, default_value_t = 120)]
    frames: u64,

    /// Frame cadence in frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Time dilation factor applied to per-frame elapsed time.
    #[arg(long, default_value_t = 1.0)]
    dilate: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let source = IntervalFrames::from_fps(cli.fps).context("invalid --fps")?;
    let mut frame = Scheduler::with_clock(SchedulerConfig::default(), source.clock());
    frame.dilate(cli.dilate);

    let updates = Rc::new(Cell::new(0u64));
    let simulated = Rc::new(Cell::new(Duration::ZERO));
    let renders = Rc::new(Cell::new(0u64));

    let target = cli.frames;
    {
        let updates = Rc::clone(&updates);
        let simulated = Rc::clone(&simulated);
        frame.on(Step::Update, move |f| {
            updates.set(updates.get() + 1);
            simulated.set(simulated.get() + f.elapsed());
            if updates.get() >= target {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
    }
    {
        let renders = Rc::clone(&renders);
        frame.on(Step::Render, move |_| {
            renders.set(renders.get() + 1);
            if renders.get() >= target {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
    }

    let mut ticker = Ticker::new(source);
    ticker.run_while(&mut frame, |f| f.pending());

    eprintln!("updates:        {}", updates.get());
    eprintln!("renders:        {}", renders.get());
    eprintln!("simulated time: {:?}", simulated.get());
    eprintln!("last tick:      {:?}", frame.time());
    eprintln!("last elapsed:   {:?}", frame.elapsed());
    Ok(())
}
