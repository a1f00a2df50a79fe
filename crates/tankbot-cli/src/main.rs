//! `tankbot-cli` – headless launcher for the tank-drive robot.
//!
//! 1. Loads `~/.tankbot/config.toml`, writing the defaults on first run.
//! 2. Builds the simulated robot and wires the control loop and the
//!    guidance task to one shared [`RobotContext`].
//! 3. Feeds the guidance task from a simulated vision pipeline at the
//!    configured camera rate.
//! 4. Ticks the control loop at the configured period until **Ctrl-C**,
//!    then stops both tasks and prints loop statistics.

mod config;

use std::sync::atomic::Ordering;

use colored::Colorize;
use tankbot_hal::sim::SimPipeline;
use tankbot_runtime::sim::SimRobot;
use tankbot_runtime::{ControlLoop, Guidance, RobotContext, TickStats};
use tankbot_types::DetectionResult;
use tokio::sync::mpsc;
use tracing::{info, warn};

fn main() {
    tankbot_runtime::init_logging();
    print_banner();

    let cfg = load_or_create_config();
    let ctx = RobotContext::new(cfg.targeting);

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    let shutdown = ctx.shutdown_flag();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping the robot …".yellow().bold());
        shutdown.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; the robot will only stop when killed");
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("{}: {}", "Failed to start async runtime".red(), e);
            std::process::exit(1);
        }
    };

    println!(
        "  Running at {} ms per tick.  Press {} to stop.\n",
        cfg.period_ms.to_string().bold(),
        "Ctrl-C".bold().cyan()
    );
    let stats = runtime.block_on(run_robot(&cfg, ctx));

    println!();
    println!("  {} {} ticks", "✓".green().bold(), stats.iterations);
    println!(
        "    overruns: {}   faulted ticks: {}   slowest tick: {:?}",
        stats.overruns, stats.faulted_ticks, stats.max_tick
    );
}

/// Run the control loop and the guidance task until shutdown.
async fn run_robot(cfg: &config::Config, ctx: RobotContext) -> TickStats {
    let sim = SimRobot::new();

    // ── Vision: pipeline → guidance ───────────────────────────────────────
    let (frames_tx, frames_rx) = mpsc::channel::<DetectionResult>(1);
    let guidance = Guidance::new(cfg.guidance(), sim.camera(), &ctx);
    let guidance_task = tokio::spawn(guidance.run(frames_rx));

    let frame_interval = cfg.frame_interval();
    let mut pipeline = SimPipeline::new(cfg.frame_width, cfg.frame_height);
    let producer_ctx = ctx.clone();
    let producer = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(frame_interval);
        while !producer_ctx.is_shutdown_requested() {
            ticker.tick().await;
            let Some(frame) = pipeline.next() else { break };
            if frames_tx.send(frame).await.is_err() {
                break;
            }
        }
    });

    // ── Control loop ──────────────────────────────────────────────────────
    let mut control = ControlLoop::new(cfg.control(), sim.hardware(), &ctx);
    let stats = tankbot_runtime::run(&mut control, cfg.period(), &ctx).await;

    if let Err(e) = producer.await {
        warn!(error = %e, "vision pipeline task failed");
    }
    match guidance_task.await {
        Ok(frames) => info!(frames, "guidance task finished"),
        Err(e) => warn!(error = %e, "guidance task failed"),
    }
    stats
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

fn load_or_create_config() -> config::Config {
    match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let cfg = config::Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  {} Default config written to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Error saving config".red(), e),
            }
            defaults_with_env()
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            defaults_with_env()
        }
    }
}

fn defaults_with_env() -> config::Config {
    config::defaults_with_env().unwrap_or_else(|e| {
        println!("{}: {}", "Ignoring TANKBOT_* overrides".red(), e);
        config::Config::default()
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"  ______            __   __          __ "#.bold().cyan());
    println!("{}", r#" /_  __/___ _____  / /__/ /_  ____  / /_"#.bold().cyan());
    println!("{}", r#"  / / / __ `/ __ \/ //_/ __ \/ __ \/ __/"#.bold().cyan());
    println!("{}", r#" / / / /_/ / / / / ,< / /_/ / /_/ / /_  "#.bold().cyan());
    println!("{}", r#"/_/  \__,_/_/ /_/_/|_/_.___/\____/\__/  "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "Tankbot".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Tank-drive teleoperation controller");
    println!();
}
