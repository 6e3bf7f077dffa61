//! Scene Cycler CLI
//!
//! Usage: `cycler [config.json]`. Must run from an elevated console so the
//! firewall rule can be managed.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use scene_cycler::config::{self, Settings};
use scene_cycler::network::{NetworkGuard, ShutdownHook};
use scene_cycler::platform::is_elevated;
use scene_cycler::timing::{Clock, SystemClock};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    if !is_elevated() {
        return Err("administrator privileges are required to manage firewall rules".into());
    }

    let arg = std::env::args().nth(1);
    let path = config::config_path(arg.as_deref());
    let settings = Settings::load(&path)?;
    log::info!("Loaded configuration from {}", path.display());

    let guard = Arc::new(NetworkGuard::system(&settings.target));
    let _hook = ShutdownHook::install(Arc::clone(&guard))?;

    let mut controller =
        scene_cycler::desktop_controller(&settings, &config::base_dir(), Arc::clone(&guard))?;

    print_banner(&settings);
    wait_for_enter()?;

    log::info!("Waiting {} seconds...", settings.start_delay.as_secs());
    SystemClock.sleep(settings.start_delay);
    println!();
    println!(">>> Starting");

    let summary = controller.run()?;
    log::info!("Finished {} cycle(s)", summary.cycles_completed);
    Ok(())
}

fn print_banner(settings: &Settings) {
    println!("Scene Cycler");
    println!("{}", "-".repeat(60));
    println!("Window:        {}", settings.target.window_title);
    println!("Cycles:        {}", settings.cycle_count);
    println!(
        "Grace period:  {}s",
        settings.transaction_waiting.as_secs()
    );
    println!();
    println!("Open the game and enter story mode.");
    println!("Press Enter when ready; the run starts after {}s.", settings.start_delay.as_secs());
    println!("Keep the game window focused. Ctrl+C stops and restores the network.");
    println!("{}", "-".repeat(60));
}

fn wait_for_enter() -> io::Result<()> {
    print!(">>> Press Enter to start...");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}
