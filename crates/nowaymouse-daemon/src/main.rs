//! nowaymouse daemon entry point.
//!
//! Loads the configuration, grabs the keyboard, creates the virtual devices,
//! and runs the two long-lived activities until shutdown:
//!
//! ```text
//! main()
//!  ├─ load + validate config          (fatal on error)
//!  ├─ EvdevKeyboard::open()           (grab the physical keyboard)
//!  ├─ UinputEmulator::new()           (virtual keyboard + virtual mouse)
//!  ├─ OverlaySupervisor::launch()     (optional renderer process)
//!  ├─ tokio::spawn(MovementEngine)    (16 ms tick)
//!  ├─ thread "input-router"           (RouteInputUseCase::run)
//!  └─ wait for Ctrl-C / SIGTERM / router exit, then tear down
//! ```
//!
//! The router runs on its own OS thread because it blocks on the keyboard
//! channel and must never share a runtime worker with the tick loop.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nowaymouse_core::{AppConfig, Settings};
use nowaymouse_daemon::infrastructure::storage::config::{load_config, ConfigSource};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Keyboard-driven pointer control.
///
/// Grabs a keyboard and turns it into a mouse: hold keys to move the pointer,
/// or pick a spot on screen by typing grid labels.
#[derive(Debug, Parser)]
#[command(name = "nowaymouse", version)]
struct Cli {
    /// Configuration file.  Defaults to `~/.config/nowaymouse/config.toml`.
    #[arg(long, env = "NOWAYMOUSE_CONFIG")]
    config: Option<PathBuf>,

    /// Keyboard evdev node, overriding `keyboard_input_path`.
    #[arg(long, env = "NOWAYMOUSE_DEVICE")]
    device: Option<PathBuf>,

    /// Log level (`error`, `warn`, `info`, `debug`, `trace`).  `RUST_LOG`
    /// takes precedence.
    #[arg(long)]
    log_level: Option<String>,

    /// List keyboards under /dev/input and exit.
    #[arg(long)]
    list_devices: bool,

    /// Validate the configuration, print a summary and exit.
    #[arg(long)]
    check_config: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration.
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(device) = &self.device {
            config.keyboard_input_path = device.clone();
        }
        if let Some(level) = &self.log_level {
            config.daemon.log_level = level.clone();
        }
    }
}

fn init_logging(level: &str) {
    let fallback = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or(fallback))
        .init();
}

fn log_config_source(source: &ConfigSource) {
    match source {
        ConfigSource::File(path) => info!(path = %path.display(), "config loaded"),
        ConfigSource::Defaults(path) => {
            info!(path = %path.display(), "no config file; using built-in defaults")
        }
    }
}

fn print_summary(settings: &Settings) {
    println!("configuration OK");
    println!("  keyboard:   {}", settings.keyboard_input_path.display());
    println!(
        "  screen:     {}x{}",
        settings.screen_width, settings.screen_height
    );
    println!(
        "  speeds:     mouse {} px/tick, scroll {} /tick",
        settings.mouse_speed, settings.scroll_speed
    );
    for (i, level) in settings.division.levels().iter().enumerate() {
        println!(
            "  level {i}:    {}x{} [{}]",
            level.cols(),
            level.rows(),
            level.labels().join(" ")
        );
    }
    let (cell_w, cell_h) = settings.division.final_cell();
    println!("  final cell: {cell_w:.1}x{cell_h:.1} px");
    println!("  overlay:    {}", settings.overlay.socket_path.display());
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.list_devices {
        return list_devices();
    }

    let loaded = load_config(cli.config.as_deref()).context("loading configuration")?;
    let mut config = loaded.config;
    cli.apply_overrides(&mut config);
    init_logging(&config.daemon.log_level);
    log_config_source(&loaded.source);

    let settings = Settings::from_config(&config).context("invalid configuration")?;
    if cli.check_config {
        print_summary(&settings);
        return Ok(());
    }

    daemon::run(settings).await
}

#[cfg(target_os = "linux")]
fn list_devices() -> anyhow::Result<()> {
    use nowaymouse_daemon::infrastructure::input_capture::linux::list_keyboards;

    let keyboards = list_keyboards();
    if keyboards.is_empty() {
        println!("no keyboards found (are you root or in the `input` group?)");
    }
    for keyboard in keyboards {
        println!("{}\t{}", keyboard.path.display(), keyboard.name);
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn list_devices() -> anyhow::Result<()> {
    anyhow::bail!("device listing requires Linux evdev")
}

#[cfg(target_os = "linux")]
mod daemon {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use anyhow::Context;
    use tokio::signal::unix::{signal, SignalKind};
    use tokio::sync::oneshot;
    use tracing::{error, info, warn};

    use nowaymouse_core::Settings;
    use nowaymouse_daemon::application::emulate_input::{InputEmitter, PlatformInputEmulator};
    use nowaymouse_daemon::application::movement::{shared_held_keys, MovementEngine};
    use nowaymouse_daemon::application::overlay_sync::OverlayChannel;
    use nowaymouse_daemon::application::route_input::RouteInputUseCase;
    use nowaymouse_daemon::infrastructure::input_capture::{linux::EvdevKeyboard, InputSource};
    use nowaymouse_daemon::infrastructure::input_emulation::linux::UinputEmulator;
    use nowaymouse_daemon::infrastructure::overlay::process::{resolve_run_as, OverlaySupervisor};
    use nowaymouse_daemon::infrastructure::overlay::UnixSocketOverlay;

    const LIVENESS_INTERVAL: Duration = Duration::from_secs(1);

    pub async fn run(settings: Settings) -> anyhow::Result<()> {
        info!("nowaymouse starting");
        let running = Arc::new(AtomicBool::new(true));

        // ── Devices ───────────────────────────────────────────────────────────
        let keyboard = EvdevKeyboard::open(&settings.keyboard_input_path).with_context(|| {
            format!(
                "cannot grab keyboard {} (try --list-devices)",
                settings.keyboard_input_path.display()
            )
        })?;
        let emulator: Arc<dyn PlatformInputEmulator> =
            Arc::new(UinputEmulator::new().context("cannot create virtual devices")?);

        // ── Overlay renderer ──────────────────────────────────────────────────
        let mut supervisor = if settings.overlay.command.is_empty() {
            info!("no overlay command configured; expecting an external renderer");
            OverlaySupervisor::none()
        } else {
            let run_as = resolve_run_as(settings.overlay.run_as_user.as_deref());
            match OverlaySupervisor::launch(&settings.overlay.command, run_as.as_deref()) {
                Ok(supervisor) => supervisor,
                Err(e) => {
                    warn!("{e}; continuing without an overlay renderer");
                    OverlaySupervisor::none()
                }
            }
        };

        // ── Movement engine ───────────────────────────────────────────────────
        let output = InputEmitter::new(emulator, settings.screen_width, settings.screen_height);
        let held = shared_held_keys();
        let engine = MovementEngine::new(
            Arc::clone(&held),
            output.clone(),
            settings.mouse_speed,
            settings.scroll_speed,
        );
        let engine_task = tokio::spawn(engine.run(Arc::clone(&running)));

        // ── Input router ──────────────────────────────────────────────────────
        let overlay = OverlayChannel::new(Arc::new(UnixSocketOverlay::new(
            settings.overlay.socket_path.clone(),
        )));
        let router = RouteInputUseCase::new(&settings, held, output, overlay);
        let events = keyboard.start().context("cannot start keyboard reader")?;
        let (router_done_tx, mut router_done) = oneshot::channel::<()>();
        let router_running = Arc::clone(&running);
        let router_thread = thread::Builder::new()
            .name("input-router".into())
            .spawn(move || {
                router.run(events, router_running);
                let _ = router_done_tx.send(());
            })
            .context("cannot start input router thread")?;

        info!(
            keyboard = %keyboard.path().display(),
            "nowaymouse ready"
        );

        // ── Wait for shutdown ─────────────────────────────────────────────────
        let mut sigterm = signal(SignalKind::terminate()).context("cannot install SIGTERM handler")?;
        let mut liveness = tokio::time::interval(LIVENESS_INTERVAL);
        loop {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        error!("failed to listen for Ctrl+C: {e}");
                    }
                    info!("received Ctrl+C; shutting down");
                    break;
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM; shutting down");
                    break;
                }
                _ = &mut router_done => {
                    error!("input router exited; shutting down");
                    break;
                }
                _ = liveness.tick() => {
                    supervisor.poll();
                }
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        running.store(false, Ordering::Relaxed);
        keyboard.stop();
        match tokio::task::spawn_blocking(move || router_thread.join()).await {
            Ok(Ok(())) => {}
            _ => warn!("input router thread panicked"),
        }
        if let Err(e) = engine_task.await {
            warn!("movement engine task failed: {e}");
        }
        if let Err(e) = supervisor.shutdown().await {
            warn!("overlay renderer shutdown failed: {e}");
        }
        info!("nowaymouse stopped");
        Ok(())
    }
}

#[cfg(not(target_os = "linux"))]
mod daemon {
    use nowaymouse_core::Settings;

    pub async fn run(_settings: Settings) -> anyhow::Result<()> {
        anyhow::bail!("nowaymouse requires Linux evdev and uinput")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
