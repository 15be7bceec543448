//! Overlay renderer process supervision.
//!
//! The renderer is started in its own process group so that everything it
//! spawns (an interpreter, a toolkit helper) is terminated together.  At
//! shutdown the group receives `SIGTERM`, then `SIGKILL` if it is still alive
//! after [`TERM_GRACE`].
//!
//! The daemon runs as root but the renderer must draw into the user's
//! graphical session.  When a run-as user is known the command is wrapped in
//! `runuser -u <user> --` and the session variables are forwarded.

use std::ffi::OsString;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Time the renderer gets to exit after `SIGTERM`.
pub const TERM_GRACE: Duration = Duration::from_secs(2);
const EXIT_POLL: Duration = Duration::from_millis(50);

/// Variables the renderer needs to reach the user's graphical session.
pub const SESSION_ENV: [&str; 4] = [
    "DISPLAY",
    "WAYLAND_DISPLAY",
    "XDG_RUNTIME_DIR",
    "DBUS_SESSION_BUS_ADDRESS",
];

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("overlay command is empty")]
    EmptyCommand,
    #[error("failed to start overlay renderer {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to signal overlay process group: {0}")]
    Signal(#[from] Errno),
}

/// Liveness of the supervised renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    NotLaunched,
    Running,
    Exited(ExitStatus),
}

/// Builds the argv actually executed for `command`.
///
/// With a run-as user the command is prefixed with `runuser -u <user> --`.
pub fn launch_argv(command: &[String], run_as: Option<&str>) -> Vec<String> {
    match run_as {
        Some(user) => ["runuser", "-u", user, "--"]
            .into_iter()
            .map(str::to_string)
            .chain(command.iter().cloned())
            .collect(),
        None => command.to_vec(),
    }
}

/// The user to run the renderer as: the configured one, else `$SUDO_USER`.
pub fn resolve_run_as(configured: Option<&str>) -> Option<String> {
    configured
        .map(str::to_string)
        .or_else(|| std::env::var("SUDO_USER").ok())
        .filter(|user| !user.is_empty() && user != "root")
}

/// Session variables present in the current environment.
fn session_env() -> Vec<(&'static str, OsString)> {
    SESSION_ENV
        .iter()
        .filter_map(|name| std::env::var_os(name).map(|value| (*name, value)))
        .collect()
}

/// Owns the renderer process for the lifetime of the daemon.
#[derive(Default)]
pub struct OverlaySupervisor {
    child: Option<Child>,
    exited: Option<ExitStatus>,
}

impl OverlaySupervisor {
    /// A supervisor with nothing to supervise (renderer started externally).
    pub fn none() -> Self {
        Self::default()
    }

    /// Spawns the renderer.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::EmptyCommand`] for an empty `command` and
    /// [`SupervisorError::Spawn`] if the program cannot be executed.
    pub fn launch(command: &[String], run_as: Option<&str>) -> Result<Self, SupervisorError> {
        let argv = launch_argv(command, run_as);
        let (program, args) = argv.split_first().ok_or(SupervisorError::EmptyCommand)?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .envs(session_env())
            .stdin(Stdio::null())
            .process_group(0)
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| SupervisorError::Spawn {
            program: program.clone(),
            source,
        })?;
        info!(pid = child.id(), ?argv, "overlay renderer started");
        Ok(Self {
            child: Some(child),
            exited: None,
        })
    }

    /// Checks whether the renderer is still alive.  Logs its exit once.
    pub fn poll(&mut self) -> Liveness {
        if let Some(status) = self.exited {
            return Liveness::Exited(status);
        }
        let Some(child) = self.child.as_mut() else {
            return Liveness::NotLaunched;
        };
        match child.try_wait() {
            Ok(None) => Liveness::Running,
            Ok(Some(status)) => {
                warn!(%status, "overlay renderer exited; division grids will not be drawn");
                self.exited = Some(status);
                Liveness::Exited(status)
            }
            Err(e) => {
                warn!("could not query overlay renderer status: {e}");
                Liveness::Running
            }
        }
    }

    /// Terminates the renderer's process group with the default grace period.
    pub async fn shutdown(&mut self) -> Result<(), SupervisorError> {
        self.shutdown_with_grace(TERM_GRACE).await
    }

    /// Sends `SIGTERM` to the group, waits up to `grace`, then sends `SIGKILL`.
    pub async fn shutdown_with_grace(&mut self, grace: Duration) -> Result<(), SupervisorError> {
        if matches!(self.poll(), Liveness::NotLaunched | Liveness::Exited(_)) {
            self.child = None;
            return Ok(());
        }
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let Some(pid) = child.id() else {
            return Ok(());
        };
        let group = Pid::from_raw(pid as i32);

        debug!(pgid = pid, "sending SIGTERM to overlay process group");
        match killpg(group, Signal::SIGTERM) {
            Ok(()) => {}
            Err(Errno::ESRCH) => {
                self.exited = child.wait().await.ok();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        let deadline = Instant::now() + grace;
        while Instant::now() < deadline {
            match child.try_wait() {
                Ok(Some(status)) => {
                    info!(%status, "overlay renderer stopped");
                    self.exited = Some(status);
                    return Ok(());
                }
                Ok(None) => tokio::time::sleep(EXIT_POLL).await,
                Err(e) => {
                    warn!("could not query overlay renderer status: {e}");
                    break;
                }
            }
        }

        warn!(pgid = pid, "overlay renderer ignored SIGTERM; sending SIGKILL");
        match killpg(group, Signal::SIGKILL) {
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(e) => return Err(e.into()),
        }
        if let Ok(status) = child.wait().await {
            self.exited = Some(status);
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
