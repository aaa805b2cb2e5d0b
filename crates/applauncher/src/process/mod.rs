//! Starts application processes detached from the launcher.
//!
//! A detached process is placed in its own session on Unix and in a new
//! console on Windows, so closing the launcher does not terminate it. The
//! child receives exactly the composed environment and runs from the
//! directory containing its executable.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use indexmap::IndexMap;
use tracing::debug;

use crate::error::LaunchError;

const PROCESS_TARGET: &str = "applauncher::process";

/// Everything needed to start one process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessRequest {
    /// Command line, executable first.
    pub command: Vec<String>,
    /// Complete environment of the child.
    pub env: IndexMap<String, String>,
    /// Working directory of the child.
    pub cwd: Option<PathBuf>,
}

/// Starts processes on behalf of the launch orchestrator.
pub trait ProcessSpawner {
    /// Starts `request` and returns the child's process identifier.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] when the command is empty or the operating
    /// system refuses to start it.
    fn spawn(&self, request: &ProcessRequest) -> Result<u32, LaunchError>;
}

impl<S: ProcessSpawner + ?Sized> ProcessSpawner for &S {
    fn spawn(&self, request: &ProcessRequest) -> Result<u32, LaunchError> {
        (**self).spawn(request)
    }
}

/// Spawner that detaches children from the launcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedSpawner;

impl ProcessSpawner for DetachedSpawner {
    fn spawn(&self, request: &ProcessRequest) -> Result<u32, LaunchError> {
        let (program, arguments) = request
            .command
            .split_first()
            .ok_or(LaunchError::EmptyCommand)?;

        let mut command = Command::new(program);
        command
            .args(arguments)
            .env_clear()
            .envs(&request.env)
            .stdin(Stdio::null());
        if let Some(cwd) = request.cwd.as_ref() {
            command.current_dir(cwd);
        }
        detach(&mut command);

        let child = command.spawn().map_err(|source| LaunchError::Spawn {
            program: program.clone(),
            source,
        })?;
        debug!(target: PROCESS_TARGET, pid = child.id(), program = %program, "process started");
        Ok(child.id())
    }
}

#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::io;
    use std::os::unix::process::CommandExt;

    // SAFETY: `setsid` is async-signal-safe and runs in the forked child
    // before exec without touching memory shared with the parent.
    unsafe {
        command.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(windows)]
fn detach(command: &mut Command) {
    use std::os::windows::process::CommandExt;

    const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;
    command.creation_flags(CREATE_NEW_CONSOLE);
}

#[cfg(not(any(unix, windows)))]
const fn detach(_command: &mut Command) {}
