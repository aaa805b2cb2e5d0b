//! Entry point of the `applauncher` binary.
//!
//! All work happens in [`applauncher::run`]; the binary only supplies the
//! process arguments and locked standard streams.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    applauncher::run(std::env::args_os(), &mut stdout, &mut stderr)
}
