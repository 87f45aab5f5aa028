//! Process-wide signal disposition, applied once at startup.

use log::debug;
use nix::libc;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

use crate::errors::Result;

extern "C" fn ignore_signal(_: libc::c_int) {}

/// Installs a no-op handler for SIGTSTP so ^Z does not suspend the shell.
///
/// A caught signal (unlike an ignored one) is reset to its default action by
/// exec, so children still get the default behaviour. `SA_RESTART` keeps a
/// pending read or wait from failing with `EINTR`.
pub fn install() -> Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(ignore_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // The handler is empty, so it is trivially async-signal-safe.
    unsafe { signal::sigaction(Signal::SIGTSTP, &action) }?;
    debug!("installed SIGTSTP handler");
    Ok(())
}

/// Restores default handling of SIGPIPE, which the Rust runtime ignores at
/// startup. Called in a forked child before exec, since an ignored disposition
/// survives exec.
pub fn reset_for_exec() -> Result<()> {
    unsafe { signal::signal(Signal::SIGPIPE, SigHandler::SigDfl) }?;
    Ok(())
}
