use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use nix::sys::wait::WaitStatus;

/// Logs the error of a `Result` without consuming it.
#[macro_export]
macro_rules! log_if_err {
    ($result:expr, $($arg:tt)+) => {
        if let Err(ref e) = $result {
            ::log::error!("{}: {}", format_args!($($arg)+), e);
        }
    };
}

/// Smallsh Utility Extensions for `ExitStatus`
pub trait ShExitStatusExt {
    /// Create an ExitStatus to indicate *successful* program execution.
    fn from_success() -> Self;

    /// Create an ExitStatus to indicate *unsuccessful* program execution.
    fn from_failure() -> Self;

    /// Create an ExitStatus from an exit code
    fn from_status(code: i32) -> Self;

    /// Create an ExitStatus for a process terminated by `signal`
    fn from_signal(signal: i32) -> Self;

    /// Human readable outcome, as printed by `status` and job notifications.
    fn describe(&self) -> String;
}

impl ShExitStatusExt for ExitStatus {
    /// # Examples
    /// ```rust
    /// use smallsh::ShExitStatusExt;
    /// use std::process::ExitStatus;
    /// assert!(ExitStatus::from_success().success());
    /// ```
    fn from_success() -> Self {
        ExitStatus::from_status(0)
    }

    /// # Examples
    /// ```rust
    /// use smallsh::ShExitStatusExt;
    /// use std::process::ExitStatus;
    /// assert!(!ExitStatus::from_failure().success());
    /// ```
    fn from_failure() -> Self {
        ExitStatus::from_status(1)
    }

    /// # Examples
    /// ```rust
    /// use smallsh::ShExitStatusExt;
    /// use std::process::ExitStatus;
    /// assert!(ExitStatus::from_status(0).success());
    /// assert_eq!(ExitStatus::from_status(2).code(), Some(2));
    /// ```
    fn from_status(code: i32) -> Self {
        ExitStatus::from_raw((code & 0xff) << 8)
    }

    fn from_signal(signal: i32) -> Self {
        ExitStatus::from_raw(signal & 0x7f)
    }

    fn describe(&self) -> String {
        match (self.code(), self.signal()) {
            (Some(code), _) => format!("exit value {}", code),
            (None, Some(signal)) => format!("terminated by signal {}", signal),
            (None, None) => format!("unknown status {}", self.into_raw()),
        }
    }
}

/// Converts a terminal `WaitStatus` into an `ExitStatus`.
///
/// Returns `None` for statuses that do not mean the process is gone, e.g.
/// `StillAlive` from a `WNOHANG` wait.
pub fn exit_status_from_wait(wait_status: WaitStatus) -> Option<ExitStatus> {
    match wait_status {
        WaitStatus::Exited(_, code) => Some(ExitStatus::from_status(code)),
        WaitStatus::Signaled(_, signal, _) => Some(ExitStatus::from_signal(signal as i32)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::Signal;
    use nix::unistd::Pid;

    #[test]
    fn describe_exit_code() {
        assert_eq!(ExitStatus::from_status(0).describe(), "exit value 0");
        assert_eq!(ExitStatus::from_status(2).describe(), "exit value 2");
    }

    #[test]
    fn describe_signal() {
        let status = ExitStatus::from_signal(Signal::SIGTERM as i32);
        assert_eq!(status.code(), None);
        assert_eq!(status.describe(), "terminated by signal 15");
    }

    #[test]
    fn wait_status_conversion() {
        let pid = Pid::from_raw(42);
        assert_eq!(
            exit_status_from_wait(WaitStatus::Exited(pid, 3)),
            Some(ExitStatus::from_status(3))
        );
        assert_eq!(
            exit_status_from_wait(WaitStatus::Signaled(pid, Signal::SIGKILL, false)),
            Some(ExitStatus::from_signal(9))
        );
        assert_eq!(exit_status_from_wait(WaitStatus::StillAlive), None);
    }
}
