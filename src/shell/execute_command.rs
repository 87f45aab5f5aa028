use std::ffi::CString;
use std::io::{self, Write};
use std::os::unix::io::RawFd;

use log::{debug, warn};
use nix::fcntl::{self, FcntlArg, OFlag};
use nix::libc;
use nix::sys::stat::Mode;
use nix::unistd::{self, ForkResult, Pid};

use super::job_control;
use super::signals;
use super::{Shell, PROGRAM_NAME};
use crate::core::parser::Command;
use crate::errors::{Error, ErrorKind, Result, ResultExt};

/// Saved copies of the shell's stdin and stdout.
///
/// Dropping the guard puts the originals back on fds 0 and 1, so a redirection
/// made for one command never outlives its launch.
struct StdioGuard {
    saved_stdin: RawFd,
    saved_stdout: RawFd,
}

impl StdioGuard {
    fn new() -> Result<StdioGuard> {
        // Anything still buffered belongs to the shell's own stdout.
        io::stdout().flush()?;

        let saved_stdin = save_fd(libc::STDIN_FILENO)?;
        let saved_stdout = match save_fd(libc::STDOUT_FILENO) {
            Ok(fd) => fd,
            Err(e) => {
                let temp_result = unistd::close(saved_stdin);
                log_if_err!(temp_result, "close saved stdin");
                return Err(e);
            }
        };

        Ok(StdioGuard {
            saved_stdin,
            saved_stdout,
        })
    }
}

impl Drop for StdioGuard {
    fn drop(&mut self) {
        let temp_result = unistd::dup2(self.saved_stdin, libc::STDIN_FILENO);
        log_if_err!(temp_result, "failed to restore stdin");
        let temp_result = unistd::dup2(self.saved_stdout, libc::STDOUT_FILENO);
        log_if_err!(temp_result, "failed to restore stdout");

        let temp_result = unistd::close(self.saved_stdin);
        log_if_err!(temp_result, "close saved stdin");
        let temp_result = unistd::close(self.saved_stdout);
        log_if_err!(temp_result, "close saved stdout");
    }
}

/// Duplicates `fd` close-on-exec, so children never inherit the copy.
fn save_fd(fd: RawFd) -> Result<RawFd> {
    Ok(fcntl::fcntl(fd, FcntlArg::F_DUPFD_CLOEXEC(0))?)
}

/// Opens `path` and maps it onto `target`.
fn redirect(path: &str, flags: OFlag, mode: Mode, target: RawFd) -> Result<()> {
    let fd = fcntl::open(path, flags | OFlag::O_CLOEXEC, mode)
        .chain_err(|| ErrorKind::BadFile(path.to_string()))?;
    let result = unistd::dup2(fd, target);
    let temp_result = unistd::close(fd);
    log_if_err!(temp_result, "close {}", path);
    result.chain_err(|| ErrorKind::BadFile(path.to_string()))?;
    Ok(())
}

fn redirect_input(path: &str) -> Result<()> {
    redirect(path, OFlag::O_RDONLY, Mode::empty(), libc::STDIN_FILENO)
}

fn redirect_output(path: &str) -> Result<()> {
    let mode = Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IROTH;
    redirect(
        path,
        OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
        mode,
        libc::STDOUT_FILENO,
    )
}

/// Builds `[name, args...]` as C strings. Done before forking so the child only
/// has to exec.
fn build_argv(name: &str, args: &[String]) -> Result<Vec<CString>> {
    std::iter::once(name)
        .chain(args.iter().map(String::as_str))
        .map(|arg| {
            CString::new(arg)
                .chain_err(|| ErrorKind::InvalidArgument(arg.replace('\0', "\\0")))
        })
        .collect()
}

/// Launches `command` as an external program.
///
/// Redirections apply to the child only: the shell's stdin and stdout are saved
/// first and restored after the fork. A foreground command is waited for and its
/// status stored on the shell; a background command is registered in the job
/// table and announced on `stdout`.
pub fn launch(shell: &mut Shell, command: &Command, stdout: &mut dyn Write) -> Result<()> {
    let name = match command.name {
        Some(ref name) => name,
        None => return Ok(()),
    };

    if command.background && shell.job_table().is_full() {
        return Err(ErrorKind::TooManyJobs(shell.job_table().capacity()).into());
    }

    let argv = build_argv(name, &command.args)?;

    let child = {
        let _stdio = StdioGuard::new()?;
        if let Some(ref infile) = command.infile {
            redirect_input(infile)?;
        }
        if let Some(ref outfile) = command.outfile {
            redirect_output(outfile)?;
        }

        // The shell is single threaded, so the child may run arbitrary code
        // before exec.
        match unsafe { unistd::fork() } {
            Ok(ForkResult::Parent { child }) => child,
            Ok(ForkResult::Child) => exec_child(&argv),
            Err(e) => return Err(Error::with_chain(e, ErrorKind::Fork)),
        }
    };
    debug!("spawned {} for {:?}", child, argv);

    if command.background {
        run_in_background(shell, child, stdout)
    } else {
        let status = job_control::wait_for(child)?;
        debug!("foreground process {} finished: {:?}", child, status);
        shell.set_last_foreground_status(status);
        Ok(())
    }
}

fn run_in_background(shell: &mut Shell, child: Pid, stdout: &mut dyn Write) -> Result<()> {
    let index = shell.job_table_mut().register(child)?;
    writeln!(stdout, "background pid is {}", child)?;
    stdout.flush()?;

    match job_control::try_wait(child) {
        Ok(Some(status)) => shell.job_table_mut().mark_finished(index, status),
        Ok(None) => {}
        Err(e) => warn!("waitpid for {} failed: {}", child, e),
    }
    Ok(())
}

/// Replaces the child's image with `argv[0]`, searching `PATH`. Never returns.
fn exec_child(argv: &[CString]) -> ! {
    if let Err(e) = signals::reset_for_exec() {
        eprintln!("{}: {}", PROGRAM_NAME, e.to_report());
    }
    let err = match unistd::execvp(&argv[0], argv) {
        Ok(never) => match never {},
        Err(e) => e,
    };
    eprintln!(
        "{}: {}: {}",
        PROGRAM_NAME,
        argv[0].to_string_lossy(),
        err.desc()
    );
    // _exit skips atexit handlers and buffer flushes that belong to the parent.
    unsafe { libc::_exit(1) }
}
