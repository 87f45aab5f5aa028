use std::path::{Path, PathBuf};
use std::process;

use docopt::Docopt;
use log::{debug, error, info, LevelFilter};
use nix::unistd::Pid;
use serde_derive::Deserialize;

use smallsh::errors::{Error, Result, ResultExt};
use smallsh::shell::{signals, DEFAULT_JOB_CAPACITY, PROGRAM_NAME};
use smallsh::{Shell, ShellConfig};

const LOG_FILE_NAME: &str = ".smallsh_log";

const USAGE: &str = "
smallsh.

Usage:
    smallsh [options]
    smallsh [options] <file>
    smallsh (-h | --help)
    smallsh --version

Options:
    -h --help            Show this screen.
    --version            Show version.
    --jobs=<n>           Maximum number of background jobs running at once [default: 5].
    --log=<path>         File to write log to, defaults to ~/.smallsh_log
    --log-level=<level>  One of off, error, warn, info, debug or trace [default: info].
";

/// Docopts input arguments.
#[derive(Debug, Deserialize)]
struct Args {
    arg_file: Option<String>,
    flag_version: bool,
    flag_jobs: Option<usize>,
    flag_log: Option<String>,
    flag_log_level: String,
}

fn main() {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    if args.flag_version {
        println!("{} version {}", PROGRAM_NAME, env!("CARGO_PKG_VERSION"));
        return;
    }

    if let Err(e) = init_logger(&args) {
        eprintln!("{}: logging disabled: {}", PROGRAM_NAME, e.to_report());
    }
    debug!("{:?}", args);

    if let Err(e) = run(&args) {
        display_error_and_exit(&e);
    }
    info!("{} has shut down", PROGRAM_NAME);
}

fn run(args: &Args) -> Result<()> {
    signals::install().chain_err(|| "failed to install signal handlers")?;

    let job_capacity = args.flag_jobs.unwrap_or(DEFAULT_JOB_CAPACITY);
    match args.arg_file {
        Some(ref path) => {
            let mut shell = Shell::new(ShellConfig::noninteractive(job_capacity));
            shell.execute_commands_from_file(Path::new(path))
        }
        None => {
            let mut shell = Shell::new(ShellConfig::interactive(job_capacity));
            info!("{} started up", PROGRAM_NAME);
            shell.execute_from_stdin()
        }
    }
}

fn init_logger(args: &Args) -> Result<()> {
    let level = args
        .flag_log_level
        .parse::<LevelFilter>()
        .map_err(|_| Error::from(format!("invalid log level '{}'", args.flag_log_level)))?;
    if level == LevelFilter::Off {
        return Ok(());
    }

    let log_path = match args.flag_log {
        Some(ref path) => PathBuf::from(path),
        None => default_log_path()?,
    };

    let pid = Pid::this();
    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                pid,
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(fern::log_file(&log_path).chain_err(|| format!("{}", log_path.display()))?)
        .apply()?;
    Ok(())
}

fn default_log_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(LOG_FILE_NAME))
        .ok_or_else(|| "unable to determine home directory".into())
}

fn display_error_and_exit(error: &Error) -> ! {
    error!("{}", error.to_report());
    eprintln!("{}: {}", PROGRAM_NAME, error.to_report());
    process::exit(1);
}
