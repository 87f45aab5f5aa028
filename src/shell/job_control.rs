//! Bookkeeping for background jobs.
//!
//! The `JobTable` holds a fixed number of slots. A launch takes the first free
//! slot; a finished job is reported once by `poll` and its slot is freed.

use std::fmt;
use std::io::Write;
use std::process::ExitStatus;

use log::{debug, warn};
use nix::errno::Errno;
use nix::sys::wait::{self, WaitPidFlag};
use nix::unistd::Pid;

use crate::errors::{ErrorKind, Result};
use crate::util::{self, ShExitStatusExt};

/// A process started in the background.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackgroundJob {
    pid: Pid,
    /// Set when the process was reaped before the next poll.
    finished: Option<ExitStatus>,
}

impl BackgroundJob {
    pub fn pid(&self) -> Pid {
        self.pid
    }
}

pub struct JobTable {
    slots: Vec<Option<BackgroundJob>>,
}

impl JobTable {
    pub fn with_capacity(capacity: usize) -> JobTable {
        JobTable {
            slots: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Process ids of the tracked jobs, in slot order.
    pub fn pids(&self) -> Vec<Pid> {
        self.slots.iter().flatten().map(BackgroundJob::pid).collect()
    }

    /// Puts `pid` in the first free slot and returns the slot index.
    pub fn register(&mut self, pid: Pid) -> Result<usize> {
        let capacity = self.capacity();
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or_else(|| ErrorKind::TooManyJobs(capacity))?;
        self.slots[index] = Some(BackgroundJob {
            pid,
            finished: None,
        });
        debug!("background job {} registered in slot {}", pid, index);
        Ok(index)
    }

    /// Records a status obtained outside of `poll`; it is reported on the next poll.
    pub fn mark_finished(&mut self, index: usize, status: ExitStatus) {
        if let Some(Some(job)) = self.slots.get_mut(index) {
            job.finished = Some(status);
        }
    }

    /// Reports finished jobs to `out` and frees their slots, using a
    /// non-blocking `waitpid`.
    ///
    /// Returns the status of the last job reported, if any.
    pub fn poll(&mut self, out: &mut dyn Write) -> Result<Option<ExitStatus>> {
        self.poll_with(out, try_wait)
    }

    /// Like `poll`, with `try_wait` deciding whether a process has finished.
    ///
    /// A job whose notice cannot be written keeps its slot and status, so it is
    /// reported again on the next poll. The first write error is returned after
    /// every slot has been checked.
    pub fn poll_with<F>(&mut self, out: &mut dyn Write, mut try_wait: F) -> Result<Option<ExitStatus>>
    where
        F: FnMut(Pid) -> Result<Option<ExitStatus>>,
    {
        let mut last_status = None;
        let mut first_error = None;
        for slot in self.slots.iter_mut() {
            let job = match *slot {
                Some(job) => job,
                None => continue,
            };

            let status = match job.finished {
                Some(status) => status,
                None => match try_wait(job.pid) {
                    Ok(Some(status)) => status,
                    Ok(None) => continue,
                    Err(e) => {
                        warn!("dropping background job {}: {}", job.pid, e);
                        *slot = None;
                        continue;
                    }
                },
            };

            debug!("background job {} finished: {:?}", job.pid, status);
            let notice = writeln!(
                out,
                "background pid {} is done: {}",
                job.pid,
                status.describe()
            )
            .and_then(|_| out.flush());
            match notice {
                Ok(()) => {
                    *slot = None;
                    last_status = Some(status);
                }
                Err(e) => {
                    *slot = Some(BackgroundJob {
                        finished: Some(status),
                        ..job
                    });
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(last_status),
        }
    }
}

impl fmt::Debug for JobTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} of {} job slots used", self.len(), self.capacity())?;
        for (index, job) in self.slots.iter().enumerate() {
            if let Some(job) = job {
                writeln!(f, "[{}] pid: {}", index, job.pid)?;
            }
        }
        Ok(())
    }
}

/// Non-blocking wait for `pid`. Returns `None` while the process is still running.
pub fn try_wait(pid: Pid) -> Result<Option<ExitStatus>> {
    match wait::waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
        Ok(wait_status) => Ok(util::exit_status_from_wait(wait_status)),
        Err(Errno::EINTR) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Blocks until `pid` terminates.
pub fn wait_for(pid: Pid) -> Result<ExitStatus> {
    loop {
        match wait::waitpid(pid, None) {
            Ok(wait_status) => match util::exit_status_from_wait(wait_status) {
                Some(status) => return Ok(status),
                None => debug!("ignoring wait status {:?} for {}", wait_status, pid),
            },
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e.into()),
        }
    }
}
