//! External process helpers with deadlines
//!
//! Commands are always built as argument vectors and never passed through a
//! shell. Both helpers kill the child once the deadline passes.

use crate::error::ArchiverError;
use std::io::{self, BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<ProcessError> for ArchiverError {
    fn from(e: ProcessError) -> Self {
        ArchiverError::process(e.to_string())
    }
}

fn spawn(cmd: &mut Command) -> Result<Child, ProcessError> {
    cmd.spawn().map_err(|source| ProcessError::Spawn {
        program: cmd.get_program().to_string_lossy().to_string(),
        source,
    })
}

/// Wait for `child` until `deadline`, killing it on expiry
fn wait_until(child: &mut Child, deadline: Instant, timeout: Duration) -> Result<ExitStatus, ProcessError> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            log::warn!("Process {} exceeded {:?}, killing it", child.id(), timeout);
            let _ = child.kill();
            let _ = child.wait();
            return Err(ProcessError::TimedOut(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Run a command to completion, inheriting stdio, within `timeout`
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<ExitStatus, ProcessError> {
    log::debug!("Running {:?}", cmd);
    let mut child = spawn(cmd.stdin(Stdio::null()))?;
    wait_until(&mut child, Instant::now() + timeout, timeout)
}

/// Line-by-line reader over a child's stdout, bounded by a single deadline
///
/// The consumer may stop early; dropping the stream kills the child.
pub struct LineStream {
    child: Child,
    lines: Receiver<io::Result<String>>,
    stderr: Option<JoinHandle<String>>,
    timeout: Duration,
    deadline: Instant,
    ended: bool,
    reaped: bool,
}

impl LineStream {
    pub fn spawn(cmd: &mut Command, timeout: Duration) -> Result<Self, ProcessError> {
        log::debug!("Streaming {:?}", cmd);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = spawn(cmd)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("child stdout was not captured"))?;
        let (tx, lines) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        let stderr = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = pipe.read_to_string(&mut buf);
                buf
            })
        });

        Ok(Self {
            child,
            lines,
            stderr,
            timeout,
            deadline: Instant::now() + timeout,
            ended: false,
            reaped: false,
        })
    }

    /// Next stdout line, or `None` once the stream has closed
    pub fn next_line(&mut self) -> Result<Option<String>, ProcessError> {
        if self.ended {
            return Ok(None);
        }
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        match self.lines.recv_timeout(remaining) {
            Ok(Ok(line)) => Ok(Some(line)),
            Ok(Err(e)) => Err(e.into()),
            Err(RecvTimeoutError::Disconnected) => {
                self.ended = true;
                Ok(None)
            }
            Err(RecvTimeoutError::Timeout) => {
                self.kill();
                Err(ProcessError::TimedOut(self.timeout))
            }
        }
    }

    /// Wait for the child to exit and collect its stderr
    pub fn finish(&mut self) -> Result<(ExitStatus, String), ProcessError> {
        let status = wait_until(&mut self.child, self.deadline, self.timeout);
        self.reaped = true;
        let stderr = self
            .stderr
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        Ok((status?, stderr))
    }

    /// Stop reading and terminate the child
    pub fn kill(&mut self) {
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
            self.reaped = true;
        }
        self.ended = true;
    }
}

impl Drop for LineStream {
    fn drop(&mut self) {
        self.kill();
    }
}
