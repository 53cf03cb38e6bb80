//! Running external decision procedures under a deadline.

use std::io::{Read, Write};
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::OracleError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Run `command` to completion, feeding it `stdin` and collecting its output.
///
/// The child is killed once `timeout` elapses, which yields
/// [`OracleError::Timeout`]. A command that cannot be spawned is reported as
/// [`OracleError::NotFound`]. A non-zero exit status is not an error here;
/// callers decide what it means.
pub fn run_with_timeout(
    mut command: Command,
    stdin: Option<&[u8]>,
    timeout: Option<Duration>,
) -> Result<Output, OracleError> {
    let program = command.get_program().to_string_lossy().into_owned();
    command
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!(%program, ?timeout, "spawning oracle");
    let started = Instant::now();
    let mut child = command
        .spawn()
        .map_err(|e| OracleError::NotFound(format!("{program}: {e}")))?;

    let writer = match (stdin, child.stdin.take()) {
        (Some(input), Some(mut pipe)) => {
            let input = input.to_vec();
            // Broken pipes are expected when the child exits early.
            Some(thread::spawn(move || {
                let _ = pipe.write_all(&input);
            }))
        }
        _ => None,
    };
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if let Some(budget) = timeout {
            if started.elapsed() >= budget {
                let _ = child.kill();
                let _ = child.wait();
                debug!(%program, "oracle killed after timeout");
                return Err(OracleError::timeout(budget));
            }
        }
        thread::sleep(POLL_INTERVAL);
    };

    if let Some(writer) = writer {
        let _ = writer.join();
    }
    let output = Output {
        status,
        stdout: collect(stdout)?,
        stderr: collect(stderr)?,
    };
    debug!(%program, %status, elapsed_ms = started.elapsed().as_millis() as u64, "oracle finished");
    Ok(output)
}

/// Time left before `deadline`, or a timeout error for `budget` once it has
/// passed. `None` means unbounded.
pub fn time_left(
    deadline: Option<Instant>,
    budget: Option<Duration>,
) -> Result<Option<Duration>, OracleError> {
    match deadline {
        None => Ok(None),
        Some(deadline) => {
            let now = Instant::now();
            if now >= deadline {
                Err(OracleError::timeout(budget.unwrap_or_default()))
            } else {
                Ok(Some(deadline - now))
            }
        }
    }
}

/// First lines of a stderr capture, for error messages.
pub(crate) fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    text.lines().take(3).collect::<Vec<_>>().join(" | ")
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<std::io::Result<Vec<u8>>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn collect(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> Result<Vec<u8>, OracleError> {
    match handle {
        None => Ok(Vec::new()),
        Some(handle) => handle
            .join()
            .map_err(|_| OracleError::Failure("output reader thread panicked".into()))?
            .map_err(OracleError::Io),
    }
}
