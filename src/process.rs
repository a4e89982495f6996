//! # External Command Execution
//!
//! Thin wrapper around `std::process::Command` used for every git, hg and
//! pipenv invocation. All commands run under a wall-clock deadline so a hung
//! remote cannot stall a vendoring run forever.
//!
//! Two flavors exist:
//!
//! - [`run_capture`] pipes stdout/stderr, draining both while the child
//!   runs, and returns the trimmed stdout. Used for inspection commands
//!   (`git describe`, `hg log`, ...) and for slurping dependency listings
//!   of any size.
//! - [`run_streamed`] inherits the parent's stdio so long-running commands
//!   like clones show their progress directly on the user's terminal.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Poll interval while waiting for a child process to exit.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Run a command with piped output, returning its trimmed stdout.
///
/// The command runs in `cwd`. Both pipes are drained concurrently with the
/// wait, so output larger than the OS pipe buffer cannot stall the child.
/// A non-zero exit status becomes [`Error::ProcessFailed`] carrying the
/// captured stderr; exceeding `timeout` kills the child and yields
/// [`Error::ProcessTimeout`].
pub fn run_capture(
    program: &str,
    args: &[&str],
    cwd: &Path,
    timeout: Duration,
) -> Result<String> {
    let display = render_command(program, args);

    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::ProcessFailed {
            command: display.clone(),
            stderr: e.to_string(),
        })?;

    // The readers must run while we wait: a child that fills an undrained
    // pipe blocks in write() and never exits.
    let stdout_reader = spawn_pipe_reader(child.stdout.take());
    let stderr_reader = spawn_pipe_reader(child.stderr.take());

    let status = wait_with_deadline(&mut child, &display, timeout);

    // The child has exited or been killed on both paths, so the pipes are
    // at EOF and the joins cannot block.
    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();

    let status = status?;

    if !status.success() {
        return Err(Error::ProcessFailed {
            command: display,
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(stdout.trim().to_string())
}

/// Run a command with inherited stdio, so its output streams to the user.
///
/// `envs` are additional environment variables set for the child. A
/// non-zero exit status becomes [`Error::ProcessFailed`]; the stderr text has
/// already gone to the terminal, so the error only carries the exit status.
pub fn run_streamed(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    envs: &[(&str, &str)],
    timeout: Duration,
) -> Result<()> {
    let display = render_command(program, args);

    let mut command = Command::new(program);
    command.args(args).stdin(Stdio::null());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    for (key, value) in envs {
        command.env(key, value);
    }

    let mut child = command.spawn().map_err(|e| Error::ProcessFailed {
        command: display.clone(),
        stderr: e.to_string(),
    })?;

    let status = wait_with_deadline(&mut child, &display, timeout)?;

    if !status.success() {
        return Err(Error::ProcessFailed {
            command: display,
            stderr: format!("exited with {}", status),
        });
    }

    Ok(())
}

/// Convert a path to its UTF-8 form for use as a command argument.
pub fn path_arg(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| Error::Path {
        message: format!("path is not valid UTF-8: {}", path.display()),
    })
}

/// Wait for `child` to exit, killing it once `timeout` elapses.
fn wait_with_deadline(child: &mut Child, display: &str, timeout: Duration) -> Result<ExitStatus> {
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }

        if Instant::now() >= deadline {
            // The child may win the race and exit first; reap it either way.
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::ProcessTimeout {
                command: display.to_string(),
                seconds: timeout.as_secs(),
            });
        }

        thread::sleep(WAIT_POLL_INTERVAL);
    }
}

fn spawn_pipe_reader<R>(pipe: Option<R>) -> thread::JoinHandle<String>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buffer = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buffer);
        }
        buffer
    })
}

fn render_command(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn cwd() -> PathBuf {
        std::env::temp_dir()
    }

    #[test]
    fn test_run_capture_returns_trimmed_stdout() {
        let output = run_capture("sh", &["-c", "echo hello"], &cwd(), Duration::from_secs(10))
            .expect("echo should succeed");
        assert_eq!(output, "hello");
    }

    #[test]
    fn test_run_capture_failure_carries_stderr() {
        let result = run_capture(
            "sh",
            &["-c", "echo oops >&2; exit 3"],
            &cwd(),
            Duration::from_secs(10),
        );
        match result {
            Err(Error::ProcessFailed { command, stderr }) => {
                assert!(command.starts_with("sh"));
                assert!(stderr.contains("oops"));
            }
            other => panic!("expected ProcessFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_run_capture_drains_stdout_larger_than_pipe_buffer() {
        // 200 kB is well past the 64 KiB a Linux pipe holds; the command
        // itself finishes in milliseconds.
        let output = run_capture(
            "sh",
            &["-c", "head -c 200000 /dev/zero | tr '\\0' x"],
            &cwd(),
            Duration::from_secs(10),
        )
        .expect("large output should succeed");
        assert_eq!(output.len(), 200_000);
        assert!(output.bytes().all(|b| b == b'x'));
    }

    #[test]
    fn test_run_capture_drains_stderr_larger_than_pipe_buffer() {
        let result = run_capture(
            "sh",
            &["-c", "head -c 200000 /dev/zero | tr '\\0' e >&2; exit 3"],
            &cwd(),
            Duration::from_secs(10),
        );
        match result {
            Err(Error::ProcessFailed { stderr, .. }) => {
                assert_eq!(stderr.len(), 200_000);
            }
            other => panic!("expected ProcessFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_run_capture_times_out() {
        let result = run_capture(
            "sh",
            &["-c", "sleep 5"],
            &cwd(),
            Duration::from_millis(100),
        );
        assert!(matches!(result, Err(Error::ProcessTimeout { .. })));
    }

    #[test]
    fn test_run_capture_missing_program() {
        let result = run_capture(
            "definitely-not-a-real-program",
            &[],
            &cwd(),
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(Error::ProcessFailed { .. })));
    }

    #[test]
    fn test_run_streamed_success() {
        let result = run_streamed("sh", &["-c", "true"], None, &[], Duration::from_secs(10));
        assert!(result.is_ok());
    }

    #[test]
    fn test_run_streamed_failure_reports_status() {
        let result = run_streamed("sh", &["-c", "exit 7"], None, &[], Duration::from_secs(10));
        match result {
            Err(Error::ProcessFailed { stderr, .. }) => {
                assert!(stderr.contains("exited with"));
            }
            other => panic!("expected ProcessFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_run_streamed_sets_environment() {
        let result = run_streamed(
            "sh",
            &["-c", "test \"$PIPSOURCE_TEST_VAR\" = on"],
            None,
            &[("PIPSOURCE_TEST_VAR", "on")],
            Duration::from_secs(10),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_path_arg_accepts_utf8() {
        let path = PathBuf::from("/tmp/vendored/requests");
        assert_eq!(path_arg(&path).unwrap(), "/tmp/vendored/requests");
    }
}
