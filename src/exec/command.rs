// src/exec/command.rs

//! External process runner shared by the git, compose and sendmail clients.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Short human description of why the command failed.
    ///
    /// Prefers the last non-empty stderr line, which for git and compose is
    /// almost always the actual error.
    pub fn failure_message(&self) -> String {
        let last_line = self
            .stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty());

        match (last_line, self.code) {
            (Some(line), Some(code)) => format!("{line} (exit code {code})"),
            (Some(line), None) => format!("{line} (terminated by signal)"),
            (None, Some(code)) => format!("exit code {code}"),
            (None, None) => "terminated by signal".to_string(),
        }
    }
}

/// Run `program args...` to completion.
///
/// - `cwd`: working directory, if any.
/// - `stdin`: bytes written to the child's stdin before it is closed.
///
/// A non-zero exit is *not* an error here; callers inspect
/// [`CommandOutput::success`]. Errors are reserved for spawn/IO failures.
/// The child is killed if this future is dropped.
pub async fn run_command<S: AsRef<OsStr>>(
    program: impl AsRef<OsStr>,
    args: &[S],
    cwd: Option<&Path>,
    stdin: Option<&[u8]>,
) -> Result<CommandOutput> {
    let program = program.as_ref();
    let cmdline = render(program, args);

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    info!(cmd = %cmdline, "starting process");

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning `{cmdline}`"))?;

    if let (Some(bytes), Some(mut pipe)) = (stdin, child.stdin.take()) {
        // A child that exits without reading stdin is reported through its
        // exit status below, not as a write error.
        match pipe.write_all(bytes).await {
            Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                return Err(e).with_context(|| format!("writing stdin of `{cmdline}`"));
            }
            _ => {}
        }
        // Dropping the pipe closes it so the child sees EOF.
        drop(pipe);
    }

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("waiting for `{cmdline}`"))?;

    let result = CommandOutput {
        code: output.status.code(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    for line in result.stderr.lines() {
        debug!(cmd = %cmdline, "stderr: {}", line);
    }

    info!(
        cmd = %cmdline,
        exit_code = result.code.unwrap_or(-1),
        success = result.success,
        "process exited"
    );

    Ok(result)
}

fn render<S: AsRef<OsStr>>(program: &OsStr, args: &[S]) -> String {
    let mut s = program.to_string_lossy().into_owned();
    for a in args {
        s.push(' ');
        s.push_str(&a.as_ref().to_string_lossy());
    }
    s
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let out = run_command("sh", &["-c", "echo hello; exit 3"], None, None)
            .await
            .unwrap();
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.code, Some(3));
        assert!(!out.success);
    }

    #[tokio::test]
    async fn feeds_stdin() {
        let out = run_command("cat", &[] as &[&str], None, Some(b"piped".as_slice()))
            .await
            .unwrap();
        assert!(out.success);
        assert_eq!(out.stdout, "piped");
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let res = run_command("definitely-not-a-real-binary-xyz", &["x"], None, None).await;
        assert!(res.is_err());
    }

    #[test]
    fn failure_message_prefers_last_stderr_line() {
        let out = CommandOutput {
            code: Some(128),
            success: false,
            stdout: String::new(),
            stderr: "warning: something\nfatal: couldn't find remote ref main\n\n".to_string(),
        };
        assert_eq!(
            out.failure_message(),
            "fatal: couldn't find remote ref main (exit code 128)"
        );
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn logs_rendered_command_line() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        run_command("sh", &["-c", "exit 0"], None, None).await.unwrap();

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("starting process cmd=sh -c exit 0"), "{logs}");
        assert!(logs.contains("process exited cmd=sh -c exit 0"), "{logs}");
    }
}
