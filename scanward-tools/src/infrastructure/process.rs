//! Shared subprocess runner for scanner binaries

use std::io::ErrorKind;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::traits::ToolError;

/// Longest stderr excerpt carried in an error.
const STDERR_EXCERPT_LIMIT: usize = 2048;

/// One fully resolved tool invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub executable: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl Invocation {
    pub fn new(executable: impl Into<String>, timeout: Duration) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run to completion with stdout and stderr captured.
    ///
    /// On unix the tool leads its own process group. If the timeout elapses the
    /// whole group is killed, so helpers the tool forked go down with it.
    pub async fn output(&self, working_dir: Option<&Path>) -> Result<Output, ToolError> {
        let mut cmd = Command::new(&self.executable);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        debug!(executable = %self.executable, args = ?self.args, "Spawning tool");

        let child = cmd.spawn().map_err(|e| self.spawn_error(e))?;
        let pid = child.id();

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| ToolError::Spawn {
                executable: self.executable.clone(),
                message: e.to_string(),
            }),
            Err(_) => {
                warn!(
                    executable = %self.executable,
                    timeout_secs = self.timeout.as_secs(),
                    "Tool timed out, killing process group"
                );
                kill_process_group(pid);
                Err(ToolError::Timeout(self.timeout.as_secs()))
            }
        }
    }

    /// `<executable> --version`, first non-empty line of stdout.
    pub async fn version(&self) -> Result<String, ToolError> {
        let probe = Invocation::new(self.executable.clone(), self.timeout).arg("--version");
        let output = probe.output(None).await?;
        if !output.status.success() {
            return Err(failure(&output));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string())
    }

    fn spawn_error(&self, error: std::io::Error) -> ToolError {
        if error.kind() == ErrorKind::NotFound {
            ToolError::NotInstalled {
                executable: self.executable.clone(),
            }
        } else {
            ToolError::Spawn {
                executable: self.executable.clone(),
                message: error.to_string(),
            }
        }
    }
}

/// SIGKILL every process in the group led by `pid`.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Some(pgid) = pid.and_then(|pid| i32::try_from(pid).ok()) else {
        return;
    };
    match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        // ESRCH: the group is already gone
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(err) => warn!(pgid, error = %err, "Failed to kill tool process group"),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

/// Parse stdout as the tool's JSON report.
///
/// A non-zero exit is tolerated when stdout still parses; otherwise the exit
/// status and stderr excerpt are reported.
pub fn interpret<T, F>(output: &Output, parse: F) -> Result<T, ToolError>
where
    F: FnOnce(&str) -> Result<T, ToolError>,
{
    let stdout = String::from_utf8_lossy(&output.stdout);
    if output.status.success() {
        return parse(&stdout);
    }
    if !stdout.trim().is_empty()
        && let Ok(parsed) = parse(&stdout)
    {
        debug!(status = %output.status, "Tool exited non-zero with a parseable report");
        return Ok(parsed);
    }
    Err(failure(output))
}

fn failure(output: &Output) -> ToolError {
    ToolError::ExecutionFailed {
        status: output.status.to_string(),
        stderr: truncate(String::from_utf8_lossy(&output.stderr).trim()),
    }
}

/// Cut to the excerpt limit on a char boundary.
pub fn truncate(text: &str) -> String {
    if text.len() <= STDERR_EXCERPT_LIMIT {
        return text.to_string();
    }
    let mut end = STDERR_EXCERPT_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Express a path reported by a tool relative to the scanned root.
pub fn relative_to(root: &Path, reported: &str) -> String {
    let reported_path = Path::new(reported);
    match reported_path.strip_prefix(root) {
        Ok(rel) => rel.to_string_lossy().into_owned(),
        Err(_) => reported.to_string(),
    }
}
