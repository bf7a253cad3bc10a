// file: src/executor.rs
// version: 1.0.0
// guid: 0100010e-250f-4d64-85b4-024d7699cbce

//! Shell execution for assembled command lines

use crate::config::AppConfig;
use crate::error::{Result, WrapperError};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Captured result of one shell invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOutput {
    /// `None` when the process was killed by a signal or never spawned
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// False in dry-run mode
    pub executed: bool,
    pub duration: Duration,
}

impl ShellOutput {
    /// Output of a command that was only logged
    pub fn skipped() -> Self {
        Self {
            exit_code: Some(0),
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stdout followed by stderr, the text bowtie2 errors are searched in
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) if self.stdout.ends_with('\n') => {
                format!("{}{}", self.stdout, self.stderr)
            }
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }
}

/// Something that can run a shell command line
#[async_trait::async_trait]
pub trait ShellExecutor: Send + Sync {
    /// Run the command line to completion and capture its output
    async fn run(&self, command_line: &str) -> Result<ShellOutput>;
}

/// Runs command lines through a local shell
#[derive(Debug, Clone)]
pub struct LocalShell {
    shell: String,
    pipefail: bool,
    working_directory: Option<PathBuf>,
    timeout: Option<Duration>,
    dry_run: bool,
}

impl LocalShell {
    /// Create a shell executor with pipefail enabled
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            pipefail: true,
            working_directory: None,
            timeout: None,
            dry_run: false,
        }
    }

    /// Build an executor from the application configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            shell: config.tools.shell.clone(),
            pipefail: config.tools.pipefail,
            working_directory: config.general.working_directory.clone(),
            timeout: config.general.timeout_seconds.map(Duration::from_secs),
            dry_run: config.safety.dry_run,
        }
    }

    pub fn with_pipefail(mut self, pipefail: bool) -> Self {
        self.pipefail = pipefail;
        self
    }

    pub fn with_working_directory(mut self, dir: Option<PathBuf>) -> Self {
        self.working_directory = dir;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    fn build_command(&self, command_line: &str) -> Command {
        let mut cmd = Command::new(&self.shell);
        if self.pipefail {
            cmd.args(["-o", "pipefail"]);
        }
        cmd.arg("-c")
            .arg(command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group so a timeout can take down every member of a pipeline
        #[cfg(unix)]
        cmd.process_group(0);

        if let Some(ref wd) = self.working_directory {
            cmd.current_dir(wd);
        }
        cmd
    }
}

impl Default for LocalShell {
    fn default() -> Self {
        Self::new("bash")
    }
}

#[async_trait::async_trait]
impl ShellExecutor for LocalShell {
    async fn run(&self, command_line: &str) -> Result<ShellOutput> {
        if self.dry_run {
            info!("DRY RUN: Would execute: {}", command_line);
            return Ok(ShellOutput::skipped());
        }

        debug!("Executing via {}: {}", self.shell, command_line);
        let started = Instant::now();
        let spawn_error = |e: std::io::Error| WrapperError::Process {
            command: command_line.to_string(),
            exit_code: None,
            stderr: format!("Failed to execute {}: {}", self.shell, e),
        };

        let mut child = self.build_command(command_line).spawn().map_err(spawn_error)?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let collected = async {
            tokio::try_join!(child.wait(), read_stream(stdout), read_stream(stderr))
        };

        let collected = match self.timeout {
            Some(limit) => {
                let waited = tokio::time::timeout(limit, collected).await;
                match waited {
                    Ok(collected) => collected,
                    Err(_) => {
                        warn!("Command exceeded {:?}, killing it", limit);
                        terminate(&mut child).await;
                        return Err(WrapperError::timeout(format!(
                            "Command timed out after {:?}: {}",
                            limit, command_line
                        )));
                    }
                }
            }
            None => collected.await,
        };
        let (status, stdout, stderr) = collected.map_err(spawn_error)?;

        let result = ShellOutput {
            exit_code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            executed: true,
            duration: started.elapsed(),
        };

        debug!(
            "Command finished with exit code {:?} in {:?}",
            result.exit_code, result.duration
        );
        Ok(result)
    }
}

async fn read_stream<R: AsyncRead + Unpin>(stream: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Kill the shell's process group, then reap the shell
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // SAFETY: killpg only sends a signal; the group id is the shell's pid
        if unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) } != 0 {
            warn!(
                "Failed to kill process group {}: {}",
                pid,
                std::io::Error::last_os_error()
            );
        }
    }

    if let Err(e) = child.kill().await {
        debug!("Shell already gone: {}", e);
    }
}
