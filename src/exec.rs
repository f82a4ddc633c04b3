//! External process execution with timeout and output bounds
//!
//! Every bridge call goes through a [`CommandRunner`]. The system implementation runs the
//! command line through the platform shell, so quoting is the caller's job. There are no
//! retries here; callers that need a retry policy implement it themselves.

use crate::config::{DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_MAX_OUTPUT_BYTES, DeviceConfig};
use crate::error::{MobileError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// Bounds applied to a single command invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOptions {
    pub timeout: Duration,
    pub max_output_bytes: usize,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

impl ExecOptions {
    /// Options for short capture and diagnostic calls
    pub fn command(config: &DeviceConfig) -> Self {
        Self {
            timeout: config.command_timeout_duration(),
            max_output_bytes: config.max_output_bytes,
        }
    }

    /// Options for bulk transfers such as screenshots
    pub fn transfer(config: &DeviceConfig) -> Self {
        Self {
            timeout: config.transfer_timeout_duration(),
            max_output_bytes: config.max_output_bytes,
        }
    }

    /// Builder method: set the timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Runs fully formed command lines and returns their standard output
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command and return its raw standard output
    async fn run_bytes(&self, command: &str, options: ExecOptions) -> Result<Vec<u8>>;

    /// Run a command and return its standard output as text
    async fn run_text(&self, command: &str, options: ExecOptions) -> Result<String> {
        let bytes = self.run_bytes(command, options).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// [`CommandRunner`] that spawns real processes through the platform shell
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

async fn read_capped<R: AsyncRead + Unpin>(stream: Option<R>, cap: u64) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(stream) = stream {
        let mut limited = stream.take(cap);
        limited.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run_bytes(&self, command: &str, options: ExecOptions) -> Result<Vec<u8>> {
        log::debug!("exec: {}", command);

        let execution_error = |stderr: String| MobileError::Execution {
            command: command.to_string(),
            stderr,
        };

        let mut child = shell_command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| execution_error(e.to_string()))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        // one byte over the limit is enough to detect overflow
        let cap = options.max_output_bytes as u64 + 1;

        let work = async {
            let (out, err) = tokio::try_join!(read_capped(stdout, cap), read_capped(stderr, cap))?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, out, err))
        };
        let outcome = tokio::time::timeout(options.timeout, work).await;

        let (status, out, err) = match outcome {
            Ok(Ok(collected)) => collected,
            Ok(Err(e)) => return Err(execution_error(e.to_string())),
            Err(_) => {
                let _ = child.start_kill();
                return Err(MobileError::Timeout {
                    command: command.to_string(),
                    timeout_ms: options.timeout.as_millis() as u64,
                });
            }
        };

        if out.len() > options.max_output_bytes {
            return Err(execution_error(format!(
                "output exceeded {} bytes",
                options.max_output_bytes
            )));
        }

        if !status.success() {
            let stderr = String::from_utf8_lossy(&err).trim().to_string();
            let stderr = if stderr.is_empty() {
                format!("exited with {}", status)
            } else {
                stderr
            };
            return Err(execution_error(stderr));
        }

        Ok(out)
    }
}

/// Quote a single argument for a POSIX shell command line
pub fn shell_quote(arg: &str) -> String {
    if !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c))
    {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Canned [`CommandRunner`] for adapter tests
#[cfg(test)]
pub(crate) mod scripted {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Rule {
        pattern: String,
        replies: VecDeque<std::result::Result<Vec<u8>, String>>,
    }

    /// Replies to commands containing a registered pattern; the last reply of a rule repeats
    #[derive(Default)]
    pub struct ScriptedRunner {
        rules: Mutex<Vec<Rule>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn ok(self, pattern: &str, stdout: impl Into<Vec<u8>>) -> Self {
            self.push(pattern, Ok(stdout.into()))
        }

        pub fn fail(self, pattern: &str, stderr: &str) -> Self {
            self.push(pattern, Err(stderr.to_string()))
        }

        fn push(self, pattern: &str, reply: std::result::Result<Vec<u8>, String>) -> Self {
            {
                let mut rules = self.rules.lock().unwrap();
                match rules.iter_mut().find(|r| r.pattern == pattern) {
                    Some(rule) => rule.replies.push_back(reply),
                    None => rules.push(Rule {
                        pattern: pattern.to_string(),
                        replies: VecDeque::from([reply]),
                    }),
                }
            }
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn count(&self, pattern: &str) -> usize {
            self.calls().iter().filter(|c| c.contains(pattern)).count()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run_bytes(&self, command: &str, _options: ExecOptions) -> Result<Vec<u8>> {
            self.calls.lock().unwrap().push(command.to_string());
            let mut rules = self.rules.lock().unwrap();
            let rule = rules
                .iter_mut()
                .find(|r| command.contains(&r.pattern))
                .ok_or_else(|| MobileError::Execution {
                    command: command.to_string(),
                    stderr: "sh: command not found".to_string(),
                })?;
            let reply = if rule.replies.len() > 1 {
                rule.replies.pop_front()
            } else {
                rule.replies.front().cloned()
            };
            match reply {
                Some(Ok(bytes)) => Ok(bytes),
                Some(Err(stderr)) => Err(MobileError::Execution {
                    command: command.to_string(),
                    stderr,
                }),
                None => Ok(Vec::new()),
            }
        }
    }
}
