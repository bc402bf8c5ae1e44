use anyhow::Result;
use std::process::{Command, Output};

/// Trait for executing system commands, allowing for mocking in tests
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with arguments and capture its output
    fn execute(&self, command: &str, args: &[&str]) -> Result<Output>;
}

/// Real command executor using std::process::Command
pub struct RealCommandExecutor;

impl RealCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> Result<Output> {
        let output = Command::new(command).args(args).output()?;

        Ok(output)
    }
}

/// Mock command executor for testing
#[cfg(test)]
pub struct MockCommandExecutor {
    /// Pre-configured outputs for commands
    outputs: std::sync::Mutex<Vec<MockCommandResult>>,
    /// Every invocation as "command arg arg ..."
    invocations: std::sync::Mutex<Vec<String>>,
}

/// Canned result, matched when the invocation line starts with `command`
#[cfg(test)]
#[derive(Clone, Debug)]
pub struct MockCommandResult {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[cfg(test)]
impl MockCommandExecutor {
    pub fn new() -> Self {
        Self {
            outputs: std::sync::Mutex::new(Vec::new()),
            invocations: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_outputs(outputs: Vec<MockCommandResult>) -> Self {
        Self {
            outputs: std::sync::Mutex::new(outputs),
            invocations: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Recorded invocation lines, oldest first
    pub fn invocations(&self) -> Vec<String> {
        self.invocations.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Default for MockCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl CommandExecutor for MockCommandExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> Result<Output> {
        let line = std::iter::once(command)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.invocations.lock().unwrap().push(line.clone());

        let mut outputs = self.outputs.lock().unwrap();

        if let Some(result) = outputs.iter().position(|r| line.starts_with(&r.command)) {
            let mock_result = outputs.remove(result);
            return Ok(Output {
                status: create_exit_status(mock_result.exit_code),
                stdout: mock_result.stdout.into_bytes(),
                stderr: mock_result.stderr.into_bytes(),
            });
        }

        // Default: successful empty output
        Ok(Output {
            status: create_exit_status(0),
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    }
}

#[cfg(test)]
fn create_exit_status(code: i32) -> std::process::ExitStatus {
    // ExitStatus can't be constructed directly; build it from a raw wait status
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code << 8)
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code as u32)
    }
}
