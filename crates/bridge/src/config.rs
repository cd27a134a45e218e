use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

/// How to launch the prediction engine.
///
/// The command line is `executable [interpreter_args..] script operation`, so a
/// single engine executable can dispatch several operations.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Program to spawn (e.g. `python3`).
    pub executable: PathBuf,
    /// Arguments placed before the script (e.g. `-u` for unbuffered output).
    pub interpreter_args: Vec<String>,
    /// Script path or identifier handed to the executable.
    pub script: String,
    /// Deadline applied when a call does not pass its own.
    pub default_timeout: Duration,
    pub working_dir: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("python3"),
            interpreter_args: Vec::new(),
            script: "python/modelService.py".to_string(),
            default_timeout: Duration::from_secs(30),
            working_dir: None,
            env: Vec::new(),
        }
    }
}

impl BridgeConfig {
    pub fn new(executable: impl Into<PathBuf>, script: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            script: script.into(),
            ..Self::default()
        }
    }

    pub fn with_interpreter_arg(mut self, arg: impl Into<String>) -> Self {
        self.interpreter_args.push(arg.into());
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Human-readable program name for logs and errors.
    pub fn program(&self) -> String {
        self.executable.display().to_string()
    }

    /// Build the command for one invocation.
    ///
    /// All three standard streams are piped; nothing is inherited from the
    /// parent's terminal. The child is killed if the handle is dropped.
    pub(crate) fn command(&self, operation: &str) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(&self.interpreter_args)
            .arg(&self.script)
            .arg(operation)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        for (k, v) in &self.env {
            cmd.env(k, v);
        }
        cmd
    }
}
