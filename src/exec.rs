use std::{
    fmt::{self, Display},
    io,
    path::PathBuf,
    process::{self, Stdio},
};
use thiserror::Error;

/// A fully described external tool call: program, arguments, optional
/// working directory, and any extra environment entries. Built up front so
/// every runner (and every test double) sees the same shape.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Default::default(),
            current_dir: None,
            envs: Default::default(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) || arg.is_empty() {
                write!(f, " {:?}", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// Process execution facility. `run` suspends the caller until the tool
/// exits; the spawn methods are fire-and-forget, with `spawn_fallback`
/// using a different process-creation primitive than `spawn_detached`.
pub trait Runner: fmt::Debug {
    fn run(&self, invocation: &Invocation) -> io::Result<RunOutput>;
    fn spawn_detached(&self, invocation: &Invocation) -> io::Result<()>;
    fn spawn_fallback(&self, invocation: &Invocation) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    fn expression(invocation: &Invocation) -> duct::Expression {
        let mut expression = duct::cmd(invocation.program(), invocation.args());
        for (key, value) in &invocation.envs {
            expression = expression.env(key, value);
        }
        if let Some(dir) = &invocation.current_dir {
            expression = expression.dir(dir);
        }
        expression
    }
}

impl Runner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<RunOutput> {
        log::debug!("running `{}`", invocation);
        let output = Self::expression(invocation)
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()?;
        Ok(RunOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
        })
    }

    fn spawn_detached(&self, invocation: &Invocation) -> io::Result<()> {
        log::debug!("spawning `{}`", invocation);
        // Dropping the handle leaves the child running.
        Self::expression(invocation)
            .stdin_null()
            .stdout_null()
            .stderr_null()
            .start()
            .map(drop)
    }

    fn spawn_fallback(&self, invocation: &Invocation) -> io::Result<()> {
        log::debug!("spawning `{}` via std", invocation);
        let mut command = process::Command::new(invocation.program());
        command
            .args(invocation.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        for (key, value) in &invocation.envs {
            command.env(key, value);
        }
        if let Some(dir) = &invocation.current_dir {
            command.current_dir(dir);
        }
        command.spawn().map(drop)
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("`{command}` exited with failure: {stderr}")]
    CommandFailed { command: String, stderr: String },
}

/// Runs a tool and hands back trimmed stdout, folding non-zero exits into
/// `RunError::CommandFailed` so callers treat them like any other miss.
pub fn run_checked(runner: &dyn Runner, invocation: &Invocation) -> Result<String, RunError> {
    let output = runner.run(invocation)?;
    if output.success {
        Ok(output.stdout.trim().to_string())
    } else {
        Err(RunError::CommandFailed {
            command: invocation.to_string(),
            stderr: output.stderr.trim().to_string(),
        })
    }
}
