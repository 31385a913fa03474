use crate::{
    avd::{self, AvdState, AvdStatus},
    config::ConfigStore,
    env::Env,
    exec::Runner,
    sdk, util,
};
use colored::Colorize as _;
use serde::{Deserialize, Serialize};
use std::{
    fmt::Debug,
    io::{self, BufRead, Write},
};

/// User-visible, fire-and-forget notifications.
pub trait Notifier: Debug {
    fn info(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// Append-only activity transcript. Kept separate from the `log` facade so
/// diagnostics and the user-facing feed never share a sink.
pub trait OutputLog: Debug {
    fn append_line(&self, line: &str);
}

#[derive(Debug)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn info(&self, msg: &str) {
        println!("{}", msg);
    }

    fn error(&self, msg: &str) {
        eprintln!("{}", msg.color(crate::util::cli::colors::ERROR).bold());
    }
}

/// Forwards transcript lines to the `output` log target; the binary's
/// logger stamps them with timestamps.
#[derive(Debug)]
pub struct LogOutput;

impl OutputLog for LogOutput {
    fn append_line(&self, line: &str) {
        log::info!(target: "output", "{}", line);
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Request {
    ListDevices,
    Launch { name: String },
    DetectSdk,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Response {
    Devices {
        devices: Vec<AvdStatus>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Detection {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        sdk_root: Option<String>,
    },
    Ack,
    Error {
        message: String,
    },
}

/// Request dispatcher with every collaborator passed in explicitly. Each
/// request builds its working set from scratch; nothing is cached between
/// calls.
#[derive(Debug)]
pub struct Engine<'a> {
    env: Env,
    runner: &'a dyn Runner,
    config: &'a mut dyn ConfigStore,
    notifier: &'a dyn Notifier,
    output: &'a dyn OutputLog,
}

impl<'a> Engine<'a> {
    pub fn new(
        env: Env,
        runner: &'a dyn Runner,
        config: &'a mut dyn ConfigStore,
        notifier: &'a dyn Notifier,
        output: &'a dyn OutputLog,
    ) -> Self {
        Self {
            env,
            runner,
            config,
            notifier,
            output,
        }
    }

    pub fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::ListDevices => self.list_devices(),
            Request::Launch { name } => {
                self.output.append_line(&format!("Launch requested for {}", name));
                avd::launch::launch(&name, &self.env, self.runner, &*self.config, self.notifier);
                Response::Ack
            }
            Request::DetectSdk => self.detect_sdk(),
        }
    }

    fn list_devices(&mut self) -> Response {
        self.output.append_line("Refreshing device list");
        let located = sdk::locate(&self.env, &*self.config);
        let mut errors = located.errors.clone();
        let listed = avd::list::enumerate(self.runner, &located.paths);
        if let Some(error) = listed.error {
            errors.push(error);
        }
        let devices =
            avd::correlate::correlate(self.runner, &self.env, &located.paths, listed.avds);
        let running = devices
            .iter()
            .filter(|device| device.state == AvdState::Running)
            .count();
        self.output
            .append_line(&format!("{} device(s), {} running", devices.len(), running));
        Response::Devices {
            devices,
            error: if errors.is_empty() {
                None
            } else {
                Some(errors.join("; "))
            },
        }
    }

    fn detect_sdk(&mut self) -> Response {
        self.output.append_line("Auto-detecting Android SDK");
        match sdk::detect::detect(&self.env, self.runner, &mut *self.config) {
            Some(root) => Response::Detection {
                success: true,
                sdk_root: Some(util::path_str(&root)),
            },
            None => Response::Detection {
                success: false,
                sdk_root: None,
            },
        }
    }
}

/// The produced protocol, spoken as one JSON request per stdin line and one
/// JSON response per stdout line.
pub fn serve(engine: &mut Engine<'_>) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str(&line) {
            Ok(request) => engine.handle(request),
            Err(err) => Response::Error {
                message: format!("unrecognized request: {}", err),
            },
        };
        let mut out = stdout.lock();
        serde_json::to_writer(&mut out, &response)?;
        writeln!(out)?;
    }
    Ok(())
}
