use avdctl::{
    bridge::{self, ConsoleNotifier, Engine, LogOutput, Request, Response},
    config::TomlConfig,
    env::Env,
    exec::SystemRunner,
    opts::NoiseLevel,
    util::cli::{colors, Report, Reportable as _, TextWrapper},
};
use colored::Colorize as _;
use structopt::{clap::AppSettings, StructOpt};

static SETTINGS: &[AppSettings] = &[
    AppSettings::ColoredHelp,
    AppSettings::DeriveDisplayOrder,
    AppSettings::SubcommandRequiredElseHelp,
    AppSettings::VersionlessSubcommands,
];

#[derive(Debug, StructOpt)]
#[structopt(
    name = "avdctl",
    settings = SETTINGS,
    about = "Discover, correlate, and launch Android Virtual Devices"
)]
struct Input {
    #[structopt(
        short = "v",
        long = "verbose",
        help = "Make life louder",
        global = true,
        multiple = true,
        parse(from_occurrences = NoiseLevel::from_occurrences)
    )]
    noise_level: NoiseLevel,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    #[structopt(name = "devices", about = "Lists AVDs and whether each is running")]
    Devices {
        #[structopt(long = "json", help = "Print the raw response as JSON")]
        json: bool,
    },
    #[structopt(name = "launch", about = "Launches the named AVD")]
    Launch {
        #[structopt(name = "name")]
        name: String,
    },
    #[structopt(
        name = "detect-sdk",
        about = "Searches for an Android SDK and saves it to your configuration"
    )]
    DetectSdk,
    #[structopt(
        name = "serve",
        about = "Speaks the JSON request/response protocol over stdio"
    )]
    Serve,
}

fn init_logging(noise_level: NoiseLevel) {
    use env_logger::{Builder, Env};
    let default_level = match noise_level {
        NoiseLevel::Polite => "warn,output=info",
        NoiseLevel::LoudAndProud => "avdctl=info,output=info",
        NoiseLevel::FranklyQuitePedantic => "info,avdctl=debug",
    };
    let env = Env::default().default_filter_or(default_level);
    Builder::from_env(env).init();
}

fn print_devices(response: &Response, wrapper: &TextWrapper) {
    use avdctl::avd::AvdState;
    if let Response::Devices { devices, error } = response {
        for device in devices {
            let line = match device.state {
                AvdState::Running => format!("● {} (running)", device.name)
                    .color(colors::RUNNING)
                    .to_string(),
                AvdState::Stopped => format!("○ {} (stopped)", device.name)
                    .color(colors::STOPPED)
                    .to_string(),
            };
            println!("{}", line);
        }
        if let Some(error) = error {
            Report::action_request("Heads up", error).print(wrapper);
        }
    }
}

fn run(input: Input, wrapper: &TextWrapper) -> Result<(), Report> {
    let env = Env::new().map_err(|err| err.report())?;
    let mut config = TomlConfig::load(env.home())
        .map_err(|err| Report::error("Failed to load configuration", err))?;
    let runner = SystemRunner::new();
    let notifier = ConsoleNotifier;
    let output = LogOutput;
    let mut engine = Engine::new(env, &runner, &mut config, &notifier, &output);
    match input.command {
        Command::Devices { json } => {
            let response = engine.handle(Request::ListDevices);
            if json {
                let serialized = serde_json::to_string_pretty(&response)
                    .map_err(|err| Report::error("Failed to serialize response", err))?;
                println!("{}", serialized);
            } else {
                print_devices(&response, wrapper);
            }
            Ok(())
        }
        Command::Launch { name } => {
            engine.handle(Request::Launch { name });
            Ok(())
        }
        Command::DetectSdk => match engine.handle(Request::DetectSdk) {
            Response::Detection {
                success: true,
                sdk_root: Some(root),
            } => {
                Report::victory("Android SDK detected", format!("Saved sdk.root = {}", root))
                    .print(wrapper);
                Ok(())
            }
            _ => Err(Report::action_request(
                "No Android SDK found",
                "Install one (Android Studio sets everything up), or set `sdk.root` in your configuration.",
            )),
        },
        Command::Serve => {
            bridge::serve(&mut engine).map_err(|err| Report::error("Protocol loop failed", err))
        }
    }
}

fn main() {
    let input = Input::from_args();
    init_logging(input.noise_level);
    let wrapper = TextWrapper::standard();
    if let Err(report) = run(input, &wrapper) {
        report.print(&wrapper);
        std::process::exit(report.exit_code() as i32);
    }
}
