use super::{console, Avd, AvdState, AvdStatus};
use crate::{
    adb::{self, device_list::RunningEmulator},
    env::Env,
    exec::{self, RunError, Runner},
    os,
    sdk::ToolPaths,
};
use once_cell_regex::regex;

/// Lenient comparison form: trimmed, lowercased, separators and any other
/// non-alphanumerics dropped. `Pixel_6` and `pixel-6 ` meet in the middle.
pub fn normalize(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

type Strategy = fn(&dyn Runner, &Env, &ToolPaths, &RunningEmulator) -> Result<Option<String>, RunError>;

/// Name-recovery chain, most reliable first. Every entry answers the same
/// question a different way, so one tool version's quirk only costs us one
/// rung.
static STRATEGIES: &[(&str, Strategy)] = &[
    ("adb emu avd name", by_emu_subcommand),
    ("qemu property", by_property),
    ("process listing", by_process_listing),
    ("console port", by_console_port),
];

fn by_emu_subcommand(
    runner: &dyn Runner,
    _env: &Env,
    paths: &ToolPaths,
    instance: &RunningEmulator,
) -> Result<Option<String>, RunError> {
    adb::avd_name(runner, &paths.adb, &instance.serial)
}

fn by_property(
    runner: &dyn Runner,
    _env: &Env,
    paths: &ToolPaths,
    instance: &RunningEmulator,
) -> Result<Option<String>, RunError> {
    adb::avd_name_prop(runner, &paths.adb, &instance.serial)
}

fn by_process_listing(
    runner: &dyn Runner,
    env: &Env,
    _paths: &ToolPaths,
    instance: &RunningEmulator,
) -> Result<Option<String>, RunError> {
    let stdout = exec::run_checked(runner, &os::process_list_invocation(env.platform()))?;
    Ok(find_in_process_list(&stdout, instance.port))
}

fn by_console_port(
    _runner: &dyn Runner,
    _env: &Env,
    _paths: &ToolPaths,
    instance: &RunningEmulator,
) -> Result<Option<String>, RunError> {
    console::query_avd_name(instance.port).map_err(RunError::from)
}

/// Reads `-avd <name>` out of emulator command lines; an entry belongs to
/// the instance when its `-port` matches (5554 is what the emulator uses
/// when the flag is omitted).
pub fn find_in_process_list(raw: &str, port: u16) -> Option<String> {
    for line in raw.lines() {
        let name = match regex!(r"-avd[\s=]+([\w.-]+)").captures(line) {
            Some(caps) => caps[1].to_owned(),
            None => continue,
        };
        let line_port = regex!(r"-port[\s=]+(\d+)")
            .captures(line)
            .and_then(|caps| caps[1].parse().ok())
            .unwrap_or(5554);
        if line_port == port {
            return Some(name);
        }
    }
    None
}

fn recover_name(
    runner: &dyn Runner,
    env: &Env,
    paths: &ToolPaths,
    instance: &RunningEmulator,
) -> Option<String> {
    for (label, strategy) in STRATEGIES {
        match strategy(runner, env, paths, instance) {
            Ok(Some(name)) => {
                log::info!("{} identified {} as {:?}", label, instance.serial, name);
                return Some(name);
            }
            Ok(None) => log::debug!("{} yielded nothing for {}", label, instance.serial),
            Err(err) => log::debug!("{} failed for {}: {}", label, instance.serial, err),
        }
    }
    log::warn!("couldn't recover an AVD name for {}", instance.serial);
    None
}

fn match_rule(name: &str, recovered: &[String], normalized_recovered: &[String]) -> Option<&'static str> {
    if recovered.iter().any(|r| r == name) {
        return Some("exact");
    }
    let norm = normalize(name);
    if !norm.is_empty() {
        if normalized_recovered.iter().any(|r| r == &norm) {
            return Some("normalized");
        }
        // Substring matching recovers truncated or decorated names, and can
        // mis-fire when one name prefixes another.
        if normalized_recovered
            .iter()
            .any(|r| !r.is_empty() && (r.contains(&norm) || norm.contains(r.as_str())))
        {
            return Some("substring");
        }
    }
    None
}

/// Exact, then normalized, then bidirectional substring; the first rule
/// that matches settles a definition's state.
pub fn reconcile(avds: Vec<Avd>, recovered: &[String]) -> Vec<AvdStatus> {
    let normalized_recovered: Vec<String> = recovered.iter().map(|name| normalize(name)).collect();
    avds.into_iter()
        .map(|avd| {
            let name = avd.into_name();
            let state = match match_rule(&name, recovered, &normalized_recovered) {
                Some(rule) => {
                    log::debug!("{:?} is running ({} match)", name, rule);
                    AvdState::Running
                }
                None => AvdState::Stopped,
            };
            AvdStatus { name, state }
        })
        .collect()
}

/// Full correlation pass: enumerate live instances, recover a name for each
/// where possible, then reconcile against the definitions. Tool failures
/// degrade to an empty running set rather than an error.
pub fn correlate(
    runner: &dyn Runner,
    env: &Env,
    paths: &ToolPaths,
    avds: Vec<Avd>,
) -> Vec<AvdStatus> {
    let running = match adb::device_list(runner, &paths.adb) {
        Ok(running) => running,
        Err(err) => {
            log::warn!("`adb devices` yielded nothing: {}", err);
            Vec::new()
        }
    };
    let recovered: Vec<String> = running
        .iter()
        .filter_map(|instance| recover_name(runner, env, paths, instance))
        .collect();
    reconcile(avds, &recovered)
}
