use super::adb;
use crate::exec::{self, RunError, Runner};
use once_cell_regex::regex_multi_line;
use std::path::Path;

/// A live emulator process as adb sees it. The serial embeds the console
/// port (`emulator-5554` listens on 5554), which is the only stable handle
/// we get for talking to that particular instance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunningEmulator {
    pub serial: String,
    pub port: u16,
}

/// Only fully-booted emulator entries count; physical devices and offline
/// instances are skipped.
pub fn parse_device_list(raw: &str) -> Vec<RunningEmulator> {
    regex_multi_line!(r"^(emulator-(\d+))\s+device\b")
        .captures_iter(raw)
        .filter_map(|caps| {
            let serial = caps[1].to_owned();
            let port = caps[2].parse().ok()?;
            Some(RunningEmulator { serial, port })
        })
        .collect()
}

pub fn device_list(runner: &dyn Runner, adb_path: &Path) -> Result<Vec<RunningEmulator>, RunError> {
    exec::run_checked(runner, &adb(adb_path).with_arg("devices"))
        .map(|stdout| parse_device_list(&stdout))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_ready_emulator_entries_only() {
        let raw = "List of devices attached\n\
                   emulator-5554\tdevice\n\
                   emulator-5556\toffline\n\
                   R58M123ABC\tdevice\n\
                   emulator-5558\tdevice\n\n";
        assert_eq!(
            parse_device_list(raw),
            vec![
                RunningEmulator {
                    serial: "emulator-5554".to_string(),
                    port: 5554,
                },
                RunningEmulator {
                    serial: "emulator-5558".to_string(),
                    port: 5558,
                },
            ]
        );
    }

    #[test]
    fn empty_listing_parses_to_nothing() {
        assert_eq!(parse_device_list("List of devices attached\n\n"), vec![]);
    }
}
