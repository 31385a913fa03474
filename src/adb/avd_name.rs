use super::adb_for;
use crate::exec::{self, RunError, Runner};
use std::path::Path;

/// The reply is the AVD name on its own line followed by `OK`; older adb
/// builds sometimes print only the acknowledgement.
pub fn parse_avd_name_output(raw: &str) -> Option<String> {
    raw.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && *line != "OK" && *line != "KO")
        .map(str::to_string)
}

/// `adb emu avd name`, the most direct question we can ask an instance.
pub fn avd_name(
    runner: &dyn Runner,
    adb_path: &Path,
    serial: &str,
) -> Result<Option<String>, RunError> {
    exec::run_checked(
        runner,
        &adb_for(adb_path, serial).with_args(["emu", "avd", "name"]),
    )
    .map(|stdout| parse_avd_name_output(&stdout))
}
