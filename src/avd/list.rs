use super::Avd;
use crate::{
    exec::{self, Invocation, Runner},
    sdk::ToolPaths,
    util,
};
use std::path::Path;

/// Files in the AVD directory that describe the directory itself rather
/// than a device.
static RESERVED_INI: &str = "config.ini";

static NO_AVDS: &str = "No Android virtual devices found. Create one with Android Studio's \
                        Device Manager, then try again.";

#[derive(Debug)]
pub struct Listed {
    pub avds: Vec<Avd>,
    pub error: Option<String>,
}

pub fn parse_avd_list(raw: &str) -> Vec<Avd> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Avd::new)
        .collect()
}

fn from_tool(runner: &dyn Runner, paths: &ToolPaths) -> Vec<Avd> {
    let invocation = Invocation::new(util::path_str(&paths.emulator)).with_arg("-list-avds");
    match exec::run_checked(runner, &invocation) {
        Ok(stdout) => parse_avd_list(&stdout),
        Err(err) => {
            log::warn!("`emulator -list-avds` yielded nothing: {}", err);
            Vec::new()
        }
    }
}

/// Each definition leaves an `<name>.ini` pointer file in the AVD
/// directory; scanning those is the fallback when the emulator tool can't
/// be asked.
pub fn scan_avd_home(dir: &Path) -> Vec<Avd> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            log::warn!("couldn't read AVD directory {:?}: {}", dir, err);
            return Vec::new();
        }
    };
    let mut avds: Vec<Avd> = entries
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if path.extension()?.to_str()? != "ini" {
                return None;
            }
            if path.file_name()?.to_str()? == RESERVED_INI {
                return None;
            }
            Some(Avd::new(path.file_stem()?.to_str()?))
        })
        .collect();
    avds.sort_unstable();
    avds
}

/// Two independent strategies: ask the emulator, then scan the directory.
/// Only both coming back empty is user-visible.
pub fn enumerate(runner: &dyn Runner, paths: &ToolPaths) -> Listed {
    let avds = from_tool(runner, paths);
    if !avds.is_empty() {
        return Listed { avds, error: None };
    }
    let avds = paths
        .avd_home
        .as_deref()
        .map(scan_avd_home)
        .unwrap_or_default();
    if avds.is_empty() {
        Listed {
            avds,
            error: Some(NO_AVDS.to_string()),
        }
    } else {
        Listed { avds, error: None }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::exec::testing::ScriptedRunner;
    use std::{fs, path::PathBuf};

    fn paths(avd_home: Option<PathBuf>) -> ToolPaths {
        ToolPaths {
            emulator: PathBuf::from("emulator"),
            adb: PathBuf::from("adb"),
            avd_home,
        }
    }

    #[test]
    fn tool_output_parses_to_trimmed_names() {
        assert_eq!(
            parse_avd_list("Pixel_6\n\nNexus_5 \n"),
            vec![Avd::new("Pixel_6"), Avd::new("Nexus_5")]
        );
    }

    #[test]
    fn directory_scan_excludes_the_reserved_ini() {
        let dir = tempfile::tempdir().unwrap();
        for name in &["foo.ini", "bar.ini", "config.ini"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("foo.avd")).unwrap();
        assert_eq!(
            scan_avd_home(dir.path()),
            vec![Avd::new("bar"), Avd::new("foo")]
        );
    }

    #[test]
    fn tool_listing_wins_when_it_yields_names() {
        let runner = ScriptedRunner::new().on("emulator -list-avds", "Pixel_6\n");
        let listed = enumerate(&runner, &paths(None));
        assert_eq!(listed.avds, vec![Avd::new("Pixel_6")]);
        assert_eq!(listed.error, None);
    }

    #[test]
    fn empty_tool_output_falls_back_to_the_directory_scan() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Pixel_6.ini"), "").unwrap();
        let runner = ScriptedRunner::new().on("emulator -list-avds", "");
        let listed = enumerate(&runner, &paths(Some(dir.path().to_owned())));
        assert_eq!(listed.avds, vec![Avd::new("Pixel_6")]);
        assert_eq!(listed.error, None);
    }

    #[test]
    fn missing_tool_and_empty_directory_surface_the_no_devices_error() {
        let dir = tempfile::tempdir().unwrap();
        let listed = enumerate(&ScriptedRunner::new(), &paths(Some(dir.path().to_owned())));
        assert!(listed.avds.is_empty());
        assert!(listed
            .error
            .unwrap()
            .starts_with("No Android virtual devices found"));
    }
}
