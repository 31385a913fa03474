use crate::{exec::Invocation, util};
use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
};

/// Host platform tag. Everything platform-specific — launch wrappers,
/// process listings, the registry probe, install conventions — is keyed off
/// this in one place instead of `cfg!` branches scattered through callers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }

    pub fn exe_suffix(self) -> &'static str {
        match self {
            Self::Windows => ".exe",
            _ => "",
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::MacOs => write!(f, "macos"),
            Self::Linux => write!(f, "linux"),
        }
    }
}

/// Wraps an emulator start in whatever gives the user a visible, detachable
/// process on this platform. There's no one way to do this everywhere:
/// Windows gets a console window, macOS a Terminal window, Linux a shell
/// wrapper that backgrounds the child.
pub fn launch_invocation(
    platform: Platform,
    emulator: &Path,
    avd_name: &str,
    sdk_root: Option<&str>,
) -> Invocation {
    let emulator = util::path_str(emulator);
    let invocation = match platform {
        Platform::Windows => Invocation::new("cmd").with_args([
            "/C",
            "start",
            "",
            emulator.as_str(),
            "-avd",
            avd_name,
        ]),
        Platform::MacOs => Invocation::new("osascript").with_args([
            "-e".to_string(),
            format!(
                "tell application \"Terminal\" to do script \"{} -avd {}\"",
                emulator, avd_name
            ),
        ]),
        Platform::Linux => Invocation::new("sh").with_args([
            "-c".to_string(),
            format!("\"{}\" -avd \"{}\" >/dev/null 2>&1 &", emulator, avd_name),
        ]),
    };
    match sdk_root {
        Some(root) if !root.is_empty() => invocation.with_env("ANDROID_SDK_ROOT", root),
        _ => invocation,
    }
}

/// Full-command process listing, used to read `-avd`/`-port` flags back out
/// of running emulator command lines.
pub fn process_list_invocation(platform: Platform) -> Invocation {
    match platform {
        Platform::Windows => Invocation::new("wmic").with_args([
            "process",
            "where",
            "name like '%emulator%'",
            "get",
            "CommandLine",
        ]),
        Platform::MacOs | Platform::Linux => {
            Invocation::new("ps").with_args(["ax", "-o", "args="])
        }
    }
}

/// Registry read for the Android Studio install key (Windows only; callers
/// treat any failure as the key being absent).
pub fn registry_query_invocation(value_name: &str) -> Invocation {
    Invocation::new("reg").with_args([
        "query",
        r"HKLM\SOFTWARE\Android Studio",
        "/v",
        value_name,
    ])
}

/// Conventional SDK install roots, most likely first. Entries may contain
/// environment tokens; callers expand them before probing.
pub fn conventional_sdk_roots(platform: Platform, home: &Path) -> Vec<PathBuf> {
    match platform {
        Platform::Windows => vec![
            PathBuf::from(util::expand(r"%LOCALAPPDATA%\Android\Sdk")),
            home.join("AppData").join("Local").join("Android").join("Sdk"),
        ],
        Platform::MacOs => vec![
            home.join("Library").join("Android").join("sdk"),
            PathBuf::from("/usr/local/share/android-sdk"),
        ],
        Platform::Linux => vec![
            home.join("Android").join("Sdk"),
            PathBuf::from("/usr/local/android-sdk"),
            PathBuf::from("/opt/android-sdk"),
        ],
    }
}

/// The single most likely install root, used for the last-resort re-check
/// when an AVD directory exists but nothing else matched.
pub fn default_install_root(platform: Platform, home: &Path) -> PathBuf {
    match platform {
        Platform::Windows => home.join("AppData").join("Local").join("Android").join("Sdk"),
        Platform::MacOs => home.join("Library").join("Android").join("sdk"),
        Platform::Linux => home.join("Android").join("Sdk"),
    }
}
