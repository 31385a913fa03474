pub mod detect;

use crate::{
    config::{ConfigStore, Key},
    env::Env,
    os::Platform,
    util,
};
use std::path::{Path, PathBuf};

/// Where the two tools and the AVD directory ended up. Built fresh for each
/// query cycle; never cached.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ToolPaths {
    pub emulator: PathBuf,
    pub adb: PathBuf,
    pub avd_home: Option<PathBuf>,
}

#[derive(Debug)]
pub struct Located {
    pub paths: ToolPaths,
    pub errors: Vec<String>,
}

impl Located {
    pub fn error(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.join("; "))
        }
    }
}

static EMULATOR_SUBPATHS: &[&str] = &["emulator/emulator", "tools/emulator"];
static ADB_SUBPATHS: &[&str] = &["platform-tools/adb"];

pub fn default_avd_home(home: &Path) -> PathBuf {
    home.join(".android").join("avd")
}

/// Resolves tool paths from overrides, the configured SDK root, or bare
/// command names, in that order. Never fails: a bad override is kept (with
/// an advisory) so the caller can show the user exactly what's configured.
pub fn locate(env: &Env, config: &dyn ConfigStore) -> Located {
    let sdk_root = config
        .get(Key::SdkRoot)
        .map(|raw| util::expand(&raw))
        .filter(|root| !root.is_empty());
    let avd_home = {
        let dir = default_avd_home(env.home());
        if dir.is_dir() {
            log::info!("found AVD directory at {:?}", dir);
            Some(dir)
        } else {
            None
        }
    };
    let mut errors = Vec::new();
    let emulator = resolve_tool(
        "emulator",
        config.get(Key::EmulatorPath),
        sdk_root.as_deref(),
        EMULATOR_SUBPATHS,
        env.platform(),
        &mut errors,
    );
    let adb = resolve_tool(
        "adb",
        config.get(Key::AdbPath),
        sdk_root.as_deref(),
        ADB_SUBPATHS,
        env.platform(),
        &mut errors,
    );
    if avd_home.is_some() && sdk_root.is_none() {
        errors.push(
            "Android virtual devices were found, but no SDK root is configured. \
             Run `avdctl detect-sdk` or set `sdk.root` in your configuration."
                .to_string(),
        );
    }
    Located {
        paths: ToolPaths {
            emulator,
            adb,
            avd_home,
        },
        errors,
    }
}

fn resolve_tool(
    name: &str,
    configured: Option<String>,
    sdk_root: Option<&str>,
    subpaths: &[&str],
    platform: Platform,
    errors: &mut Vec<String>,
) -> PathBuf {
    if let Some(raw) = configured.filter(|raw| !raw.trim().is_empty()) {
        let expanded = PathBuf::from(util::expand(&raw));
        if !expanded.exists() {
            errors.push(format!(
                "Configured {} path {:?} doesn't exist; check your settings.",
                name, expanded
            ));
        }
        // Keep the literal value either way so the caller can surface it.
        return expanded;
    }
    if let Some(root) = sdk_root {
        let root = Path::new(root);
        for subpath in subpaths {
            for candidate in candidate_names(subpath, platform) {
                let path = root.join(&candidate);
                if path.exists() {
                    log::info!("resolved {} to {:?}", name, path);
                    return path;
                }
            }
        }
        log::warn!("{} not found under SDK root {:?}", name, root);
    }
    if util::command_present(name) {
        log::info!("falling back to `{}` from the search path", name);
    } else {
        log::warn!(
            "`{}` isn't on the search path; invocations will likely fail",
            name
        );
    }
    PathBuf::from(name)
}

fn candidate_names(subpath: &str, platform: Platform) -> Vec<String> {
    let suffix = platform.exe_suffix();
    if suffix.is_empty() {
        vec![subpath.to_string()]
    } else {
        vec![format!("{}{}", subpath, suffix), subpath.to_string()]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{testing::MemConfig, Scope};
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn locate_is_idempotent_for_unchanged_config() {
        let home = tempfile::tempdir().unwrap();
        let sdk = tempfile::tempdir().unwrap();
        touch(&sdk.path().join("emulator").join("emulator"));
        touch(&sdk.path().join("platform-tools").join("adb"));
        let env = Env::custom(Platform::Linux, home.path());
        let config = MemConfig::new().with(Key::SdkRoot, &sdk.path().display().to_string());
        let first = locate(&env, &config);
        let second = locate(&env, &config);
        assert_eq!(first.paths, second.paths);
        assert_eq!(
            first.paths.emulator,
            sdk.path().join("emulator").join("emulator")
        );
        assert_eq!(first.paths.adb, sdk.path().join("platform-tools").join("adb"));
    }

    #[test]
    fn legacy_tools_layout_is_probed_after_current() {
        let home = tempfile::tempdir().unwrap();
        let sdk = tempfile::tempdir().unwrap();
        touch(&sdk.path().join("tools").join("emulator"));
        let env = Env::custom(Platform::Linux, home.path());
        let config = MemConfig::new().with(Key::SdkRoot, &sdk.path().display().to_string());
        let located = locate(&env, &config);
        assert_eq!(located.paths.emulator, sdk.path().join("tools").join("emulator"));
    }

    #[test]
    fn missing_override_is_kept_with_an_advisory() {
        let home = tempfile::tempdir().unwrap();
        let env = Env::custom(Platform::Linux, home.path());
        let config = MemConfig::new().with(Key::EmulatorPath, "/nowhere/emulator");
        let located = locate(&env, &config);
        assert_eq!(located.paths.emulator, PathBuf::from("/nowhere/emulator"));
        assert!(located
            .error()
            .unwrap()
            .contains("doesn't exist"));
    }

    #[test]
    fn avds_without_sdk_root_produce_the_configure_advisory() {
        let home = tempfile::tempdir().unwrap();
        fs::create_dir_all(home.path().join(".android").join("avd")).unwrap();
        let env = Env::custom(Platform::Linux, home.path());
        let located = locate(&env, &MemConfig::new());
        assert!(located.error().unwrap().contains("no SDK root is configured"));
        assert_eq!(
            located.paths.avd_home,
            Some(home.path().join(".android").join("avd"))
        );
    }

    #[test]
    fn bare_names_are_the_last_resort() {
        let home = tempfile::tempdir().unwrap();
        let env = Env::custom(Platform::Linux, home.path());
        let located = locate(&env, &MemConfig::new());
        assert_eq!(located.paths.emulator, PathBuf::from("emulator"));
        assert_eq!(located.paths.adb, PathBuf::from("adb"));
        assert_eq!(located.error(), None);
    }

    #[test]
    fn overrides_expand_env_tokens() {
        let home = tempfile::tempdir().unwrap();
        let env = Env::custom(Platform::Linux, home.path());
        std::env::set_var("AVDCTL_TEST_SDK_TOOL", "/nowhere");
        let mut config = MemConfig::new();
        config
            .set(Key::AdbPath, "$AVDCTL_TEST_SDK_TOOL/adb", Scope::User)
            .unwrap();
        let located = locate(&env, &config);
        assert_eq!(located.paths.adb, PathBuf::from("/nowhere/adb"));
    }
}
