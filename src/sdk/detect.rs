use crate::{
    config::{ConfigStore, Key, Scope},
    env::Env,
    exec::{self, Runner},
    os::{self, Platform},
    util,
};
use once_cell_regex::regex;
use std::path::{Path, PathBuf};

static SDK_ENV_VARS: &[&str] = &["ANDROID_SDK_ROOT", "ANDROID_HOME"];

/// A root passes if `platform-tools` holds an adb binary, or if
/// `platform-tools` exists alongside either the legacy `tools` directory or
/// the current `emulator` directory.
pub fn valid_sdk_root(root: &Path, platform: Platform) -> bool {
    let platform_tools = root.join("platform-tools");
    if platform_tools
        .join(format!("adb{}", platform.exe_suffix()))
        .exists()
    {
        return true;
    }
    platform_tools.is_dir() && (root.join("tools").is_dir() || root.join("emulator").is_dir())
}

fn env_candidates(env: &Env) -> Vec<PathBuf> {
    SDK_ENV_VARS
        .iter()
        .filter_map(|&name| {
            let value = env.var(name)?;
            let path = PathBuf::from(value);
            if path.exists() {
                Some(path)
            } else {
                log::info!("`{}` is set but doesn't point to an existing directory", name);
                None
            }
        })
        .collect()
}

fn parse_reg_value(raw: &str) -> Option<String> {
    regex!(r"REG_(?:EXPAND_)?SZ\s+(.+)")
        .captures(raw)
        .map(|caps| caps[1].trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Asks the registry where Android Studio lives and derives SDK locations
/// from the answer. Missing keys and a missing `reg` tool are both fine.
fn registry_candidates(runner: &dyn Runner) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    for &value_name in &["SdkPath", "Path"] {
        match exec::run_checked(runner, &os::registry_query_invocation(value_name)) {
            Ok(stdout) => {
                if let Some(value) = parse_reg_value(&stdout) {
                    let path = PathBuf::from(value);
                    if value_name == "SdkPath" {
                        candidates.push(path);
                    } else {
                        candidates.push(path.join("Sdk"));
                        if let Some(parent) = path.parent() {
                            candidates.push(parent.join("Sdk"));
                        }
                    }
                }
            }
            Err(err) => log::debug!("registry query for {} yielded nothing: {}", value_name, err),
        }
    }
    candidates
}

/// Proactive SDK search: environment variables, then install conventions
/// (Windows adds registry-derived candidates), every candidate gated by
/// `valid_sdk_root`. A found root is persisted for the locator to pick up.
pub fn detect(env: &Env, runner: &dyn Runner, config: &mut dyn ConfigStore) -> Option<PathBuf> {
    let mut candidates = env_candidates(env);
    if env.platform() == Platform::Windows {
        candidates.extend(registry_candidates(runner));
    }
    candidates.extend(os::conventional_sdk_roots(env.platform(), env.home()));
    for candidate in &candidates {
        if valid_sdk_root(candidate, env.platform()) {
            return persist(config, candidate);
        }
        log::debug!("candidate SDK root {:?} rejected", candidate);
    }
    // AVDs on disk are weak evidence that a toolchain exists somewhere;
    // give the default install location one more look before giving up.
    if super::default_avd_home(env.home()).is_dir() {
        let fallback = os::default_install_root(env.platform(), env.home());
        log::info!("AVD directory present; re-checking {:?}", fallback);
        if valid_sdk_root(&fallback, env.platform()) {
            return persist(config, &fallback);
        }
    }
    None
}

fn persist(config: &mut dyn ConfigStore, root: &Path) -> Option<PathBuf> {
    log::info!("detected SDK root {:?}", root);
    if let Err(err) = config.set(Key::SdkRoot, &util::path_str(root), Scope::User) {
        log::error!("failed to persist detected SDK root: {}", err);
    }
    Some(root.to_owned())
}
