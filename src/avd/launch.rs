use crate::{
    bridge::Notifier,
    config::{ConfigStore, Key},
    env::Env,
    exec::Runner,
    os, sdk, util,
};

/// Fire-and-forget launch. Success is reported as soon as a process exists;
/// nobody waits for the instance to finish booting — callers re-run
/// correlation later to see it come up.
pub fn launch(
    name: &str,
    env: &Env,
    runner: &dyn Runner,
    config: &dyn ConfigStore,
    notifier: &dyn Notifier,
) {
    let located = sdk::locate(env, config);
    if let Some(error) = located.error() {
        notifier.error(&format!("Can't launch {:?}: {}", name, error));
        return;
    }
    let sdk_root = config.get(Key::SdkRoot).map(|raw| util::expand(&raw));
    let invocation = os::launch_invocation(
        env.platform(),
        &located.paths.emulator,
        name,
        sdk_root.as_deref(),
    );
    match runner.spawn_detached(&invocation) {
        Ok(()) => notifier.info(&format!("Launching {}...", name)),
        Err(primary) => {
            log::warn!("primary spawn of `{}` failed: {}", invocation, primary);
            match runner.spawn_fallback(&invocation) {
                Ok(()) => notifier.info(&format!("Launching {}...", name)),
                Err(fallback) => {
                    log::error!("fallback spawn of `{}` failed: {}", invocation, fallback);
                    notifier.error(&format!("Failed to launch {}: {}", name, fallback));
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        bridge::testing::RecordingNotifier,
        config::testing::MemConfig,
        exec::testing::ScriptedRunner,
        os::Platform,
    };
    use std::fs;

    fn sdk_fixture() -> (tempfile::TempDir, tempfile::TempDir, MemConfig) {
        let home = tempfile::tempdir().unwrap();
        let sdk = tempfile::tempdir().unwrap();
        for tool in &["emulator/emulator", "platform-tools/adb"] {
            let path = sdk.path().join(tool);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        let config = MemConfig::new().with(Key::SdkRoot, &sdk.path().display().to_string());
        (home, sdk, config)
    }

    #[test]
    fn spawn_success_notifies_optimistically() {
        let (home, _sdk, config) = sdk_fixture();
        let env = Env::custom(Platform::Linux, home.path());
        let runner = ScriptedRunner::new();
        let notifier = RecordingNotifier::new();
        launch("Pixel_6", &env, &runner, &config, &notifier);
        assert!(notifier.errors.borrow().is_empty());
        assert_eq!(notifier.infos.borrow().as_slice(), ["Launching Pixel_6..."]);
        let spawned = runner.spawned.borrow();
        assert!(spawned[0].starts_with("detached: sh -c"));
    }

    #[test]
    fn primary_spawn_failure_falls_back_without_an_error_notification() {
        let (home, _sdk, config) = sdk_fixture();
        let env = Env::custom(Platform::Linux, home.path());
        let runner = ScriptedRunner::new().failing_primary_spawn();
        let notifier = RecordingNotifier::new();
        launch("Pixel_6", &env, &runner, &config, &notifier);
        assert!(notifier.errors.borrow().is_empty());
        assert_eq!(notifier.infos.borrow().len(), 1);
        let spawned = runner.spawned.borrow();
        assert!(spawned[0].starts_with("fallback: sh -c"));
    }

    #[test]
    fn both_spawns_failing_is_an_error_notification() {
        let (home, _sdk, config) = sdk_fixture();
        let env = Env::custom(Platform::Linux, home.path());
        let runner = ScriptedRunner::new()
            .failing_primary_spawn()
            .failing_fallback_spawn();
        let notifier = RecordingNotifier::new();
        launch("Pixel_6", &env, &runner, &config, &notifier);
        assert!(notifier.infos.borrow().is_empty());
        assert!(notifier.errors.borrow()[0].starts_with("Failed to launch Pixel_6"));
    }

    #[test]
    fn locator_advisories_abort_the_launch() {
        let home = tempfile::tempdir().unwrap();
        let env = Env::custom(Platform::Linux, home.path());
        let config = MemConfig::new().with(Key::EmulatorPath, "/nowhere/emulator");
        let runner = ScriptedRunner::new();
        let notifier = RecordingNotifier::new();
        launch("Pixel_6", &env, &runner, &config, &notifier);
        assert!(runner.spawned.borrow().is_empty());
        assert!(notifier.errors.borrow()[0].starts_with("Can't launch"));
    }
}
