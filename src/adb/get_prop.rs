use super::adb_for;
use crate::exec::{self, RunError, Runner};
use std::path::Path;

/// Current images expose the AVD name as a boot property; the kernel
/// variant is what older images used.
static AVD_NAME_PROPS: &[&str] = &["ro.boot.qemu.avd_name", "ro.kernel.qemu.avd_name"];

pub fn get_prop(
    runner: &dyn Runner,
    adb_path: &Path,
    serial: &str,
    prop: &str,
) -> Result<String, RunError> {
    exec::run_checked(
        runner,
        &adb_for(adb_path, serial).with_args(["shell", "getprop", prop]),
    )
}

pub fn avd_name_prop(
    runner: &dyn Runner,
    adb_path: &Path,
    serial: &str,
) -> Result<Option<String>, RunError> {
    for &prop in AVD_NAME_PROPS {
        let value = get_prop(runner, adb_path, serial, prop)?;
        if !value.is_empty() {
            return Ok(Some(value));
        }
        log::debug!("{} is empty on {}", prop, serial);
    }
    Ok(None)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::exec::testing::ScriptedRunner;

    #[test]
    fn falls_back_to_the_kernel_property() {
        let runner = ScriptedRunner::new()
            .on("adb -s emulator-5554 shell getprop ro.boot.qemu.avd_name", "\n")
            .on(
                "adb -s emulator-5554 shell getprop ro.kernel.qemu.avd_name",
                "Pixel_6\n",
            );
        assert_eq!(
            avd_name_prop(&runner, Path::new("adb"), "emulator-5554")
                .unwrap()
                .as_deref(),
            Some("Pixel_6")
        );
    }

    #[test]
    fn both_properties_empty_is_a_miss_not_an_error() {
        let runner = ScriptedRunner::new()
            .on("adb -s emulator-5554 shell getprop ro.boot.qemu.avd_name", "")
            .on("adb -s emulator-5554 shell getprop ro.kernel.qemu.avd_name", "");
        assert_eq!(
            avd_name_prop(&runner, Path::new("adb"), "emulator-5554").unwrap(),
            None
        );
    }
}
