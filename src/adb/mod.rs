pub mod avd_name;
pub mod device_list;
pub mod get_prop;

pub use self::{avd_name::avd_name, device_list::device_list, get_prop::avd_name_prop};

use crate::{exec::Invocation, util};
use std::path::Path;

pub fn adb(adb_path: &Path) -> Invocation {
    Invocation::new(util::path_str(adb_path))
}

/// Commands aimed at one specific instance go through `-s <serial>`.
pub fn adb_for(adb_path: &Path, serial: &str) -> Invocation {
    adb(adb_path).with_args(["-s", serial])
}
