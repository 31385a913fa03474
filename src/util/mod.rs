pub mod cli;
mod path;

pub use self::path::*;

pub fn command_present(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Lossy display form for paths headed into command lines or messages.
pub fn path_str(path: &std::path::Path) -> String {
    dunce::simplified(path).display().to_string()
}
