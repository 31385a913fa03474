use once_cell_regex::{exports::regex::Captures, regex};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Failed to get user's home directory!")]
pub struct NoHomeDir;

pub fn home_dir() -> Result<PathBuf, NoHomeDir> {
    home::home_dir().ok_or(NoHomeDir)
}

fn env_value(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

/// Expands `%NAME%`, `${NAME}`, and `$NAME` tokens, then a leading `~`.
/// Unset variables expand to the empty string. Pure string transform; the
/// result isn't checked against the filesystem.
pub fn expand(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let expanded = regex!(r"%([A-Za-z_][A-Za-z0-9_]*)%")
        .replace_all(raw, |caps: &Captures<'_>| env_value(&caps[1]));
    let expanded = regex!(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .replace_all(&expanded, |caps: &Captures<'_>| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            env_value(name)
        });
    if let Some(rest) = expanded.strip_prefix('~') {
        if let Ok(home) = home_dir() {
            return format!("{}{}", home.display(), rest);
        }
    }
    expanded.into_owned()
}
