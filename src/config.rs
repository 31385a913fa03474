use serde::{Deserialize, Serialize};
use std::{
    fmt::Debug,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// The three settings the engine reads; auto-detection writes the first.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Key {
    SdkRoot,
    EmulatorPath,
    AdbPath,
}

impl Key {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SdkRoot => "sdk.root",
            Self::EmulatorPath => "sdk.emulator",
            Self::AdbPath => "sdk.adb",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    User,
    Project,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read config from {path:?}: {source}")]
    ReadFailed { path: PathBuf, source: io::Error },
    #[error("Failed to parse config from {path:?}: {source}")]
    ParseFailed {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
    #[error("Failed to create config directory {path:?}: {source}")]
    DirCreationFailed { path: PathBuf, source: io::Error },
    #[error("Failed to write config to {path:?}: {source}")]
    WriteFailed { path: PathBuf, source: io::Error },
}

pub trait ConfigStore: Debug {
    fn get(&self, key: Key) -> Option<String>;
    fn set(&mut self, key: Key, value: &str, scope: Scope) -> Result<(), Error>;
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
struct RawSdk {
    #[serde(skip_serializing_if = "Option::is_none")]
    root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    emulator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    adb: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
struct Raw {
    #[serde(default)]
    sdk: RawSdk,
}

impl Raw {
    fn load(path: &Path) -> Result<Option<Self>, Error> {
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = fs::read_to_string(path).map_err(|source| Error::ReadFailed {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(&bytes)
            .map(Some)
            .map_err(|source| Error::ParseFailed {
                path: path.to_owned(),
                source,
            })
    }

    fn save(&self, path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| Error::DirCreationFailed {
                    path: parent.to_owned(),
                    source,
                })?;
            }
        }
        let serialized = toml::to_string_pretty(self)?;
        fs::write(path, serialized).map_err(|source| Error::WriteFailed {
            path: path.to_owned(),
            source,
        })
    }

    fn get(&self, key: Key) -> Option<&str> {
        match key {
            Key::SdkRoot => self.sdk.root.as_deref(),
            Key::EmulatorPath => self.sdk.emulator.as_deref(),
            Key::AdbPath => self.sdk.adb.as_deref(),
        }
    }

    fn set(&mut self, key: Key, value: &str) {
        let slot = match key {
            Key::SdkRoot => &mut self.sdk.root,
            Key::EmulatorPath => &mut self.sdk.emulator,
            Key::AdbPath => &mut self.sdk.adb,
        };
        *slot = Some(value.to_string());
    }
}

/// TOML-backed store: a user file under the home directory and an optional
/// project file in the working directory. Project values shadow user values
/// on read.
#[derive(Debug)]
pub struct TomlConfig {
    user_path: PathBuf,
    project_path: PathBuf,
    user: Raw,
    project: Raw,
}

impl TomlConfig {
    pub fn user_config_path(home: &Path) -> PathBuf {
        home.join(".config").join(crate::NAME).join("config.toml")
    }

    pub fn load(home: &Path) -> Result<Self, Error> {
        Self::load_from(Self::user_config_path(home), PathBuf::from("avdctl.toml"))
    }

    pub fn load_from(user_path: PathBuf, project_path: PathBuf) -> Result<Self, Error> {
        let user = Raw::load(&user_path)?.unwrap_or_default();
        let project = Raw::load(&project_path)?.unwrap_or_default();
        Ok(Self {
            user_path,
            project_path,
            user,
            project,
        })
    }
}

impl ConfigStore for TomlConfig {
    fn get(&self, key: Key) -> Option<String> {
        self.project
            .get(key)
            .or_else(|| self.user.get(key))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    fn set(&mut self, key: Key, value: &str, scope: Scope) -> Result<(), Error> {
        log::info!("setting {} = {:?} ({:?} scope)", key.as_str(), value, scope);
        match scope {
            Scope::User => {
                self.user.set(key, value);
                self.user.save(&self.user_path)
            }
            Scope::Project => {
                self.project.set(key, value);
                self.project.save(&self.project_path)
            }
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    pub struct MemConfig {
        values: HashMap<Key, String>,
        pub writes: Vec<(Key, String, Scope)>,
    }

    impl MemConfig {
        pub fn new() -> Self {
            Default::default()
        }

        pub fn with(mut self, key: Key, value: &str) -> Self {
            self.values.insert(key, value.to_string());
            self
        }
    }

    impl ConfigStore for MemConfig {
        fn get(&self, key: Key) -> Option<String> {
            self.values.get(&key).cloned()
        }

        fn set(&mut self, key: Key, value: &str, scope: Scope) -> Result<(), Error> {
            self.values.insert(key, value.to_string());
            self.writes.push((key, value.to_string(), scope));
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn values_round_trip_through_the_user_file() {
        let dir = tempfile::tempdir().unwrap();
        let user_path = dir.path().join("config.toml");
        let project_path = dir.path().join("avdctl.toml");
        {
            let mut config =
                TomlConfig::load_from(user_path.clone(), project_path.clone()).unwrap();
            config
                .set(Key::SdkRoot, "/opt/android-sdk", Scope::User)
                .unwrap();
        }
        let config = TomlConfig::load_from(user_path, project_path).unwrap();
        assert_eq!(config.get(Key::SdkRoot).as_deref(), Some("/opt/android-sdk"));
        assert_eq!(config.get(Key::AdbPath), None);
    }

    #[test]
    fn project_scope_shadows_user_scope() {
        let dir = tempfile::tempdir().unwrap();
        let user_path = dir.path().join("config.toml");
        let project_path = dir.path().join("avdctl.toml");
        let mut config = TomlConfig::load_from(user_path, project_path).unwrap();
        config.set(Key::AdbPath, "/user/adb", Scope::User).unwrap();
        config
            .set(Key::AdbPath, "/project/adb", Scope::Project)
            .unwrap();
        assert_eq!(config.get(Key::AdbPath).as_deref(), Some("/project/adb"));
    }

    #[test]
    fn blank_values_read_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let user_path = dir.path().join("config.toml");
        std::fs::write(&user_path, "[sdk]\nroot = \"  \"\n").unwrap();
        let config = TomlConfig::load_from(user_path, dir.path().join("avdctl.toml")).unwrap();
        assert_eq!(config.get(Key::SdkRoot), None);
    }
}
