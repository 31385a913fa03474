pub mod console;
pub mod correlate;
pub mod launch;
pub mod list;

use serde::Serialize;
use std::fmt::{self, Display};

/// A configured virtual-device definition. Identity is the name exactly as
/// the tooling reports it; lenient comparison happens at correlation time,
/// never here.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Avd {
    name: String,
}

impl Avd {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_name(self) -> String {
        self.name
    }
}

impl Display for Avd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AvdState {
    Stopped,
    Running,
}

/// One entry per definition, with its state resolved against whatever
/// instances are live right now.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AvdStatus {
    pub name: String,
    pub state: AvdState,
}
