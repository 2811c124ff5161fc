use std::fmt;

use serde::{Deserialize, Serialize};

/// The two outputs every piece of switcher state is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    /// Operator-facing draft output.
    Preview,
    /// Broadcast-facing program output.
    Live,
}

impl Scope {
    pub const ALL: [Scope; 2] = [Scope::Preview, Scope::Live];

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Preview => "preview",
            Scope::Live => "live",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
