//! Access policy types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// How the allow-list gates logins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// Any authenticated directory user may log in
    #[default]
    Unrestricted,
    /// Only allow-listed users or members of allow-listed groups
    Restricted,
    /// Same gate as `Restricted`; membership is mandatory
    Required,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Unrestricted => "unrestricted",
            AccessMode::Restricted => "restricted",
            AccessMode::Required => "required",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unrestricted" => Ok(AccessMode::Unrestricted),
            "restricted" => Ok(AccessMode::Restricted),
            "required" => Ok(AccessMode::Required),
            other => Err(Error::InvalidConfig(format!("unknown access mode: {}", other))),
        }
    }
}
