//! Principal types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::{Error, PROVIDER_NAME};

/// Namespace of a principal identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    User,
    Group,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::Group => "group",
        }
    }

    pub fn kind(&self) -> PrincipalKind {
        match self {
            Scope::User => PrincipalKind::User,
            Scope::Group => PrincipalKind::Group,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("user") {
            Ok(Scope::User)
        } else if s.eq_ignore_ascii_case("group") {
            Ok(Scope::Group)
        } else {
            Err(Error::InvalidInput(format!("invalid scope: {}", s)))
        }
    }
}

/// Kind of identity a principal stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    User,
    Group,
}

impl PrincipalKind {
    pub fn scope(&self) -> Scope {
        match self {
            PrincipalKind::User => Scope::User,
            PrincipalKind::Group => Scope::Group,
        }
    }
}

impl FromStr for PrincipalKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Scope>().map(|scope| scope.kind())
    }
}

/// Normalized identity record produced from a directory entry.
///
/// Two principals with the same `id` are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: String,
    pub display_name: String,
    pub login_name: String,
    pub kind: PrincipalKind,
    #[serde(default)]
    pub is_self: bool,
    #[serde(default)]
    pub is_member_of: bool,
    pub provider: String,
}

impl Principal {
    /// Build a principal whose id is `scope://dn`
    pub fn new(
        scope: Scope,
        dn: &str,
        display_name: impl Into<String>,
        login_name: impl Into<String>,
        kind: PrincipalKind,
    ) -> Self {
        Self {
            id: principal_id(scope, dn),
            display_name: display_name.into(),
            login_name: login_name.into(),
            kind,
            is_self: false,
            is_member_of: false,
            provider: PROVIDER_NAME.to_string(),
        }
    }

    /// Minimal principal carrying only the DN, used when the directory
    /// cannot be queried for display metadata
    pub fn from_dn(scope: Scope, dn: &str) -> Self {
        Self::new(scope, dn, dn, dn, scope.kind())
    }

    pub fn with_self(mut self) -> Self {
        self.is_self = true;
        self
    }

    pub fn with_member_of(mut self) -> Self {
        self.is_member_of = true;
        self
    }
}

/// Format a principal identifier
pub fn principal_id(scope: Scope, dn: &str) -> String {
    format!("{}://{}", scope, dn)
}

/// Username/password pair submitted at login
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct BasicLogin {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicLogin")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Result of a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub user: Principal,
    pub groups: Vec<Principal>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}
