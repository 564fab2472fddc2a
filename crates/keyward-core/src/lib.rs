//! Keyward Core Library
//!
//! Configuration, error taxonomy and principal types shared by the Keyward
//! directory authentication crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ActiveDirectoryConfig, KeywardConfig, TrustMaterial};
pub use error::{Error, Result};

/// Keyward version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Provider tag stamped on every principal produced by the directory backend
pub const PROVIDER_NAME: &str = "activedirectory";

/// Attribute listing the groups an entry belongs to
pub const MEMBER_OF_ATTRIBUTE: &str = "memberOf";

/// Attribute classifying an entry's type
pub const OBJECT_CLASS_ATTRIBUTE: &str = "objectClass";

/// Attribute used to match group entries by their distinguished name
pub const DISTINGUISHED_NAME_ATTRIBUTE: &str = "distinguishedName";
